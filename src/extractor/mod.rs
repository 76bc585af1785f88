//! Entity/keyword extraction: turns SQL text into query blocks and entity
//! records, and answers "what may appear at this offset" questions.
crate::reexport!(walker);
crate::reexport!(suggest);

use crate::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    #[display("database")]
    Database,
    #[display("table")]
    Table,
    #[display("column")]
    Column,
    #[display("function")]
    Function,
    #[display("derivedTable")]
    DerivedTable,
    #[display("commonTable")]
    CommonTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecord {
    pub name: String,
    pub span: Span,
}

/// A named reference found in the SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub kind: EntityKind,
    /// Reference as written, including qualifiers (`shop.users`).
    pub text: String,
    /// Last name segment (`users`).
    pub name: String,
    pub qualifier: Option<String>,
    pub span: Span,
    pub alias: Option<AliasRecord>,
    /// Query block the reference belongs to.
    pub block: BlockId,
    pub clause: Option<Clause>,
}

/// Everything extracted from one SQL text. Independent of the caret, so it
/// can be cached per text.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub sql: String,
    pub language: Language,
    pub tokens: Vec<Token>,
    pub blocks: Vec<QueryBlock>,
    pub entities: Vec<EntityRecord>,
    /// `;`-separated statement spans, in order.
    pub statements: Vec<Span>,
}

impl Extraction {
    /// Innermost block containing `offset`.
    pub fn block_at(&self, offset: usize) -> Option<&QueryBlock> {
        self.blocks
            .iter()
            .filter(|b| b.span.contains(offset))
            .max_by_key(|b| (b.span.start, b.id))
    }

    pub fn statement_at(&self, offset: usize) -> Option<usize> {
        self.statements.iter().position(|s| s.contains(offset))
    }

    /// Entities of the statement containing `offset`.
    pub fn statement_entities(&self, offset: usize) -> Vec<&EntityRecord> {
        let Some(statement) = self.statement_at(offset) else {
            return vec![];
        };
        self.entities
            .iter()
            .filter(|e| self.blocks[e.block].statement == statement)
            .collect()
    }

    /// Last token ending at or before `offset`.
    pub fn token_before(&self, offset: usize) -> Option<&Token> {
        let idx = self.tokens.partition_point(|t| t.end <= offset);
        idx.checked_sub(1).map(|i| &self.tokens[i])
    }

    /// First token starting at or after `offset`.
    pub fn token_after(&self, offset: usize) -> Option<&Token> {
        let idx = self.tokens.partition_point(|t| t.start < offset);
        self.tokens.get(idx)
    }

    /// Name of the innermost function call whose argument list encloses
    /// `offset`.
    pub fn enclosing_function(&self, offset: usize) -> Option<&str> {
        let mut calls: Vec<Option<&str>> = Vec::new();
        let mut previous: Option<&Token> = None;
        for token in self.tokens.iter().take_while(|t| t.end <= offset) {
            match token.kind {
                TokenKind::ParenOpen => calls.push(previous.and_then(|p| p.ident())),
                TokenKind::ParenClose => {
                    calls.pop();
                }
                TokenKind::Semicolon => calls.clear(),
                _ => {}
            }
            previous = Some(token);
        }
        calls.into_iter().rev().find_map(|name| name)
    }
}

/// The extraction boundary consumed by the completion core.
pub trait Extractor: Send + Sync {
    /// Fails only when the text cannot be tokenized.
    fn extract_entities(&self, sql: &str) -> Result<Extraction>;

    fn suggest_at_position(&self, extraction: &Extraction, offset: usize) -> SyntaxSuggestions;
}

/// Extractor built on the dialect tokenizer and the block walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenExtractor {
    language: Language,
}

impl TokenExtractor {
    pub const fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Extractor for TokenExtractor {
    fn extract_entities(&self, sql: &str) -> Result<Extraction> {
        let tokens = tokenize(sql, self.language)?;
        let (blocks, entities, statements) = walk(sql, &tokens);
        debug!(
            "Extracted {} blocks, {} entities, {} statements",
            blocks.len(),
            entities.len(),
            statements.len()
        );
        Ok(Extraction {
            sql: sql.to_string(),
            language: self.language,
            tokens,
            blocks,
            entities,
            statements,
        })
    }

    fn suggest_at_position(&self, extraction: &Extraction, offset: usize) -> SyntaxSuggestions {
        suggest(extraction, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(sql: &str) -> Extraction {
        TokenExtractor::default().extract_entities(sql).unwrap()
    }

    #[test]
    fn innermost_block_wins() {
        let sql = "SELECT * FROM (SELECT id FROM users) AS sub";
        let extraction = extract(sql);
        let inner = sql.find("id").unwrap();
        assert!(matches!(
            extraction.block_at(inner).unwrap().kind,
            BlockKind::Derived { .. }
        ));
        assert_eq!(
            extraction.block_at(sql.len()).unwrap().kind,
            BlockKind::Statement
        );
    }

    #[test]
    fn statements_are_split_on_semicolons() {
        let sql = "SELECT a FROM t1; SELECT b FROM t2";
        let extraction = extract(sql);
        assert_eq!(extraction.statements.len(), 2);
        let second = extraction.statement_entities(sql.len());
        assert!(second.iter().all(|e| e.name != "t1" && e.name != "a"));
        assert!(second.iter().any(|e| e.name == "t2"));
    }

    #[test]
    fn neighbouring_tokens() {
        let sql = "SELECT na FROM t";
        let extraction = extract(sql);
        assert!(extraction.token_before(7).unwrap().is_keyword(Keyword::Select));
        assert_eq!(extraction.token_after(9).unwrap().keyword(), Some(Keyword::From));
        assert!(extraction.token_before(0).is_none());
    }

    #[test]
    fn enclosing_function_tracks_nesting() {
        let sql = "SELECT coalesce(max(a), ) FROM t";
        let extraction = extract(sql);
        assert_eq!(extraction.enclosing_function(21), Some("max"));
        assert_eq!(extraction.enclosing_function(24), Some("coalesce"));
        assert_eq!(extraction.enclosing_function(sql.len()), None);
    }

    #[test]
    fn lexical_errors_fail_extraction() {
        let result = TokenExtractor::default().extract_entities("SELECT 'oops");
        assert!(matches!(result, Err(Error::Extraction(_))));
    }
}
