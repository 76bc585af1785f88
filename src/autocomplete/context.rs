use super::*;
use std::collections::BTreeMap;

/// Response body of `POST /context`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlContext {
    pub keywords: Vec<String>,
    pub entities: Vec<EntityRecord>,
    pub syntax: SyntaxInfo,
    pub scope: ScopeInfo,
    pub text: TextInfo,
    pub suggestions: Vec<CompletionCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxInfo {
    /// Clause keyword at the caret, `NONE` before the first clause.
    pub clause: String,
    pub syntax_suggestions: Vec<SyntaxHint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    pub current_database: Option<String>,
    pub current_table: Option<String>,
    pub current_column: Option<String>,
    pub current_function: Option<String>,
    pub table_aliases: BTreeMap<String, String>,
    pub column_aliases: BTreeMap<String, String>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInfo {
    pub current_word: String,
    pub current_line: String,
    /// Unqualified part of the current word.
    pub current_token: String,
    pub current_token_case: TokenCase,
    pub previous_token: Option<String>,
    pub next_token: Option<String>,
}

impl SqlContext {
    /// Assemble the response. `extraction` is `None` when the text could not
    /// be extracted; the token and entity fields are then empty.
    pub fn build(
        sql: &str,
        offset: usize,
        extraction: Option<&Extraction>,
        ctx: &ScopeContext,
        suggestions: Vec<CompletionCandidate>,
    ) -> Self {
        let word_start = offset.saturating_sub(ctx.word.full.len());
        let entities = extraction
            .map(|e| e.statement_entities(offset).into_iter().cloned().collect())
            .unwrap_or_default();
        let previous_token = extraction
            .and_then(|e| e.token_before(word_start))
            .map(|t| t.kind.text());
        let next_token = extraction
            .and_then(|e| e.token_after(offset))
            .map(|t| t.kind.text());

        Self {
            keywords: ctx
                .syntax
                .keywords
                .iter()
                .map(|k| ctx.token_case.apply(k))
                .collect(),
            entities,
            syntax: SyntaxInfo {
                clause: ctx
                    .clause
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "NONE".to_string()),
                syntax_suggestions: ctx.syntax.syntax.clone(),
            },
            scope: ScopeInfo {
                current_database: ctx.current_database(),
                current_table: ctx.current_table().map(str::to_string),
                current_column: ctx.column.clone(),
                current_function: ctx.function.clone(),
                table_aliases: ctx
                    .table_aliases()
                    .into_iter()
                    .map(|(alias, table)| (alias.to_string(), table.to_string()))
                    .collect(),
                column_aliases: ctx
                    .column_aliases()
                    .iter()
                    .map(|a| (a.alias.clone(), a.expr.clone()))
                    .collect(),
                depth: ctx.depth(),
            },
            text: TextInfo {
                current_word: ctx.word.full.clone(),
                current_line: current_line(sql, offset).to_string(),
                current_token: ctx.word.prefix.clone(),
                current_token_case: ctx.token_case,
                previous_token,
                next_token,
            },
            suggestions,
        }
    }
}
