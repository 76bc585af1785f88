use super::*;

/// What kind of name the caret position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum SyntaxContextType {
    #[display("database")]
    Database,
    #[display("table")]
    Table,
    #[display("column")]
    Column,
    #[display("function")]
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxHint {
    pub syntax_context_type: SyntaxContextType,
    /// Range of the in-progress word the hint would replace.
    pub word_range: Span,
}

/// Grammatical slot of the in-progress word, decided by the token before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    StatementStart,
    TableName,
    Expression,
    AfterOperand,
    Alias,
    Other,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxSuggestions {
    /// Upper-case keyword completions.
    pub keywords: Vec<String>,
    pub syntax: Vec<SyntaxHint>,
    pub clause: Option<Clause>,
    #[serde(skip)]
    pub block: Option<BlockId>,
    #[serde(skip)]
    pub slot: Slot,
}

const FALLBACK_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "FROM", "WHERE", "JOIN", "GROUP BY",
    "ORDER BY", "LIMIT",
];

impl SyntaxSuggestions {
    /// Keyword-only suggestions used when the text could not be extracted.
    pub fn fallback() -> Self {
        Self {
            keywords: strings(FALLBACK_KEYWORDS),
            ..Default::default()
        }
    }

    pub fn expects(&self, context: SyntaxContextType) -> bool {
        self.syntax.iter().any(|h| h.syntax_context_type == context)
    }
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Decide what may be typed at `offset`.
///
/// The in-progress word (identifier characters and dots ending at the caret)
/// is excluded; the slot comes from the token right before it, provided that
/// token belongs to the caret's block. The clause comes from the block's
/// clause spans.
pub fn suggest(extraction: &Extraction, offset: usize) -> SyntaxSuggestions {
    let sql = extraction.sql.as_str();
    let offset = offset.min(sql.len());
    let word = current_word(sql, offset);
    let word_start = offset - word.len();
    let word_range = Span::new(word_start, offset);
    let qualified = word.contains('.');

    let block = extraction.block_at(word_start);
    let clause = block.and_then(|b| b.clause_at(word_start));
    let prev = extraction
        .token_before(word_start)
        .filter(|t| block.is_none_or(|b| t.start >= b.span.start));

    let (slot, mut keywords) = classify(extraction, prev, clause);
    let mut syntax = Vec::new();
    let mut hint = |syntax_context_type| {
        syntax.push(SyntaxHint {
            syntax_context_type,
            word_range,
        })
    };

    match slot {
        Slot::StatementStart => {
            keywords = match block.map(|b| &b.kind) {
                None | Some(BlockKind::Statement) => {
                    strings(&["SELECT", "INSERT", "UPDATE", "DELETE", "WITH"])
                }
                Some(BlockKind::SetOperand) => strings(&["SELECT"]),
                Some(_) => strings(&["SELECT", "WITH"]),
            }
        }
        Slot::TableName => {
            hint(SyntaxContextType::Table);
            if !qualified {
                hint(SyntaxContextType::Database);
            }
        }
        Slot::Expression => {
            hint(SyntaxContextType::Column);
            if !qualified {
                hint(SyntaxContextType::Function);
            }
            let extra: &[&str] = match clause {
                Some(Clause::Select) if prev.is_some_and(|t| t.is_keyword(Keyword::Select)) => {
                    &["CASE", "DISTINCT"]
                }
                Some(Clause::Select) => &["CASE"],
                Some(Clause::Where | Clause::On | Clause::Having) => &["NOT", "EXISTS", "CASE"],
                _ => &[],
            };
            keywords.extend(strings(extra));
        }
        Slot::AfterOperand => keywords = strings(after_operand(clause)),
        Slot::Alias | Slot::Other | Slot::Unknown => {}
    }

    trace!("Caret {offset} in {:?}: {slot:?} {clause:?}", block.map(|b| b.id));
    SyntaxSuggestions {
        keywords,
        syntax,
        clause,
        block: block.map(|b| b.id),
        slot,
    }
}

fn classify(
    extraction: &Extraction,
    prev: Option<&Token>,
    clause: Option<Clause>,
) -> (Slot, Vec<String>) {
    let Some(prev) = prev else {
        return (Slot::StatementStart, vec![]);
    };
    let other = |words: &[&str]| (Slot::Other, strings(words));

    match &prev.kind {
        TokenKind::Keyword(kw) => match kw {
            Keyword::From | Keyword::Join | Keyword::Into | Keyword::Update => {
                (Slot::TableName, vec![])
            }
            Keyword::As => (Slot::Alias, vec![]),
            Keyword::Group | Keyword::Order => other(&["BY"]),
            Keyword::Outer => other(&["JOIN"]),
            kw if Keyword::JOIN_MODIFIERS.contains(kw) => other(&["JOIN", "OUTER JOIN"]),
            Keyword::Insert => other(&["INTO"]),
            Keyword::Delete => other(&["FROM"]),
            Keyword::Is => other(&["NULL", "NOT NULL"]),
            Keyword::With => other(&["RECURSIVE"]),
            Keyword::Null | Keyword::End | Keyword::Asc | Keyword::Desc => {
                (Slot::AfterOperand, vec![])
            }
            kw if kw.starts_expression() => (Slot::Expression, vec![]),
            _ => (Slot::Unknown, vec![]),
        },
        TokenKind::Comma => match clause {
            Some(Clause::From | Clause::Join) => (Slot::TableName, vec![]),
            Some(_) => (Slot::Expression, vec![]),
            None => (Slot::Other, vec![]),
        },
        TokenKind::ParenOpen => {
            let before = extraction.token_before(prev.start).and_then(Token::keyword);
            match before {
                Some(Keyword::From | Keyword::Join) => other(&["SELECT"]),
                Some(Keyword::In | Keyword::Exists) => (Slot::Expression, strings(&["SELECT"])),
                _ => (Slot::Expression, vec![]),
            }
        }
        TokenKind::Operator(_) => (Slot::Expression, vec![]),
        TokenKind::Star
        | TokenKind::Ident(_)
        | TokenKind::QuotedIdent(_)
        | TokenKind::Literal(_)
        | TokenKind::ParenClose => (Slot::AfterOperand, vec![]),
        TokenKind::Semicolon => (Slot::StatementStart, vec![]),
        TokenKind::Dot | TokenKind::Other(_) => (Slot::Unknown, vec![]),
    }
}

/// Keywords that may follow a complete operand in `clause`.
fn after_operand(clause: Option<Clause>) -> &'static [&'static str] {
    match clause {
        Some(Clause::Select) => &["FROM", "AS"],
        Some(Clause::From) => &["WHERE", "JOIN", "GROUP BY", "ORDER BY", "LIMIT", "UNION"],
        Some(Clause::Join) => &["ON", "USING", "AS"],
        Some(Clause::On) => &["AND", "OR", "JOIN", "WHERE", "GROUP BY", "ORDER BY"],
        Some(Clause::Where) => &["AND", "OR", "GROUP BY", "ORDER BY", "LIMIT"],
        Some(Clause::GroupBy) => &["HAVING", "ORDER BY", "LIMIT"],
        Some(Clause::Having) => &["AND", "OR", "ORDER BY", "LIMIT"],
        Some(Clause::OrderBy) => &["ASC", "DESC", "LIMIT"],
        Some(Clause::Limit) => &["OFFSET"],
        Some(Clause::Into) => &["VALUES", "SELECT"],
        Some(Clause::Update) => &["SET"],
        Some(Clause::Set) => &["WHERE"],
        Some(Clause::Values) | None => &[],
    }
}
