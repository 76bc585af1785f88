use crate::*;
use sqlparser::tokenizer::{Token as SqlToken, Tokenizer};

/// Tokenizes `sql` with the dialect of `language`, returning tokens with byte
/// spans. Whitespace and comments are dropped.
///
/// Behavior:
/// - Accepts structurally incomplete SQL (`SELECT FROM`, `JOIN , t`).
/// - Fails only on lexical errors: unterminated strings, quoted identifiers
///   or block comments.
/// - Unquoted words are classified through [`Keyword::from_lower`]; quoted
///   words are always identifiers.
pub fn tokenize(sql: &str, language: Language) -> Result<Vec<Token>> {
    let dialect = language.dialect();
    let raw = Tokenizer::new(dialect.as_ref(), sql).tokenize_with_location()?;
    let lines = LineIndex::new(sql);

    let mut out = Vec::with_capacity(raw.len());
    for tok in &raw {
        let Some(kind) = classify(&tok.token) else {
            continue;
        };
        let start = lines.offset(tok.span.start.line, tok.span.start.column);
        let end = lines.offset(tok.span.end.line, tok.span.end.column);
        out.push(Token::new(kind, start, end.max(start)));
    }
    trace!("Tokenized {} bytes into {} tokens", sql.len(), out.len());
    Ok(out)
}

fn classify(token: &SqlToken) -> Option<TokenKind> {
    let kind = match token {
        SqlToken::EOF | SqlToken::Whitespace(_) => return None,
        SqlToken::Word(word) => match word.quote_style {
            Some(_) => TokenKind::QuotedIdent(word.value.clone()),
            None => Keyword::from_lower(&word.value.to_ascii_lowercase())
                .map(TokenKind::Keyword)
                .unwrap_or_else(|| TokenKind::Ident(word.value.clone())),
        },
        SqlToken::Number(n, _) => TokenKind::Literal(n.clone()),
        SqlToken::SingleQuotedString(_)
        | SqlToken::DoubleQuotedString(_)
        | SqlToken::NationalStringLiteral(_)
        | SqlToken::EscapedStringLiteral(_)
        | SqlToken::HexStringLiteral(_) => TokenKind::Literal(token.to_string()),
        SqlToken::Comma => TokenKind::Comma,
        SqlToken::Period => TokenKind::Dot,
        SqlToken::LParen => TokenKind::ParenOpen,
        SqlToken::RParen => TokenKind::ParenClose,
        SqlToken::SemiColon => TokenKind::Semicolon,
        SqlToken::Mul => TokenKind::Star,
        SqlToken::Eq
        | SqlToken::Neq
        | SqlToken::Lt
        | SqlToken::Gt
        | SqlToken::LtEq
        | SqlToken::GtEq
        | SqlToken::Plus
        | SqlToken::Minus
        | SqlToken::Div
        | SqlToken::Mod
        | SqlToken::StringConcat => TokenKind::Operator(token.to_string()),
        other => TokenKind::Other(other.to_string()),
    };
    Some(kind)
}

/// Maps the tokenizer's 1-based (line, char column) locations to byte offsets.
struct LineIndex<'a> {
    sql: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(sql: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { sql, starts }
    }

    fn offset(&self, line: u64, column: u64) -> usize {
        let line = (line as usize).saturating_sub(1);
        let Some(&start) = self.starts.get(line) else {
            return self.sql.len();
        };
        let end = self
            .starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.sql.len());
        let text = &self.sql[start..end];
        let chars = (column as usize).saturating_sub(1);
        start
            + text
                .char_indices()
                .nth(chars)
                .map(|(i, _)| i)
                .unwrap_or(text.len())
    }
}
