//! Token model tying a `TokenKind` to its byte span in the original SQL.
use crate::sql::{ast::Span, keyword::Keyword, token_kind::TokenKind};

/// A lexical token with its inclusive start and exclusive end byte offsets.
///
/// Invariants:
/// - `end >= start`
/// - `[start, end)` is a valid slice range for the original input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn ident(&self) -> Option<&str> {
        self.kind.ident()
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind.is_keyword(kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        self.kind.keyword()
    }

    /// NOTE: End is exclusive, so `cursor == end` returns false.
    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.start && cursor < self.end
    }

    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Source text of the token.
    pub fn text<'a>(&self, sql: &'a str) -> &'a str {
        sql.get(self.start..self.end).unwrap_or_default()
    }

    /// `next` starts exactly where this token ends, with no whitespace or
    /// comment in between.
    pub const fn touches(&self, next: &Token) -> bool {
        next.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_access() {
        let t = Token::new(TokenKind::Ident("Users".into()), 0, 5);
        assert_eq!(t.ident(), Some("Users"));
        assert!(t.contains(2));
        assert!(!t.contains(5)); // end exclusive
    }

    #[test]
    fn keyword_detection() {
        let t = Token::new(TokenKind::Keyword(Keyword::Select), 0, 6);
        assert!(t.is_keyword(Keyword::Select));
        assert!(!t.is_keyword(Keyword::From));
    }

    #[test]
    fn span_and_text() {
        let sql = "SELECT u.id";
        let dot = Token::new(TokenKind::Dot, 8, 9);
        let id = Token::new(TokenKind::Ident("id".into()), 9, 11);
        assert_eq!(dot.span(), Span::new(8, 9));
        assert_eq!(id.text(sql), "id");
        assert!(dot.touches(&id));
        assert!(!Token::new(TokenKind::Ident("SELECT".into()), 0, 6).touches(&dot));
    }
}
