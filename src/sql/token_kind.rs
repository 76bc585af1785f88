//! Token kind definitions for the extractor's token stream.
//!
//! The dialect tokenizer produces far richer tokens than completion needs;
//! they are folded into this small set. Unquoted words that match a
//! [`Keyword`] become `Keyword`, quoted words never do.

use crate::sql::keyword::Keyword;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Table / alias / column / generic identifier.
    Ident(String),
    /// Identifier written with quotes (`"x"`, `` `x` ``, `[x]`); stored unquoted.
    QuotedIdent(String),
    /// Recognized SQL keyword.
    Keyword(Keyword),
    /// String or numeric literal.
    Literal(String),
    Comma,
    Dot,
    ParenOpen,
    ParenClose,
    Semicolon,
    /// `*`, either a wildcard or multiplication.
    Star,
    /// Comparison, arithmetic or concatenation operator.
    Operator(String),
    Other(String),
}

impl TokenKind {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            TokenKind::Keyword(k) => Some(*k),
            _ => None,
        }
    }

    /// Identifier text for both bare and quoted identifiers.
    pub fn ident(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(s) | TokenKind::QuotedIdent(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_ident(&self) -> bool {
        self.ident().is_some()
    }

    /// True if this token can end a value expression, so whatever follows
    /// is an operator, alias or clause keyword rather than a new operand.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::QuotedIdent(_)
                | TokenKind::Literal(_)
                | TokenKind::ParenClose
                | TokenKind::Keyword(Keyword::Null | Keyword::End)
        )
    }

    /// Source-like rendering, used for `previousToken` / `nextToken`.
    pub fn text(&self) -> String {
        match self {
            TokenKind::Ident(s) | TokenKind::Literal(s) => s.clone(),
            TokenKind::QuotedIdent(s) => s.clone(),
            TokenKind::Keyword(k) => k.as_str().to_ascii_uppercase(),
            TokenKind::Comma => ",".into(),
            TokenKind::Dot => ".".into(),
            TokenKind::ParenOpen => "(".into(),
            TokenKind::ParenClose => ")".into(),
            TokenKind::Semicolon => ";".into(),
            TokenKind::Star => "*".into(),
            TokenKind::Operator(s) | TokenKind::Other(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_detection() {
        let tk = TokenKind::Keyword(Keyword::Select);
        assert!(tk.is_keyword(Keyword::Select));
        assert!(!tk.is_keyword(Keyword::From));
        assert!(tk.ident().is_none());
        assert_eq!(tk.keyword(), Some(Keyword::Select));
    }

    #[test]
    fn quoted_identifiers_are_identifiers() {
        let tk = TokenKind::QuotedIdent("Order Items".into());
        assert!(tk.is_ident());
        assert_eq!(tk.ident(), Some("Order Items"));
    }

    #[test]
    fn operand_endings() {
        assert!(TokenKind::Ident("x".into()).ends_operand());
        assert!(TokenKind::ParenClose.ends_operand());
        assert!(TokenKind::Keyword(Keyword::Null).ends_operand());
        assert!(!TokenKind::Comma.ends_operand());
        assert!(!TokenKind::Operator("=".into()).ends_operand());
        assert!(!TokenKind::Keyword(Keyword::Where).ends_operand());
    }
}
