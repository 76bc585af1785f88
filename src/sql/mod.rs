//! Lenient SQL tokenization and the query-block model built on top of it.
//!
//! Modules:
//! - `keyword`    : Keywords the extractor reacts to.
//! - `token_kind` : Classification of lexical atoms.
//! - `token`      : Token struct pairing a `TokenKind` with byte offsets.
//! - `tokenizer`  : Dialect tokenizer folded into `Vec<Token>`.
//! - `dialect`    : Supported request languages.
//! - `ast`        : Query blocks, clause spans and projections.
//!
//! Incomplete or syntactically invalid SQL is the normal input here; only
//! lexical errors (unterminated quotes and comments) are reported.

pub mod ast;
pub mod dialect;
pub mod keyword;
pub mod token;
pub mod token_kind;
pub mod tokenizer;

pub use ast::*;
pub use dialect::Language;
pub use keyword::Keyword;
pub use token::Token;
pub use token_kind::TokenKind;
pub use tokenizer::tokenize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_and_access() {
        let tokens = tokenize("SELECT col FROM tbl", Language::default()).unwrap();
        assert!(tokens.iter().any(|t| t.is_keyword(Keyword::Select)));
        assert!(tokens.iter().any(|t| t.is_keyword(Keyword::From)));
        assert!(tokens.iter().any(|t| t.ident() == Some("col")));
        assert!(tokens.iter().any(|t| t.ident() == Some("tbl")));
    }
}
