use crate::*;
use itertools::Itertools;
use sqlparser::dialect::{
    DatabricksDialect, Dialect, GenericDialect, HiveDialect, MySqlDialect, PostgreSqlDialect,
};
use std::str::FromStr;

/// SQL flavours accepted on the `language` request field.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[display("mysql")]
    MySql,
    #[display("postgresql")]
    PostgreSql,
    #[display("hive")]
    Hive,
    #[display("spark")]
    Spark,
    #[display("trino")]
    Trino,
}

impl Language {
    pub const ALL: [Self; 5] = [
        Language::MySql,
        Language::PostgreSql,
        Language::Hive,
        Language::Spark,
        Language::Trino,
    ];

    /// Tokenizer dialect backing this language.
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Language::MySql => Box::new(MySqlDialect {}),
            Language::PostgreSql => Box::new(PostgreSqlDialect {}),
            Language::Hive => Box::new(HiveDialect {}),
            Language::Spark => Box::new(DatabricksDialect {}),
            Language::Trino => Box::new(GenericDialect {}),
        }
    }

    /// Parses the optional request field; absent means the default.
    pub fn from_request(language: Option<&str>) -> Result<Self> {
        match language {
            None => Ok(Language::default()),
            Some(language) => language.parse(),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|l| l.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::UnsupportedLanguage(format!(
                    "'{s}' (supported: {})",
                    Language::ALL.iter().join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mysql", Language::MySql)]
    #[case("PostgreSQL", Language::PostgreSql)]
    #[case("hive", Language::Hive)]
    #[case("spark", Language::Spark)]
    #[case(" trino ", Language::Trino)]
    fn parses_supported_languages(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_language() {
        let err = "oracle".parse::<Language>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(_)));
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn defaults_to_mysql() {
        assert_eq!(Language::from_request(None).unwrap(), Language::MySql);
    }
}
