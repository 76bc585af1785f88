use derive_more::Display;

fn paren(n: &Option<u32>) -> String {
    n.map(|n| format!("({n})")).unwrap_or_default()
}

/// Column type as reported by a catalog. Parsing is lenient: anything not
/// recognised is kept verbatim in [`DataType::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display)]
pub enum DataType {
    #[display("BOOLEAN")]
    Boolean,
    #[display("TINYINT")]
    TinyInt,
    #[display("SMALLINT")]
    SmallInt,
    #[display("INTEGER")]
    Integer,
    #[display("BIGINT")]
    BigInt,
    #[display("REAL")]
    Real,
    #[display("DOUBLE")]
    Double,
    #[display("DECIMAL({_0},{_1})")]
    Decimal(u32, u32),
    #[display("NUMERIC")]
    Numeric,
    #[display("CHAR{}", paren(_0))]
    Char(Option<u32>),
    #[display("VARCHAR{}", paren(_0))]
    VarChar(Option<u32>),
    #[display("TEXT")]
    Text,
    #[display("DATE")]
    Date,
    #[display("TIME")]
    Time,
    #[display("DATETIME")]
    DateTime,
    #[display("TIMESTAMP")]
    Timestamp,
    #[display("TIMESTAMPTZ")]
    Timestamptz,
    #[display("JSON")]
    Json,
    #[display("UUID")]
    Uuid,
    #[display("BINARY")]
    Binary,
    #[display("ARRAY<{_0}>")]
    Array(Box<DataType>),
    #[display("{_0}")]
    Other(String),
    #[default]
    #[display("UNKNOWN")]
    Unknown,
}

impl DataType {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return DataType::Unknown;
        }
        let upper = raw.to_ascii_uppercase();

        if let Some(inner) = upper.strip_suffix("[]") {
            return DataType::Array(Box::new(DataType::parse(inner)));
        }
        if let Some(inner) = upper
            .strip_prefix("ARRAY<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return DataType::Array(Box::new(DataType::parse(inner)));
        }

        let (name, args) = match upper.split_once('(') {
            Some((name, rest)) => {
                let args = rest
                    .trim_end_matches(')')
                    .split(',')
                    .filter_map(|a| a.trim().parse::<u32>().ok())
                    .collect::<Vec<_>>();
                (name.trim(), args)
            }
            None => (upper.as_str(), vec![]),
        };
        let first = args.first().copied();

        match name {
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            "TINYINT" | "INT1" => DataType::TinyInt,
            "SMALLINT" | "INT2" | "SMALLSERIAL" => DataType::SmallInt,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" | "SERIAL" => DataType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" | "LONG" => DataType::BigInt,
            "REAL" | "FLOAT" | "FLOAT4" => DataType::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => DataType::Double,
            "DECIMAL" | "NUMERIC" | "DEC" => match args.as_slice() {
                [p, s, ..] => DataType::Decimal(*p, *s),
                [p] => DataType::Decimal(*p, 0),
                [] => DataType::Numeric,
            },
            "CHAR" | "CHARACTER" | "BPCHAR" => DataType::Char(first),
            "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" => DataType::VarChar(first),
            "TEXT" | "STRING" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "CLOB" => DataType::Text,
            "DATE" => DataType::Date,
            "TIME" | "TIME WITHOUT TIME ZONE" => DataType::Time,
            "DATETIME" => DataType::DateTime,
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" | "TIMESTAMP_NTZ" => DataType::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP_LTZ" => DataType::Timestamptz,
            "JSON" | "JSONB" => DataType::Json,
            "UUID" => DataType::Uuid,
            "BINARY" | "VARBINARY" | "BLOB" | "LONGBLOB" | "BYTEA" => DataType::Binary,
            _ => DataType::Other(raw.to_string()),
        }
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        DataType::parse(value)
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        DataType::parse(&value)
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DataType::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int", DataType::Integer)]
    #[case("INT4", DataType::Integer)]
    #[case("bigint", DataType::BigInt)]
    #[case("VARCHAR(255)", DataType::VarChar(Some(255)))]
    #[case("character varying", DataType::VarChar(None))]
    #[case("DECIMAL(10, 2)", DataType::Decimal(10, 2))]
    #[case("numeric", DataType::Numeric)]
    #[case("timestamp with time zone", DataType::Timestamptz)]
    #[case("jsonb", DataType::Json)]
    #[case("int[]", DataType::Array(Box::new(DataType::Integer)))]
    #[case("array<string>", DataType::Array(Box::new(DataType::Text)))]
    #[case("geometry", DataType::Other("geometry".into()))]
    #[case("", DataType::Unknown)]
    fn parses_leniently(#[case] raw: &str, #[case] expected: DataType) {
        assert_eq!(DataType::parse(raw), expected);
    }

    #[rstest]
    #[case(DataType::VarChar(Some(64)), "VARCHAR(64)")]
    #[case(DataType::VarChar(None), "VARCHAR")]
    #[case(DataType::Decimal(10, 2), "DECIMAL(10,2)")]
    #[case(DataType::Array(Box::new(DataType::BigInt)), "ARRAY<BIGINT>")]
    fn displays_as_sql(#[case] data_type: DataType, #[case] expected: &str) {
        assert_eq!(data_type.to_string(), expected);
    }

    #[test]
    fn deserializes_from_type_strings() {
        let parsed: Vec<DataType> = serde_json::from_str(r#"["TEXT", "uuid"]"#).unwrap();
        assert_eq!(parsed, vec![DataType::Text, DataType::Uuid]);
    }
}
