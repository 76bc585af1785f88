use super::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[display("aggregate")]
    Aggregate,
    #[display("window")]
    Window,
    #[default]
    #[display("scalar")]
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

const AGGREGATES: &[(&str, &str)] = &[
    ("COUNT", "COUNT(expr)"),
    ("SUM", "SUM(expr)"),
    ("AVG", "AVG(expr)"),
    ("MIN", "MIN(expr)"),
    ("MAX", "MAX(expr)"),
    ("GROUP_CONCAT", "GROUP_CONCAT(expr)"),
    ("STRING_AGG", "STRING_AGG(expr, delimiter)"),
    ("ARRAY_AGG", "ARRAY_AGG(expr)"),
];

const WINDOWS: &[(&str, &str)] = &[
    ("ROW_NUMBER", "ROW_NUMBER() OVER (...)"),
    ("RANK", "RANK() OVER (...)"),
    ("DENSE_RANK", "DENSE_RANK() OVER (...)"),
    ("NTILE", "NTILE(n) OVER (...)"),
    ("LAG", "LAG(expr [, offset [, default]]) OVER (...)"),
    ("LEAD", "LEAD(expr [, offset [, default]]) OVER (...)"),
    ("FIRST_VALUE", "FIRST_VALUE(expr) OVER (...)"),
    ("LAST_VALUE", "LAST_VALUE(expr) OVER (...)"),
];

const SCALARS: &[(&str, &str)] = &[
    ("ABS", "ABS(n)"),
    ("CAST", "CAST(expr AS type)"),
    ("CEIL", "CEIL(n)"),
    ("COALESCE", "COALESCE(expr, ...)"),
    ("CONCAT", "CONCAT(str, ...)"),
    ("CURRENT_DATE", "CURRENT_DATE"),
    ("CURRENT_TIMESTAMP", "CURRENT_TIMESTAMP"),
    ("DATE_TRUNC", "DATE_TRUNC(unit, ts)"),
    ("EXTRACT", "EXTRACT(field FROM ts)"),
    ("FLOOR", "FLOOR(n)"),
    ("IFNULL", "IFNULL(expr, alt)"),
    ("LENGTH", "LENGTH(str)"),
    ("LOWER", "LOWER(str)"),
    ("NOW", "NOW()"),
    ("NULLIF", "NULLIF(a, b)"),
    ("REPLACE", "REPLACE(str, from, to)"),
    ("ROUND", "ROUND(n [, digits])"),
    ("SUBSTRING", "SUBSTRING(str, start [, len])"),
    ("TRIM", "TRIM(str)"),
    ("UPPER", "UPPER(str)"),
];

/// Functions every catalog offers regardless of its source.
pub fn builtin_functions() -> Vec<Function> {
    [
        (AGGREGATES, FunctionKind::Aggregate),
        (WINDOWS, FunctionKind::Window),
        (SCALARS, FunctionKind::Scalar),
    ]
    .into_iter()
    .flat_map(|(list, kind)| {
        list.iter()
            .map(move |(name, sig)| Function::new(*name, kind).with_signature(*sig))
    })
    .collect()
}
