use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: DataType,
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    /// 1-based position inside its table; 0 until the table numbers it.
    #[serde(default)]
    pub ordinal: usize,
}

fn nullable_by_default() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            ordinal: 0,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}
