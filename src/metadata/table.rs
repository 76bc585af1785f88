use super::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    /// Ordered by `Column::ordinal`.
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Table,
            columns: Vec::new(),
        }
    }

    /// Construct a table with an explicit ordered list of columns.
    pub fn new_with_ordered(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (impl Into<String>, DataType)>,
    ) -> Self {
        Self::new(name).with_columns(columns.into_iter().map(|(n, dt)| Column::new(n, dt)))
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self.renumber();
        self
    }

    pub fn into_view(mut self) -> Self {
        self.kind = TableKind::View;
        self
    }

    /// Assign ordinals to columns that came without one and keep the
    /// columns sorted by them.
    pub fn renumber(&mut self) {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            if column.ordinal == 0 {
                column.ordinal = idx + 1;
            }
        }
        self.columns.sort_by_key(|c| c.ordinal);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_columns_are_numbered() {
        let table = Table::new_with_ordered(
            "users",
            [("id", DataType::Integer), ("name", DataType::Text)],
        );
        let ordinals = table.columns.iter().map(|c| c.ordinal).collect::<Vec<_>>();
        assert_eq!(ordinals, vec![1, 2]);
        assert_eq!(table.column("NAME").map(|c| c.ordinal), Some(2));
    }

    #[test]
    fn explicit_ordinals_win() {
        let mut late = Column::new("b", DataType::Text);
        late.ordinal = 9;
        let table = Table::new("t").with_columns([late, Column::new("a", DataType::Text)]);
        let names = table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b"]);
    }
}
