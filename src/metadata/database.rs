use super::*;

/// A database (or schema, for engines that qualify tables by schema) and
/// the tables and views it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub tables: Vec<Arc<Table>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.insert_table(table);
        self
    }

    /// Insert (or overwrite) a table.
    pub fn insert_table(&mut self, mut table: Table) {
        table.renumber();
        let table = Arc::new(table);
        match self
            .tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&table.name))
        {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_case_insensitively() {
        let mut db = Database::new("shop").with_table(Table::new("Users"));
        db.insert_table(Table::new_with_ordered("users", [("id", DataType::Integer)]));
        assert_eq!(db.tables.len(), 1);
        assert_eq!(db.table("USERS").map(|t| t.columns.len()), Some(1));
    }
}
