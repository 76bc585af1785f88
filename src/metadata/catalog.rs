use super::*;

/// Outcome of a name lookup. Ambiguity is its own answer so callers cannot
/// mistake it for "nothing found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Ambiguous,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Ambiguous => Lookup::Ambiguous,
        }
    }

    /// Collapse a sequence of candidates: one is found, several are
    /// ambiguous.
    pub fn from_matches(mut matches: impl Iterator<Item = T>) -> Self {
        match (matches.next(), matches.next()) {
            (Some(v), None) => Lookup::Found(v),
            (Some(_), Some(_)) => Lookup::Ambiguous,
            (None, _) => Lookup::NotFound,
        }
    }
}

/// Immutable catalog snapshot shared by every computation that started
/// while it was current.
#[derive(Debug, Clone)]
pub struct Catalog {
    catalogs: Vec<String>,
    databases: Vec<Database>,
    functions: Vec<Function>,
    default_database: Option<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new(Vec::new())
    }
}

impl Catalog {
    /// A catalog over `databases` with the built-in functions preloaded.
    pub fn new(databases: Vec<Database>) -> Self {
        Self {
            catalogs: Vec::new(),
            databases,
            functions: builtin_functions(),
            default_database: None,
        }
    }

    pub fn with_catalogs(mut self, catalogs: impl IntoIterator<Item = String>) -> Self {
        self.catalogs.extend(catalogs);
        self
    }

    /// Add functions, ignoring names already known.
    pub fn with_functions(mut self, functions: impl IntoIterator<Item = Function>) -> Self {
        for function in functions {
            if !self
                .functions
                .iter()
                .any(|f| f.name.eq_ignore_ascii_case(&function.name))
            {
                self.functions.push(function);
            }
        }
        self
    }

    pub fn with_default_database(mut self, database: Option<String>) -> Self {
        if database.is_some() {
            self.default_database = database;
        }
        self
    }

    pub fn default_database(&self) -> Option<&Database> {
        self.default_database
            .as_deref()
            .and_then(|name| self.database(name))
    }

    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a table reference. With an explicit database only that
    /// database is searched; otherwise the default database wins, then a
    /// unique match across all databases.
    pub fn find_table(&self, name: &str, database: Option<&str>) -> Lookup<Arc<Table>> {
        if let Some(database) = database {
            return match self.database(database).and_then(|db| db.table(name)) {
                Some(table) => Lookup::Found(table.clone()),
                None => Lookup::NotFound,
            };
        }
        if let Some(table) = self.default_database().and_then(|db| db.table(name)) {
            return Lookup::Found(table.clone());
        }
        Lookup::from_matches(
            self.databases
                .iter()
                .filter_map(|db| db.table(name))
                .cloned(),
        )
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Read access to catalog contents. Every method is infallible and returns
/// an empty list when nothing matches.
pub trait CatalogProvider {
    fn list_catalogs(&self) -> Vec<&str>;
    fn list_databases(&self) -> Vec<&Database>;
    /// Tables of `database`; without one, the default database's tables, or
    /// every table when no default is set.
    fn list_tables(&self, database: Option<&str>) -> Vec<&Arc<Table>>;
    fn list_columns(&self, table: &str, database: Option<&str>) -> Vec<&Column>;
    fn list_functions(&self) -> Vec<&Function>;

    fn search_databases(&self, prefix: &str) -> Vec<&Database> {
        self.list_databases()
            .into_iter()
            .filter(|d| starts_with_ignore_case(&d.name, prefix))
            .collect()
    }

    fn search_tables(&self, database: Option<&str>, prefix: &str) -> Vec<&Arc<Table>> {
        self.list_tables(database)
            .into_iter()
            .filter(|t| starts_with_ignore_case(&t.name, prefix))
            .collect()
    }

    fn search_columns(&self, table: &str, database: Option<&str>, prefix: &str) -> Vec<&Column> {
        self.list_columns(table, database)
            .into_iter()
            .filter(|c| starts_with_ignore_case(&c.name, prefix))
            .collect()
    }

    fn search_functions(&self, prefix: &str) -> Vec<&Function> {
        self.list_functions()
            .into_iter()
            .filter(|f| starts_with_ignore_case(&f.name, prefix))
            .collect()
    }
}

impl CatalogProvider for Catalog {
    fn list_catalogs(&self) -> Vec<&str> {
        self.catalogs.iter().map(String::as_str).collect()
    }

    fn list_databases(&self) -> Vec<&Database> {
        self.databases.iter().collect()
    }

    fn list_tables(&self, database: Option<&str>) -> Vec<&Arc<Table>> {
        match database {
            Some(name) => self
                .database(name)
                .map(|db| db.tables.iter().collect())
                .unwrap_or_default(),
            None => match self.default_database() {
                Some(db) => db.tables.iter().collect(),
                None => self.databases.iter().flat_map(|db| &db.tables).collect(),
            },
        }
    }

    fn list_columns(&self, table: &str, database: Option<&str>) -> Vec<&Column> {
        let found = match database {
            Some(name) => self.database(name).and_then(|db| db.table(table)),
            None => self
                .default_database()
                .and_then(|db| db.table(table))
                .or_else(|| {
                    Lookup::from_matches(self.databases.iter().filter_map(|db| db.table(table)))
                        .found()
                }),
        };
        found
            .map(|t| t.columns.iter().collect())
            .unwrap_or_default()
    }

    fn list_functions(&self) -> Vec<&Function> {
        self.functions.iter().collect()
    }
}
