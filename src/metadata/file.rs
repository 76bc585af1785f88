use super::*;
use std::path::Path;

/// On-disk catalog snapshot.
///
/// ```json
/// { "defaultDatabase": "shop",
///   "databases": [{ "name": "shop", "tables": [
///       { "name": "users", "columns": [{ "name": "id", "type": "INT" }] }] }],
///   "functions": [{ "name": "my_udf", "kind": "scalar" }] }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    #[serde(default)]
    catalogs: Vec<String>,
    #[serde(default)]
    default_database: Option<String>,
    #[serde(default)]
    databases: Vec<DatabaseFile>,
    #[serde(default)]
    functions: Vec<Function>,
}

#[derive(Debug, Deserialize)]
struct DatabaseFile {
    name: String,
    #[serde(default)]
    tables: Vec<Table>,
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        let databases = file
            .databases
            .into_iter()
            .map(|db| {
                db.tables
                    .into_iter()
                    .fold(Database::new(db.name), Database::with_table)
            })
            .collect();
        Catalog::new(databases)
            .with_catalogs(file.catalogs)
            .with_default_database(file.default_database)
            .with_functions(file.functions)
    }
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| Error::Catalog(e.to_string()))?;
        Ok(file.into())
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        let catalog = Catalog::from_json(&json)?;
        info!(
            "Loaded catalog with {} databases from {}",
            catalog.list_databases().len(),
            path.display()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "defaultDatabase": "shop",
        "databases": [
            { "name": "shop", "tables": [
                { "name": "users", "columns": [
                    { "name": "id", "type": "INT", "nullable": false },
                    { "name": "name", "type": "VARCHAR(255)" }
                ] },
                { "name": "active_users", "kind": "view" }
            ] }
        ],
        "functions": [{ "name": "my_udf", "signature": "my_udf(x)" }]
    }"#;

    #[test]
    fn parses_snapshot() {
        let catalog = Catalog::from_json(JSON).unwrap();
        let users = catalog.find_table("users", None).found().unwrap();
        assert_eq!(users.columns[1].data_type, DataType::VarChar(Some(255)));
        assert!(!users.columns[0].nullable);
        assert_eq!(users.columns[1].ordinal, 2);
        let view = catalog.find_table("active_users", None).found().unwrap();
        assert_eq!(view.kind, TableKind::View);
        assert!(catalog.list_functions().iter().any(|f| f.name == "my_udf"));
    }

    #[test]
    fn malformed_snapshot_is_a_catalog_error() {
        assert!(matches!(
            Catalog::from_json("{ not json"),
            Err(Error::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = Catalog::from_file(Path::new("/definitely/not/here.json")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
