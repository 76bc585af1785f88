use super::*;
use itertools::Itertools;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const COLUMNS_SQL: &str = "
    SELECT c.table_schema::text,
           c.table_name::text,
           t.table_type::text,
           c.column_name::text,
           CASE WHEN c.character_maximum_length IS NOT NULL
                THEN c.data_type || '(' || c.character_maximum_length || ')'
                ELSE c.data_type
           END::text,
           c.is_nullable = 'YES',
           c.ordinal_position::int4
    FROM information_schema.columns c
    JOIN information_schema.tables t
      ON t.table_schema = c.table_schema AND t.table_name = c.table_name
    WHERE c.table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY c.table_schema, c.table_name, c.ordinal_position";

const ROUTINES_SQL: &str = "
    SELECT DISTINCT r.routine_name::text
    FROM information_schema.routines r
    WHERE r.specific_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY 1";

type ColumnRow = (String, String, String, String, String, bool, i32);

/// Catalog read live from a Postgres server's `information_schema`. Schemas
/// play the role of databases.
pub struct PostgresCatalog {
    pool: PgPool,
    refresh: Duration,
    default_database: String,
    cached: RwLock<Option<(Instant, Arc<Catalog>)>>,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool, refresh: Duration, default_database: Option<String>) -> Self {
        Self {
            pool,
            refresh,
            default_database: default_database.unwrap_or_else(|| "public".into()),
            cached: RwLock::new(None),
        }
    }

    /// Pool that connects on first use, so startup never waits on the server.
    pub fn connect_lazy(
        url: &str,
        refresh: Duration,
        default_database: Option<String>,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;
        Ok(Self::new(pool, refresh, default_database))
    }

    /// Cached snapshot, reloaded once older than the refresh interval.
    pub async fn snapshot(&self) -> Result<Arc<Catalog>> {
        if let Some((loaded, catalog)) = self.cached.read().await.as_ref()
            && loaded.elapsed() < self.refresh
        {
            return Ok(catalog.clone());
        }

        let mut cached = self.cached.write().await;
        if let Some((loaded, catalog)) = cached.as_ref()
            && loaded.elapsed() < self.refresh
        {
            return Ok(catalog.clone());
        }
        let catalog = Arc::new(self.load().await?);
        *cached = Some((Instant::now(), catalog.clone()));
        Ok(catalog)
    }

    pub async fn load(&self) -> Result<Catalog> {
        let started = Instant::now();
        let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL).fetch_all(&self.pool).await?;
        let routines: Vec<(String,)> = sqlx::query_as(ROUTINES_SQL).fetch_all(&self.pool).await?;

        let mut databases: Vec<Database> = Vec::new();
        let by_table = rows
            .into_iter()
            .chunk_by(|(schema, table, kind, ..)| (schema.clone(), table.clone(), kind.clone()));
        for ((schema, table, kind), columns) in &by_table {
            let mut table = Table::new(table).with_columns(columns.map(
                |(_, _, _, name, data_type, nullable, ordinal)| Column {
                    name,
                    data_type: DataType::parse(&data_type),
                    nullable,
                    ordinal: usize::try_from(ordinal).unwrap_or_default(),
                },
            ));
            if kind == "VIEW" {
                table = table.into_view();
            }
            match databases.iter_mut().find(|db| db.name == schema) {
                Some(db) => db.insert_table(table),
                None => databases.push(Database::new(schema).with_table(table)),
            }
        }

        let catalog = Catalog::new(databases)
            .with_default_database(Some(self.default_database.clone()))
            .with_functions(
                routines
                    .into_iter()
                    .map(|(name,)| Function::new(name, FunctionKind::Scalar)),
            );
        debug!(
            "Loaded Postgres catalog ({} schemas) in {:#.2?}",
            catalog.list_databases().len(),
            started.elapsed()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[ignore = "needs a Docker daemon"]
    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    async fn loads_tables_views_and_columns(ctx: &mut IsolatedIntegrationTest) -> Result {
        sqlx::query(
            "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(255), email TEXT NOT NULL)",
        )
        .execute(&ctx.pool)
        .await?;
        sqlx::query("CREATE VIEW named_users AS SELECT id, name FROM users")
            .execute(&ctx.pool)
            .await?;

        let catalog = PostgresCatalog::new(ctx.pool.clone(), Duration::from_secs(60), None)
            .load()
            .await?;

        let users = catalog.find_table("users", None).found().unwrap();
        let columns = users
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.clone(), c.nullable))
            .collect::<Vec<_>>();
        assert_eq!(
            columns,
            vec![
                ("id", DataType::Integer, false),
                ("name", DataType::VarChar(Some(255)), true),
                ("email", DataType::Text, false),
            ]
        );
        let view = catalog.find_table("named_users", Some("public")).found().unwrap();
        assert_eq!(view.kind, TableKind::View);
        Ok(())
    }

    #[ignore = "needs a Docker daemon"]
    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    async fn snapshot_is_cached_until_refresh(ctx: &mut IsolatedIntegrationTest) -> Result {
        let source = PostgresCatalog::new(ctx.pool.clone(), Duration::from_secs(600), None);
        let first = source.snapshot().await?;
        sqlx::query("CREATE TABLE late (id INT)")
            .execute(&ctx.pool)
            .await?;
        let second = source.snapshot().await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.find_table("late", None).found().is_none());
        Ok(())
    }
}
