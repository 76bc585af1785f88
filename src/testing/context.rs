use crate::*;
use crate::testing::*;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use test_context::AsyncTestContext;
pub use test_context::test_context;

/// A throwaway database in the shared container. Its `public` schema is
/// empty until the test creates tables in it.
pub struct IsolatedIntegrationTest {
    pub pool: PgPool,
    pub database: String,
}

impl IsolatedIntegrationTest {
    /// Live catalog over this database's `information_schema`.
    pub fn catalog(&self, refresh: Duration) -> PostgresCatalog {
        PostgresCatalog::new(self.pool.clone(), refresh, None)
    }

    /// Runs DDL statements in order.
    pub async fn execute_all(&self, statements: &[&'static str]) -> Result {
        for statement in statements {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn create_database<'c, E: sqlx::Executor<'c, Database = Postgres>>(exec: E) -> String {
        use rand::Rng;
        let suffix = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(10)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        let database = format!("sqlctx_{suffix}");
        sqlx::query(sqlx::AssertSqlSafe(format!("CREATE DATABASE {database}")))
            .execute(exec)
            .await
            .expect("create test database");
        database
    }
}

impl AsyncTestContext for IsolatedIntegrationTest {
    async fn setup() -> Self {
        crate::testing::common_init();
        let admin = pool("postgres").await;
        let database = Self::create_database(&admin).await;
        debug!("Created test database {database}");
        Self {
            pool: pool(&database).await,
            database,
        }
    }

    async fn teardown(self) {
        self.pool.close().await;
        let admin = pool("postgres").await;
        sqlx::query(sqlx::AssertSqlSafe(format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            self.database
        )))
        .execute(&admin)
        .await
        .expect("drop test database");
    }
}
