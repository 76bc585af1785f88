#![cfg(test)]
crate::reexport!(container);
crate::reexport!(context);
crate::reexport!(fixtures);
pub use rstest::*;

pub(in crate::testing) fn common_init() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

mod isolated_integration_tests {
    use super::{super::*, *};
    use std::time::Duration;

    fn live_service(ctx: &IsolatedIntegrationTest, refresh: Duration) -> ContextService {
        ContextService::new(
            CatalogSource::Postgres(ctx.catalog(refresh)),
            &config().completion,
        )
    }

    fn inserts(context: &SqlContext, kind: CandidateKind) -> Vec<&str> {
        context
            .suggestions
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.insert_text.as_str())
            .collect()
    }

    #[ignore = "needs a Docker daemon"]
    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    async fn connects_to_its_own_database(ctx: &mut IsolatedIntegrationTest) -> Result {
        let database: String = sqlx::query_scalar("SELECT current_database()")
            .fetch_one(&ctx.pool)
            .await?;
        assert_eq!(ctx.database, database);
        Ok(())
    }

    #[ignore = "needs a Docker daemon"]
    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    async fn live_catalog_feeds_column_suggestions(ctx: &mut IsolatedIntegrationTest) -> Result {
        ctx.execute_all(&[
            "CREATE TABLE customers (id INT PRIMARY KEY, full_name TEXT, joined DATE)",
        ])
        .await?;

        let service = live_service(ctx, Duration::from_secs(60));
        let (sql, position) = caret("SELECT c.| FROM customers c");
        let context = service.context(&sql, position, Some("postgresql")).await?;

        assert_eq!(inserts(&context, CandidateKind::Column), vec!["full_name", "id", "joined"]);
        assert_eq!(context.scope.current_table.as_deref(), Some("customers"));
        assert_eq!(context.scope.current_database.as_deref(), Some("public"));
        Ok(())
    }

    #[test_context(IsolatedIntegrationTest)]
    #[rstest]
    #[case("SELECT * FROM cus|", "tomers")]
    #[ignore = "needs a Docker daemon"]
    #[case("SELECT * FROM public.cus|", "tomers")]
    #[ignore = "needs a Docker daemon"]
    #[tokio::test]
    async fn live_tables_complete(
        ctx: &mut IsolatedIntegrationTest,
        #[case] marked: &str,
        #[case] expected: &str,
    ) -> Result {
        ctx.execute_all(&["CREATE TABLE customers (id INT PRIMARY KEY)"])
            .await?;

        let service = live_service(ctx, Duration::from_secs(60));
        let (sql, position) = caret(marked);
        let context = service.context(&sql, position, None).await?;

        assert_eq!(inserts(&context, CandidateKind::Table), vec![expected]);
        Ok(())
    }

    #[ignore = "needs a Docker daemon"]
    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    async fn schema_changes_show_after_refresh(ctx: &mut IsolatedIntegrationTest) -> Result {
        ctx.execute_all(&["CREATE TABLE notes (id INT PRIMARY KEY)"])
            .await?;
        let service = live_service(ctx, Duration::ZERO);
        let (sql, position) = caret("SELECT n.| FROM notes n");

        let before = service.context(&sql, position, None).await?;
        assert_eq!(inserts(&before, CandidateKind::Column), vec!["id"]);

        ctx.execute_all(&["ALTER TABLE notes ADD COLUMN body TEXT"])
            .await?;
        let after = service.context(&sql, position, None).await?;
        assert_eq!(inserts(&after, CandidateKind::Column), vec!["body", "id"]);
        Ok(())
    }
}
