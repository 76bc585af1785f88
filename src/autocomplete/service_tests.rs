#![cfg(test)]
use crate::*;
use futures::future::join_all;
use itertools::Itertools;
use std::cmp::Reverse;

fn service() -> ContextService {
    ContextService::new(CatalogSource::from(sample_catalog()), &config().completion)
}

async fn complete(marked: &str) -> SqlContext {
    let (sql, position) = caret(marked);
    service().context(&sql, position, None).await.unwrap()
}

fn inserts(context: &SqlContext, kind: CandidateKind) -> Vec<&str> {
    context
        .suggestions
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.insert_text.as_str())
        .collect()
}

#[tokio::test]
async fn qualified_prefix_completes_the_column() {
    let context = complete("SELECT u.na| FROM users u").await;
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["me"]);
    let name = &context.suggestions[0];
    assert_eq!(name.display_text, "name");
    assert_eq!(name.detail.as_deref(), Some("u.name VARCHAR(255)"));
    assert_eq!(context.text.current_word, "u.na");
    assert_eq!(context.text.current_token, "na");
}

#[rstest]
#[case(r#"SELECT "u".| FROM users "u""#, "postgresql")]
#[case(r#"SELECT "shop"."users".| FROM shop.users"#, "postgresql")]
#[case("SELECT `u`.| FROM users `u`", "mysql")]
#[tokio::test]
async fn quoted_qualifiers_resolve(#[case] marked: &str, #[case] language: &str) {
    let (sql, position) = caret(marked);
    let context = service().context(&sql, position, Some(language)).await.unwrap();
    assert_eq!(
        inserts(&context, CandidateKind::Column),
        vec!["created_at", "email", "id", "name"],
        "{marked}"
    );
    assert_eq!(context.scope.current_table.as_deref(), Some("users"));
}

#[rstest]
#[case("INSERT INTO users (id, na|")]
#[case("INSERT INTO users (na|")]
#[case("INSERT INTO shop.users (id, na|) VALUES (1, 'x')")]
#[tokio::test]
async fn insert_column_lists_complete_from_the_target(#[case] marked: &str) {
    let context = complete(marked).await;
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["me"], "{marked}");
    assert_eq!(context.scope.current_table.as_deref(), Some("users"));
}

#[tokio::test]
async fn columns_come_only_from_tables_in_scope() {
    let context = complete("SELECT | FROM users").await;
    let columns = inserts(&context, CandidateKind::Column);
    assert_eq!(columns, vec!["created_at", "email", "id", "name"]);
    assert_eq!(context.syntax.clause, "SELECT");
}

#[tokio::test]
async fn subquery_columns_stay_inside_the_subquery() {
    let context =
        complete("SELECT * FROM orders o WHERE o.user_id IN (SELECT id FROM users WHERE na|)")
            .await;
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["me"]);
    assert_eq!(context.scope.depth, 1);
    assert_eq!(context.scope.current_table.as_deref(), Some("users"));
}

#[tokio::test]
async fn derived_table_scope_is_its_own() {
    let context = complete("SELECT * FROM (SELECT id, name FROM users WHERE na|) AS sub").await;
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["me"]);
    assert_eq!(context.scope.depth, 1);
}

#[tokio::test]
async fn correlated_subquery_sees_the_outer_alias() {
    let context =
        complete("SELECT * FROM users u WHERE EXISTS (SELECT 1 FROM orders o WHERE o.user_id = u.|)")
            .await;
    assert_eq!(
        inserts(&context, CandidateKind::Column),
        vec!["created_at", "email", "id", "name"]
    );
}

#[tokio::test]
async fn cte_columns_expand_through_the_alias() {
    let context =
        complete("WITH t AS (SELECT id, name AS label FROM users) SELECT t.| FROM t").await;
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["id", "label"]);
}

#[tokio::test]
async fn derived_wildcards_expand() {
    let context = complete("SELECT sub.| FROM (SELECT u.*, 1 AS one FROM users u) sub").await;
    assert_eq!(
        inserts(&context, CandidateKind::Column),
        vec!["created_at", "email", "id", "name", "one"]
    );
}

#[tokio::test]
async fn ambiguous_alias_suggests_no_columns() {
    let context = complete("SELECT x.| FROM users x, orders x").await;
    assert!(inserts(&context, CandidateKind::Column).is_empty());
}

#[tokio::test]
async fn only_the_caret_statement_counts() {
    let context = complete("SELECT * FROM products; SELECT | FROM users").await;
    let columns = inserts(&context, CandidateKind::Column);
    assert!(!columns.contains(&"title"));
    assert!(columns.contains(&"email"));
    assert!(context.entities.iter().all(|e| e.name != "products"));
}

#[tokio::test]
async fn table_prefix_completes_tables() {
    let context = complete("SELECT * FROM us|").await;
    assert_eq!(inserts(&context, CandidateKind::Table), vec!["ers"]);
    assert!(inserts(&context, CandidateKind::Keyword).is_empty());
}

#[tokio::test]
async fn keywords_follow_the_typed_case() {
    let context = complete("select * from users wh|").await;
    assert_eq!(inserts(&context, CandidateKind::Keyword), vec!["ere"]);
    assert_eq!(context.text.current_token_case, TokenCase::Lower);
}

#[tokio::test]
async fn response_fields_are_filled() {
    let context =
        complete("SELECT * FROM users u JOIN orders o ON u.id = o.user_id AND count(|").await;
    assert_eq!(context.syntax.clause, "ON");
    assert_eq!(context.scope.current_function.as_deref(), Some("count"));
    assert_eq!(context.scope.table_aliases.get("u").map(String::as_str), Some("users"));
    assert_eq!(context.scope.table_aliases.get("o").map(String::as_str), Some("orders"));
    assert_eq!(context.text.previous_token.as_deref(), Some("("));
    assert_eq!(context.text.next_token, None);

    let json = serde_json::to_value(&context).unwrap();
    assert_eq!(json["scope"]["tableAliases"]["u"], "users");
    assert_eq!(json["text"]["currentTokenCase"], "upper");
    assert!(json["syntax"]["syntaxSuggestions"].is_array());
}

#[rstest]
#[case("", CaretPosition::new(1, 1))]
#[case("", CaretPosition::new(5, 40))]
#[case("   ", CaretPosition::new(1, 3))]
#[tokio::test]
async fn empty_text_offers_statement_keywords(#[case] sql: &str, #[case] position: CaretPosition) {
    let context = service().context(sql, position, None).await.unwrap();
    assert!(!context.suggestions.is_empty());
    assert!(context.suggestions.iter().all(|c| c.kind == CandidateKind::Keyword));
    assert!(context.entities.is_empty());
}

#[rstest]
#[case(CaretPosition::new(9, 1))]
#[case(CaretPosition::new(1, 400))]
#[case(CaretPosition::new(0, 0))]
#[tokio::test]
async fn out_of_range_positions_clamp(#[case] position: CaretPosition) {
    let sql = "SELECT * FROM users WHERE ";
    let context = service().context(sql, position, None).await.unwrap();
    assert_eq!(context.syntax.clause, "WHERE");
    for candidate in &context.suggestions {
        let range = candidate.replace_range.unwrap();
        assert_eq!(range.start, CaretPosition::new(1, 27));
    }
}

#[tokio::test]
async fn lexical_errors_degrade_to_keywords() {
    let context = complete("SELECT 'abc FROM us|").await;
    assert_eq!(context.syntax.clause, "NONE");
    assert!(context.entities.is_empty());
    assert!(context.suggestions.iter().all(|c| c.kind == CandidateKind::Keyword));
    assert_eq!(context.scope.depth, 0);
}

#[rstest]
#[case(Some("cobol"))]
#[case(Some(""))]
#[tokio::test]
async fn unsupported_language_is_rejected(#[case] language: Option<&str>) {
    let result = service()
        .context("SELECT 1", CaretPosition::new(1, 1), language)
        .await;
    assert!(matches!(result, Err(Error::UnsupportedLanguage(_))));
}

#[rstest]
#[case(None)]
#[case(Some("mysql"))]
#[case(Some("PostgreSQL"))]
#[case(Some("hive"))]
#[case(Some("spark"))]
#[case(Some("trino"))]
#[tokio::test]
async fn every_language_completes(#[case] language: Option<&str>) {
    let (sql, position) = caret("SELECT u.na| FROM users u");
    let context = service().context(&sql, position, language).await.unwrap();
    assert_eq!(inserts(&context, CandidateKind::Column), vec!["me"]);
}

#[rstest]
#[case("SELECT | FROM users u JOIN orders o ON u.id = o.user_id")]
#[case("SELECT * FROM |")]
#[case("SELECT * FROM users WHERE |")]
#[case("SELECT status, count(*) FROM orders GROUP BY |")]
#[case("SELECT name AS who FROM users ORDER BY |")]
#[case("SELECT * FROM users u JOIN orders o ON |")]
#[tokio::test]
async fn suggestions_are_ranked_unique_and_bounded(#[case] marked: &str) {
    let context = complete(marked).await;
    let suggestions = &context.suggestions;
    assert!(suggestions.len() <= config().completion.max_suggestions);
    assert!(suggestions.iter().map(|c| (c.kind, &c.insert_text)).all_unique());
    assert!(
        suggestions
            .iter()
            .map(|c| (Reverse(c.kind.priority()), &c.insert_text))
            .is_sorted()
    );
    let keys = suggestions.iter().map(|c| c.sort_key.clone()).collect::<Vec<_>>();
    assert_eq!(keys, (0..keys.len()).map(|i| format!("{i:04}")).collect::<Vec<_>>());
}

#[rstest]
#[case("SELECT u.na| FROM users u")]
#[case("SELECT * FROM us|")]
#[case("select * from users wh|")]
#[tokio::test]
async fn typed_prefix_plus_insert_is_the_display_text(#[case] marked: &str) {
    let context = complete(marked).await;
    let prefix = &context.text.current_token;
    assert!(!context.suggestions.is_empty());
    for candidate in &context.suggestions {
        let completed = format!("{prefix}{}", candidate.insert_text);
        assert!(completed.eq_ignore_ascii_case(&candidate.display_text));
    }
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let service = service();
    let (sql, position) = caret("SELECT o.| FROM users u JOIN orders o ON u.id = o.user_id");
    let first = service.context(&sql, position, None).await.unwrap();
    let cached = service.context(&sql, position, None).await.unwrap();
    let fresh = self::service().context(&sql, position, None).await.unwrap();
    assert_eq!(first, cached);
    assert_eq!(first, fresh);
}

#[tokio::test]
async fn concurrent_requests_match_sequential_ones() {
    let service = service();
    let requests = [
        "SELECT u.na| FROM users u",
        "SELECT * FROM |",
        "SELECT | FROM orders",
        "WITH t AS (SELECT id FROM users) SELECT t.| FROM t",
        "SELECT 'open FROM |",
    ]
    .into_iter()
    .cycle()
    .take(40)
    .map(caret)
    .collect::<Vec<_>>();

    let mut sequential = Vec::new();
    for (sql, position) in &requests {
        sequential.push(service.context(sql, *position, None).await.unwrap());
    }
    let concurrent = join_all(
        requests
            .iter()
            .map(|(sql, position)| service.context(sql, *position, None)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>>>()
    .unwrap();

    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn disabled_rules_change_the_output() {
    let mut engine = RuleEngine::with_builtin_rules();
    assert!(engine.set_enabled("column-qualified", false));
    let service = service().with_engine(engine);
    let (sql, position) = caret("SELECT u.na| FROM users u");
    let context = service.context(&sql, position, None).await.unwrap();
    assert!(context.suggestions.is_empty());
}
