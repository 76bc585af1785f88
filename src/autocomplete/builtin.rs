use super::*;

impl RuleEngine {
    /// The rule table shipped with the service.
    pub fn with_builtin_rules() -> Self {
        RuleEngine::new(vec![
            Rule::new("keyword-basic", RuleKind::Keyword, has_keywords, keywords),
            Rule::new("table-basic", RuleKind::Table, expects_table, tables),
            Rule::new("database-basic", RuleKind::Schema, expects_database, databases),
            Rule::new("column-basic", RuleKind::Column, expects_bare_column, columns),
            Rule::new(
                "column-qualified",
                RuleKind::SmartColumn,
                expects_qualified_column,
                qualified_columns,
            ),
            Rule::new("function-basic", RuleKind::Function, expects_function, functions),
            Rule::new("join-keywords", RuleKind::Join, after_table, join_keywords),
            Rule::new("where-operators", RuleKind::Where, after_predicate_operand, operators),
            Rule::new("group-by-select-items", RuleKind::GroupBy, in_group_by, select_items),
            Rule::new("order-by-aliases", RuleKind::OrderBy, in_order_by, order_aliases),
            Rule::new(
                "statement-tables",
                RuleKind::SmartTable,
                expects_bare_table,
                statement_tables,
            ),
            Rule::new("join-condition", RuleKind::SmartJoin, in_join_condition, join_conditions),
        ])
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        RuleEngine::with_builtin_rules()
    }
}

fn qualified(ctx: &ScopeContext) -> bool {
    ctx.word.qualifier.is_some()
}

fn has_keywords(ctx: &ScopeContext) -> bool {
    !qualified(ctx) && !ctx.syntax.keywords.is_empty()
}

fn keywords(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    ctx.syntax
        .keywords
        .iter()
        .map(|k| CompletionCandidate::keyword(ctx.token_case.apply(k)))
        .collect()
}

fn expects_table(ctx: &ScopeContext) -> bool {
    ctx.expects(SyntaxContextType::Table)
}

fn expects_bare_table(ctx: &ScopeContext) -> bool {
    expects_table(ctx) && !qualified(ctx)
}

fn tables(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let database = ctx.word.qualifier.as_deref();
    ctx.catalog
        .list_tables(database)
        .into_iter()
        .map(|t| {
            let kind = match t.kind {
                TableKind::Table => CandidateKind::Table,
                TableKind::View => CandidateKind::View,
            };
            CompletionCandidate::new(kind, &t.name)
                .with_detail(format!("{} columns", t.columns.len()))
        })
        .collect()
}

fn expects_database(ctx: &ScopeContext) -> bool {
    ctx.expects(SyntaxContextType::Database) && !qualified(ctx)
}

fn databases(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    ctx.catalog
        .list_databases()
        .into_iter()
        .map(|d| CompletionCandidate::new(CandidateKind::Database, &d.name))
        .collect()
}

fn column_candidate(column: ColumnInfo) -> CompletionCandidate {
    let detail = match &column.data_type {
        Some(data_type) => format!("{}.{} {data_type}", column.table, column.name),
        None => format!("{}.{}", column.table, column.name),
    };
    CompletionCandidate::new(CandidateKind::Column, column.name).with_detail(detail)
}

fn expects_bare_column(ctx: &ScopeContext) -> bool {
    ctx.expects(SyntaxContextType::Column) && !qualified(ctx)
}

/// Columns of every table bound in the caret's scope, plus SELECT-list
/// aliases where the clause may reference them.
fn columns(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let mut out = ctx
        .visible_columns()
        .into_iter()
        .map(column_candidate)
        .collect::<Vec<_>>();
    if matches!(ctx.clause, Some(Clause::OrderBy | Clause::GroupBy | Clause::Having)) {
        out.extend(ctx.column_aliases().iter().map(|a| {
            CompletionCandidate::new(CandidateKind::Alias, &a.alias).with_detail(&a.expr)
        }));
    }
    out
}

fn expects_qualified_column(ctx: &ScopeContext) -> bool {
    ctx.expects(SyntaxContextType::Column) && qualified(ctx)
}

fn qualified_columns(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    match ctx.qualified_columns() {
        Lookup::Found(columns) => columns.into_iter().map(column_candidate).collect(),
        Lookup::Ambiguous => {
            debug!("Qualifier {:?} is ambiguous", ctx.word.qualifier);
            vec![]
        }
        Lookup::NotFound => vec![],
    }
}

/// Functions are offered once something has been typed; aggregates only
/// where they are legal.
fn expects_function(ctx: &ScopeContext) -> bool {
    ctx.expects(SyntaxContextType::Function) && !ctx.word.prefix.is_empty()
}

fn functions(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let aggregates = ctx.clause.is_some_and(Clause::allows_aggregates);
    ctx.catalog
        .list_functions()
        .into_iter()
        .filter(|f| aggregates || f.kind != FunctionKind::Aggregate)
        .map(|f| {
            let candidate = CompletionCandidate::new(CandidateKind::Function, &f.name);
            match &f.signature {
                Some(signature) => candidate.with_detail(signature),
                None => candidate.with_detail(f.kind),
            }
        })
        .collect()
}

fn after_table(ctx: &ScopeContext) -> bool {
    ctx.syntax.slot == Slot::AfterOperand
        && matches!(ctx.clause, Some(Clause::From | Clause::Join | Clause::On))
}

const JOIN_KEYWORDS: &[&str] = &[
    "INNER JOIN",
    "LEFT JOIN",
    "RIGHT JOIN",
    "FULL JOIN",
    "CROSS JOIN",
    "LEFT OUTER JOIN",
];

fn join_keywords(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    JOIN_KEYWORDS
        .iter()
        .map(|k| CompletionCandidate::keyword(ctx.token_case.apply(k)))
        .collect()
}

fn after_predicate_operand(ctx: &ScopeContext) -> bool {
    ctx.syntax.slot == Slot::AfterOperand
        && matches!(ctx.clause, Some(Clause::Where | Clause::On | Clause::Having))
}

const OPERATORS: &[&str] = &[
    "=", "<>", "LIKE", "IN", "BETWEEN", "IS NULL", "IS NOT NULL", "NOT IN",
];

fn operators(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    OPERATORS
        .iter()
        .map(|op| CompletionCandidate::new(CandidateKind::Operator, ctx.token_case.apply(op)))
        .collect()
}

fn in_group_by(ctx: &ScopeContext) -> bool {
    ctx.clause == Some(Clause::GroupBy) && expects_bare_column(ctx)
}

/// Plain column references of the SELECT list, which are what a GROUP BY
/// usually needs.
fn select_items(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let Some(scope) = ctx.scope() else {
        return vec![];
    };
    scope
        .projection
        .iter()
        .filter_map(|item| match &item.expr {
            ProjectionExpr::Column { name, .. } => Some(
                CompletionCandidate::new(CandidateKind::Column, name).with_detail("select item"),
            ),
            _ => None,
        })
        .collect()
}

fn in_order_by(ctx: &ScopeContext) -> bool {
    ctx.clause == Some(Clause::OrderBy) && expects_bare_column(ctx)
}

fn order_aliases(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    ctx.column_aliases()
        .iter()
        .map(|a| CompletionCandidate::new(CandidateKind::Alias, &a.alias).with_detail(&a.expr))
        .collect()
}

/// CTE names and tables the statement already mentions.
fn statement_tables(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let ctes = ctx
        .visible_ctes()
        .into_iter()
        .map(|name| CompletionCandidate::new(CandidateKind::Table, name).with_detail("cte"));
    let referenced = ctx
        .statement_tables
        .iter()
        .map(|name| {
            CompletionCandidate::new(CandidateKind::Table, name).with_detail("in statement")
        });
    ctes.chain(referenced).collect()
}

fn in_join_condition(ctx: &ScopeContext) -> bool {
    ctx.clause == Some(Clause::On) && expects_bare_column(ctx) && ctx.bindings().len() >= 2
}

/// Equality predicates between the newest binding and earlier ones: equal
/// column names, or `<table>_id` against `id`.
fn join_conditions(ctx: &ScopeContext) -> Vec<CompletionCandidate> {
    let bindings = ctx.bindings();
    let Some((joined, earlier)) = bindings.split_last() else {
        return vec![];
    };
    let right = ctx.tree.binding_columns(joined);
    let mut out = Vec::new();
    for left_binding in earlier {
        let left = ctx.tree.binding_columns(left_binding);
        for l in &left {
            for r in &right {
                let matches = l.name.eq_ignore_ascii_case(&r.name)
                    || foreign_key(&left_binding.name, l, r)
                    || foreign_key(&joined.name, r, l);
                if matches {
                    let text = format!("{}.{} = {}.{}", l.table, l.name, r.table, r.name);
                    out.push(
                        CompletionCandidate::new(CandidateKind::Keyword, text)
                            .with_detail("join condition"),
                    );
                }
            }
        }
    }
    out
}

/// `fk` is named `<table>_id` (singular or plural table name) and `pk` is
/// `id` of `table`.
fn foreign_key(table: &str, pk: &ColumnInfo, fk: &ColumnInfo) -> bool {
    if !pk.name.eq_ignore_ascii_case("id") {
        return false;
    }
    let Some(stem) = fk.name.to_ascii_lowercase().strip_suffix("_id").map(str::to_string) else {
        return false;
    };
    let table = table.to_ascii_lowercase();
    table == stem || table.strip_suffix('s') == Some(stem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_catalog;
    use itertools::Itertools;

    fn context(marked: &str) -> ScopeContext {
        let offset = marked.find('|').unwrap();
        let sql = marked.replacen('|', "", 1);
        let extractor = TokenExtractor::default();
        let extraction = extractor.extract_entities(&sql).unwrap();
        let syntax = extractor.suggest_at_position(&extraction, offset);
        ScopeContext::new(&extraction, syntax, offset, Arc::new(sample_catalog()))
    }

    fn texts(candidates: Vec<CompletionCandidate>) -> Vec<String> {
        candidates.into_iter().map(|c| c.insert_text).collect()
    }

    fn fired(marked: &str) -> Vec<&'static str> {
        let ctx = context(marked);
        let engine = RuleEngine::with_builtin_rules();
        engine
            .execution_order()
            .into_iter()
            .filter(|r| (r.condition)(&ctx))
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn ships_one_rule_per_kind() {
        let engine = RuleEngine::default();
        let kinds = engine.rules().iter().map(|r| r.kind).collect::<Vec<_>>();
        assert_eq!(kinds.len(), 12);
        assert!(kinds.iter().all_unique());
    }

    #[test]
    fn table_position_fires_table_rules() {
        assert_eq!(
            fired("SELECT * FROM |"),
            vec!["table-basic", "database-basic", "statement-tables"]
        );
    }

    #[test]
    fn qualified_column_fires_only_the_smart_rule() {
        assert_eq!(fired("SELECT u.| FROM users u"), vec!["column-qualified"]);
    }

    #[test]
    fn tables_of_a_database_include_views() {
        let ctx = context("SELECT * FROM shop.|");
        let candidates = tables(&ctx);
        let view = candidates.iter().find(|c| c.insert_text == "active_users").unwrap();
        assert_eq!(view.kind, CandidateKind::View);
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn aggregates_only_where_legal() {
        let select = texts(functions(&context("SELECT co| FROM users")));
        assert!(select.contains(&"COUNT".to_string()));
        let filter = texts(functions(&context("SELECT * FROM users WHERE co|")));
        assert!(!filter.contains(&"COUNT".to_string()));
        assert!(filter.contains(&"COALESCE".to_string()));
    }

    #[test]
    fn functions_need_a_prefix() {
        assert!(!expects_function(&context("SELECT | FROM users")));
    }

    #[test]
    fn keywords_follow_token_case() {
        let ctx = context("select * from users wh|");
        assert!(texts(keywords(&ctx)).contains(&"where".to_string()));
    }

    #[test]
    fn order_by_offers_select_aliases() {
        let ctx = context("SELECT name AS who FROM users ORDER BY |");
        assert_eq!(texts(order_aliases(&ctx)), vec!["who"]);
        assert!(texts(columns(&ctx)).contains(&"who".to_string()));
    }

    #[test]
    fn group_by_offers_select_items() {
        let ctx = context("SELECT status, count(*) FROM orders GROUP BY |");
        assert_eq!(texts(select_items(&ctx)), vec!["status"]);
    }

    #[test]
    fn join_conditions_use_foreign_key_names() {
        let ctx = context("SELECT * FROM users u JOIN orders o ON |");
        let conditions = texts(join_conditions(&ctx));
        assert!(conditions.contains(&"u.id = o.id".to_string()));
        assert!(conditions.contains(&"u.id = o.user_id".to_string()));
        assert!(conditions.contains(&"u.created_at = o.created_at".to_string()));
    }

    #[test]
    fn statement_tables_include_ctes() {
        let ctx = context("WITH recent AS (SELECT * FROM orders) SELECT * FROM recent JOIN |");
        let names = texts(statement_tables(&ctx));
        assert_eq!(names, vec!["recent", "orders", "recent"]);
    }

    #[test]
    fn operators_after_where_operand() {
        let ctx = context("SELECT * FROM users WHERE id |");
        assert!(after_predicate_operand(&ctx));
        assert!(texts(operators(&ctx)).contains(&"IS NOT NULL".to_string()));
    }
}
