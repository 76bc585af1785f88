use super::*;
use itertools::Itertools;

/// Letter case of the in-progress token. Keyword candidates are rendered in
/// the same case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum TokenCase {
    #[default]
    #[display("upper")]
    Upper,
    #[display("lower")]
    Lower,
    #[display("mixed")]
    Mixed,
}

impl TokenCase {
    /// Tokens without letters count as upper case.
    pub fn of(token: &str) -> Self {
        let has_upper = token.chars().any(char::is_uppercase);
        let has_lower = token.chars().any(char::is_lowercase);
        match (has_upper, has_lower) {
            (_, false) => TokenCase::Upper,
            (false, true) => TokenCase::Lower,
            (true, true) => TokenCase::Mixed,
        }
    }

    pub fn apply(self, keyword: &str) -> String {
        match self {
            TokenCase::Lower => keyword.to_lowercase(),
            TokenCase::Upper | TokenCase::Mixed => keyword.to_string(),
        }
    }
}

/// The identifier-or-dot run before the caret, split at its last dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentWord {
    pub full: String,
    /// Everything before the last dot (`shop.users` in `shop.users.na`).
    pub qualifier: Option<String>,
    /// The part being typed.
    pub prefix: String,
}

impl CurrentWord {
    pub fn parse(word: &str) -> Self {
        let (qualifier, prefix) = match word.rsplit_once('.') {
            Some((q, p)) => (Some(q.replace(['"', '`'], "")), p.to_string()),
            None => (None, word.to_string()),
        };
        Self {
            full: word.to_string(),
            qualifier,
            prefix,
        }
    }
}

/// Everything the completion rules may look at for one caret position.
#[derive(Debug, Clone)]
pub struct ScopeContext {
    pub tree: ScopeTree,
    /// Scope of the block containing the caret; `None` when nothing could
    /// be extracted.
    pub current: Option<ScopeId>,
    pub clause: Option<Clause>,
    pub word: CurrentWord,
    pub token_case: TokenCase,
    pub syntax: SyntaxSuggestions,
    pub catalog: Arc<Catalog>,
    /// Tables referenced anywhere in the caret's statement, in text order.
    pub statement_tables: Vec<String>,
    /// Function whose argument list encloses the caret.
    pub function: Option<String>,
    /// Column reference under the caret.
    pub column: Option<String>,
    pub offset: usize,
}

impl ScopeContext {
    pub fn new(
        extraction: &Extraction,
        syntax: SyntaxSuggestions,
        offset: usize,
        catalog: Arc<Catalog>,
    ) -> Self {
        let word = CurrentWord::parse(current_word(&extraction.sql, offset));
        let tree = resolve(extraction, &catalog);
        let statement_entities = extraction.statement_entities(offset);
        let statement_tables = statement_entities
            .iter()
            .filter(|e| e.kind == EntityKind::Table && !e.span.contains(offset))
            .map(|e| e.name.clone())
            .unique_by(|name| name.to_ascii_lowercase())
            .collect();
        let column = statement_entities
            .iter()
            .find(|e| e.kind == EntityKind::Column && e.span.contains(offset))
            .map(|e| e.name.clone());
        Self {
            tree,
            current: syntax.block,
            clause: syntax.clause,
            token_case: TokenCase::of(&word.prefix),
            word,
            syntax,
            catalog,
            statement_tables,
            function: extraction.enclosing_function(offset).map(str::to_string),
            column,
            offset,
        }
    }

    /// Root-less context used when the text could not be extracted.
    pub fn empty(sql: &str, offset: usize, catalog: Arc<Catalog>) -> Self {
        let word = CurrentWord::parse(current_word(sql, offset));
        Self {
            tree: ScopeTree::default(),
            current: None,
            clause: None,
            token_case: TokenCase::of(&word.prefix),
            word,
            syntax: SyntaxSuggestions::fallback(),
            catalog,
            statement_tables: Vec::new(),
            function: None,
            column: None,
            offset,
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.current.and_then(|id| self.tree.get(id))
    }

    pub fn expects(&self, context: SyntaxContextType) -> bool {
        self.syntax.expects(context)
    }

    pub fn depth(&self) -> usize {
        self.current.map(|id| self.tree.depth(id)).unwrap_or(0)
    }

    pub fn bindings(&self) -> &[TableBinding] {
        self.scope().map(|s| s.bindings.as_slice()).unwrap_or_default()
    }

    /// Unqualified columns: only tables bound in the caret's own scope.
    pub fn visible_columns(&self) -> Vec<ColumnInfo> {
        self.bindings()
            .iter()
            .flat_map(|b| self.tree.binding_columns(b))
            .collect()
    }

    /// Columns behind the word's qualifier. Ambiguous qualifiers yield
    /// [`Lookup::Ambiguous`] so no candidate is guessed.
    pub fn qualified_columns(&self) -> Lookup<Vec<ColumnInfo>> {
        let (Some(id), Some(qualifier)) = (self.current, self.word.qualifier.as_deref()) else {
            return Lookup::NotFound;
        };
        self.tree
            .resolve_qualifier(id, qualifier)
            .map(|binding| self.tree.binding_columns(binding))
    }

    /// `alias -> table` for explicitly aliased tables of the caret's scope.
    pub fn table_aliases(&self) -> Vec<(&str, &str)> {
        self.bindings()
            .iter()
            .filter(|b| b.explicit_alias && !b.alias.is_empty())
            .map(|b| (b.alias.as_str(), b.name.as_str()))
            .collect()
    }

    pub fn column_aliases(&self) -> &[ColumnAlias] {
        self.scope()
            .map(|s| s.column_aliases.as_slice())
            .unwrap_or_default()
    }

    pub fn visible_ctes(&self) -> Vec<&str> {
        self.current
            .map(|id| self.tree.visible_ctes(id).into_iter().map(|c| c.0).collect())
            .unwrap_or_default()
    }

    /// The binding the caret refers to: the word's qualifier when it
    /// resolves, otherwise the last table bound before the caret.
    pub fn current_binding(&self) -> Option<&TableBinding> {
        if let (Some(id), Some(qualifier)) = (self.current, self.word.qualifier.as_deref()) {
            return self.tree.resolve_qualifier(id, qualifier).found();
        }
        let bindings = self.bindings();
        bindings
            .iter()
            .rev()
            .find(|b| b.span.end <= self.offset)
            .or(bindings.first())
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_binding()
            .map(|b| b.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Database of the current table, falling back to the catalog default.
    pub fn current_database(&self) -> Option<String> {
        let qualified = self
            .current_binding()
            .and_then(|b| b.qualifier.as_deref())
            .and_then(|q| q.rsplit('.').next())
            .map(str::to_string);
        qualified.or_else(|| self.catalog.default_database().map(|db| db.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_catalog;
    use rstest::rstest;

    fn context(marked: &str) -> ScopeContext {
        let offset = marked.find('|').unwrap();
        let sql = marked.replacen('|', "", 1);
        let extractor = TokenExtractor::default();
        let extraction = extractor.extract_entities(&sql).unwrap();
        let syntax = extractor.suggest_at_position(&extraction, offset);
        ScopeContext::new(&extraction, syntax, offset, Arc::new(sample_catalog()))
    }

    #[rstest]
    #[case("", TokenCase::Upper)]
    #[case("SEL", TokenCase::Upper)]
    #[case("sel", TokenCase::Lower)]
    #[case("Sel", TokenCase::Mixed)]
    #[case("_1", TokenCase::Upper)]
    fn token_case(#[case] token: &str, #[case] expected: TokenCase) {
        assert_eq!(TokenCase::of(token), expected);
        assert_eq!(TokenCase::Lower.apply("GROUP BY"), "group by");
    }

    #[rstest]
    #[case("na", None, "na")]
    #[case("u.na", Some("u"), "na")]
    #[case("shop.users.", Some("shop.users"), "")]
    #[case(r#""shop"."users".na"#, Some("shop.users"), "na")]
    #[case("`u`.", Some("u"), "")]
    fn current_word_split(
        #[case] word: &str,
        #[case] qualifier: Option<&str>,
        #[case] prefix: &str,
    ) {
        let parsed = CurrentWord::parse(word);
        assert_eq!(parsed.qualifier.as_deref(), qualifier);
        assert_eq!(parsed.prefix, prefix);
    }

    #[test]
    fn visible_columns_come_from_own_scope_only() {
        let ctx = context("SELECT | FROM users");
        let names = ctx.visible_columns().into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["id", "name", "email", "created_at"]);
        assert_eq!(ctx.current_table(), Some("users"));
        assert_eq!(ctx.current_database().as_deref(), Some("shop"));
    }

    #[test]
    fn qualified_columns_follow_the_alias() {
        let ctx = context("SELECT o.| FROM users u JOIN orders o ON u.id = o.user_id");
        let columns = ctx.qualified_columns().found().unwrap();
        assert!(columns.iter().any(|c| c.name == "amount"));
        assert_eq!(ctx.current_table(), Some("orders"));
        assert_eq!(ctx.table_aliases(), vec![("u", "users"), ("o", "orders")]);
    }

    #[test]
    fn ambiguous_qualifier_fails_closed() {
        let ctx = context("SELECT x.| FROM users x, orders x");
        assert_eq!(ctx.qualified_columns(), Lookup::Ambiguous);
        assert_eq!(ctx.current_binding(), None);
    }

    #[test]
    fn nested_context_reports_depth_and_function() {
        let ctx = context("SELECT * FROM (SELECT max(|) FROM orders) AS sub");
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.function.as_deref(), Some("max"));
        assert_eq!(ctx.current_table(), Some("orders"));
    }

    #[test]
    fn statement_tables_are_limited_to_the_caret_statement() {
        let ctx = context("SELECT * FROM products; SELECT * FROM users u JOIN orders o ON |");
        assert_eq!(ctx.statement_tables, vec!["users", "orders"]);
        assert_eq!(ctx.clause, Some(Clause::On));
    }

    #[test]
    fn column_under_caret() {
        let ctx = context("SELECT na|me FROM users");
        assert_eq!(ctx.column.as_deref(), Some("name"));
    }

    #[test]
    fn empty_context_has_no_scope() {
        let ctx = ScopeContext::empty("SELECT 'x", 9, Arc::new(sample_catalog()));
        assert!(ctx.scope().is_none());
        assert!(ctx.visible_columns().is_empty());
        assert_eq!(ctx.depth(), 0);
        assert!(!ctx.syntax.keywords.is_empty());
    }
}
