use super::*;

pub type ScopeId = BlockId;

/// Nesting guard for column expansion through derived tables and CTEs.
const MAX_EXPANSION_DEPTH: usize = 8;

/// What a table reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Catalog(Arc<Table>),
    Cte(ScopeId),
    Derived(ScopeId),
    /// Not in the catalog, or ambiguous across databases.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBinding {
    /// Name the binding is referenced by: the alias, or the bare table name.
    pub alias: String,
    /// Table name as written, without qualifier.
    pub name: String,
    pub qualifier: Option<String>,
    pub explicit_alias: bool,
    pub source: TableSource,
    pub span: Span,
}

impl TableBinding {
    fn answers_to(&self, name: &str) -> bool {
        if self.alias.eq_ignore_ascii_case(name) {
            return true;
        }
        // `shop.users.id` qualifies by the full written name.
        !self.explicit_alias
            && self.qualifier.as_deref().is_some_and(|q| {
                name.len() == q.len() + 1 + self.name.len()
                    && name.eq_ignore_ascii_case(&format!("{q}.{}", self.name))
            })
    }
}

/// `SELECT expr AS alias`, taken from the SELECT list only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAlias {
    pub alias: String,
    pub expr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: Option<DataType>,
    /// Binding the column is reached through.
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: BlockKind,
    pub parent: Option<ScopeId>,
    pub statement: usize,
    pub span: Span,
    /// Ordered by position in the text.
    pub bindings: Vec<TableBinding>,
    pub column_aliases: Vec<ColumnAlias>,
    pub projection: Vec<SelectItem>,
    /// CTEs defined directly in this scope's `WITH`.
    pub ctes: Vec<(String, ScopeId)>,
}

/// Arena of scopes; ids equal the query block ids they were built from.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self { scopes }
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub(super) fn into_scopes(self) -> Vec<Scope> {
        self.scopes
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// `id` followed by its parents, innermost first.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.get(id), |s| s.parent.and_then(|p| self.get(p)))
    }

    /// Nesting level; the statement scope is 0.
    pub fn depth(&self, id: ScopeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    /// Binding called `name` in exactly scope `id`.
    pub fn lookup_alias(&self, id: ScopeId, name: &str) -> Lookup<&TableBinding> {
        let Some(scope) = self.get(id) else {
            return Lookup::NotFound;
        };
        Lookup::from_matches(scope.bindings.iter().filter(|b| b.answers_to(name)))
    }

    /// Resolve a qualifier innermost-first. Only correlated subqueries look
    /// outward; an ambiguous match stops the search.
    pub fn resolve_qualifier(&self, id: ScopeId, qualifier: &str) -> Lookup<&TableBinding> {
        let mut current = self.get(id);
        while let Some(scope) = current {
            match self.lookup_alias(scope.id, qualifier) {
                Lookup::NotFound if scope.kind.sees_parent_aliases() => {
                    current = scope.parent.and_then(|p| self.get(p));
                }
                found => return found,
            }
        }
        Lookup::NotFound
    }

    /// CTE names visible from `id`, innermost definitions first.
    pub fn visible_ctes(&self, id: ScopeId) -> Vec<(&str, ScopeId)> {
        let mut seen: Vec<(&str, ScopeId)> = Vec::new();
        for scope in self.ancestors(id) {
            for (name, cte) in &scope.ctes {
                if !seen.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                    seen.push((name.as_str(), *cte));
                }
            }
        }
        seen
    }

    pub fn find_cte(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        self.visible_ctes(id)
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, cte)| cte)
    }

    /// Columns reachable through `binding`, labelled with its alias.
    pub fn binding_columns(&self, binding: &TableBinding) -> Vec<ColumnInfo> {
        self.binding_columns_at(binding, 0)
    }

    fn binding_columns_at(&self, binding: &TableBinding, depth: usize) -> Vec<ColumnInfo> {
        let mut columns = match &binding.source {
            TableSource::Catalog(table) => table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    data_type: Some(c.data_type.clone()),
                    table: String::new(),
                })
                .collect(),
            TableSource::Cte(id) => match self.get(*id).map(|s| &s.kind) {
                Some(BlockKind::Cte { columns, .. }) if !columns.is_empty() => columns
                    .iter()
                    .map(|name| ColumnInfo {
                        name: name.clone(),
                        data_type: None,
                        table: String::new(),
                    })
                    .collect(),
                _ => self.output_columns_at(*id, depth + 1),
            },
            TableSource::Derived(id) => self.output_columns_at(*id, depth + 1),
            TableSource::Unknown => Vec::new(),
        };
        for column in &mut columns {
            column.table = binding.alias.clone();
        }
        columns
    }

    fn output_columns_at(&self, id: ScopeId, depth: usize) -> Vec<ColumnInfo> {
        if depth > MAX_EXPANSION_DEPTH {
            warn!("Column expansion stopped at depth {depth}");
            return Vec::new();
        }
        let Some(scope) = self.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for item in &scope.projection {
            match &item.expr {
                ProjectionExpr::Wildcard { qualifier: None } => {
                    for binding in &scope.bindings {
                        out.extend(self.binding_columns_at(binding, depth));
                    }
                }
                ProjectionExpr::Wildcard {
                    qualifier: Some(q),
                } => {
                    if let Lookup::Found(binding) = self.lookup_alias(id, q) {
                        out.extend(self.binding_columns_at(binding, depth));
                    }
                }
                ProjectionExpr::Column { qualifier, name } => out.push(ColumnInfo {
                    name: item.alias.clone().unwrap_or_else(|| name.clone()),
                    data_type: self.column_type(id, qualifier.as_deref(), name, depth),
                    table: String::new(),
                }),
                ProjectionExpr::Expression { .. } => {
                    if let Some(alias) = &item.alias {
                        out.push(ColumnInfo {
                            name: alias.clone(),
                            data_type: None,
                            table: String::new(),
                        });
                    }
                }
            }
        }
        out
    }

    /// Type of a column reference inside scope `id`, when it is unambiguous.
    fn column_type(
        &self,
        id: ScopeId,
        qualifier: Option<&str>,
        name: &str,
        depth: usize,
    ) -> Option<DataType> {
        let scope = self.get(id)?;
        let candidates: Vec<&TableBinding> = match qualifier {
            Some(q) => self.lookup_alias(id, q).found().into_iter().collect(),
            None => scope.bindings.iter().collect(),
        };
        let types = candidates
            .into_iter()
            .flat_map(|b| self.binding_columns_at(b, depth + 1))
            .filter(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.data_type);
        Lookup::from_matches(types).found().flatten()
    }
}
