use super::*;

/// Build the scope tree for every block of `extraction` against one catalog
/// snapshot.
///
/// 1. One scope per block, parented like the blocks.
/// 2. CTE bodies register their name in the scope that declares them.
/// 3. Table entities become bindings of their own block, resolved against
///    visible CTEs first and the catalog second.
/// 4. Derived tables become bindings of the enclosing block.
/// 5. Column aliases come from the SELECT-list projection only.
pub fn resolve(extraction: &Extraction, catalog: &Catalog) -> ScopeTree {
    let mut scopes = extraction
        .blocks
        .iter()
        .map(|block| Scope {
            id: block.id,
            kind: block.kind.clone(),
            parent: block.parent,
            statement: block.statement,
            span: block.span,
            bindings: Vec::new(),
            column_aliases: column_aliases(block),
            projection: block.projection.clone(),
            ctes: Vec::new(),
        })
        .collect::<Vec<_>>();

    for block in &extraction.blocks {
        if let (BlockKind::Cte { name, .. }, Some(parent)) = (&block.kind, block.parent) {
            scopes[parent].ctes.push((name.clone(), block.id));
        }
    }

    let tree = ScopeTree::new(scopes);
    let mut bindings: Vec<(ScopeId, TableBinding)> = Vec::new();

    for entity in &extraction.entities {
        if entity.kind != EntityKind::Table {
            continue;
        }
        let cte = match entity.qualifier {
            None => tree.find_cte(entity.block, &entity.name),
            Some(_) => None,
        };
        let source = match cte {
            Some(id) => TableSource::Cte(id),
            None => {
                let database = entity
                    .qualifier
                    .as_deref()
                    .and_then(|q| q.rsplit('.').next());
                match catalog.find_table(&entity.name, database) {
                    Lookup::Found(table) => TableSource::Catalog(table),
                    Lookup::Ambiguous => {
                        debug!("Table {} is ambiguous across databases", entity.text);
                        TableSource::Unknown
                    }
                    Lookup::NotFound => TableSource::Unknown,
                }
            }
        };
        bindings.push((
            entity.block,
            TableBinding {
                alias: entity
                    .alias
                    .as_ref()
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| entity.name.clone()),
                name: entity.name.clone(),
                qualifier: entity.qualifier.clone(),
                explicit_alias: entity.alias.is_some(),
                source,
                span: entity.span,
            },
        ));
    }

    for block in &extraction.blocks {
        let (BlockKind::Derived { alias }, Some(parent)) = (&block.kind, block.parent) else {
            continue;
        };
        bindings.push((
            parent,
            TableBinding {
                alias: alias.clone().unwrap_or_default(),
                name: alias.clone().unwrap_or_default(),
                qualifier: None,
                explicit_alias: alias.is_some(),
                source: TableSource::Derived(block.id),
                span: block.span,
            },
        ));
    }

    let mut scopes = tree.into_scopes();
    for (id, binding) in bindings {
        scopes[id].bindings.push(binding);
    }
    for scope in &mut scopes {
        scope.bindings.sort_by_key(|b| b.span.start);
    }
    trace!("Resolved {} scopes", scopes.len());
    ScopeTree::new(scopes)
}

fn column_aliases(block: &QueryBlock) -> Vec<ColumnAlias> {
    block
        .projection
        .iter()
        .filter_map(|item| {
            let alias = item.alias.clone()?;
            let expr = match &item.expr {
                ProjectionExpr::Column {
                    qualifier: Some(q),
                    name,
                } => format!("{q}.{name}"),
                ProjectionExpr::Column { name, .. } => name.clone(),
                ProjectionExpr::Wildcard { .. } => return None,
                ProjectionExpr::Expression { text } => text.clone(),
            };
            Some(ColumnAlias { alias, expr })
        })
        .collect()
}
