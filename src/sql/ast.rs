//! Query-block tree recovered from the token stream.
//!
//! Every `SELECT` body is a [`QueryBlock`]: top-level statements, subqueries
//! in expressions, derived tables, CTE bodies and set-operation operands.
//! Each block carries the spans of its clauses so that the clause at any
//! offset is a lookup, never a text search.
use serde::Serialize;

/// Byte range `[start, end)` in the original SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Caret containment; both ends inclusive since a caret may sit right
    /// after the last character.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn slice<'s>(&self, sql: &'s str) -> &'s str {
        sql.get(self.start..self.end).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(into = "String")]
pub enum Clause {
    #[display("SELECT")]
    Select,
    #[display("FROM")]
    From,
    #[display("JOIN")]
    Join,
    #[display("ON")]
    On,
    #[display("WHERE")]
    Where,
    #[display("GROUP BY")]
    GroupBy,
    #[display("HAVING")]
    Having,
    #[display("ORDER BY")]
    OrderBy,
    #[display("LIMIT")]
    Limit,
    #[display("INTO")]
    Into,
    #[display("VALUES")]
    Values,
    #[display("UPDATE")]
    Update,
    #[display("SET")]
    Set,
}

impl From<Clause> for String {
    fn from(value: Clause) -> Self {
        value.to_string()
    }
}

impl Clause {
    /// Clauses whose next operand is a table reference.
    pub fn takes_tables(self) -> bool {
        matches!(
            self,
            Clause::From | Clause::Join | Clause::Into | Clause::Update
        )
    }

    /// Clauses where aggregate functions are legal.
    pub fn allows_aggregates(self) -> bool {
        matches!(self, Clause::Select | Clause::Having | Clause::OrderBy)
    }
}

/// A clause keyword inside one block. The clause body runs from
/// `keyword.end` to the next clause of the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClauseSpan {
    pub clause: Clause,
    pub keyword: Span,
}

pub type BlockId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Statement,
    /// Subquery inside an expression; may be correlated with its parent.
    Subquery,
    Derived {
        alias: Option<String>,
    },
    Cte {
        name: String,
        columns: Vec<String>,
    },
    SetOperand,
}

impl BlockKind {
    /// Whether unresolved qualifiers may be looked up in the parent block.
    pub fn sees_parent_aliases(&self) -> bool {
        matches!(self, BlockKind::Subquery)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectionExpr {
    Column {
        qualifier: Option<String>,
        name: String,
    },
    Wildcard {
        qualifier: Option<String>,
    },
    Expression {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectItem {
    pub expr: ProjectionExpr,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBlock {
    pub id: BlockId,
    pub parent: Option<BlockId>,
    pub kind: BlockKind,
    pub span: Span,
    pub clauses: Vec<ClauseSpan>,
    pub projection: Vec<SelectItem>,
    /// Index of the `;`-separated statement this block belongs to.
    pub statement: usize,
}

impl QueryBlock {
    /// The clause governing `offset`: the last clause whose keyword ends at
    /// or before it.
    pub fn clause_at(&self, offset: usize) -> Option<Clause> {
        self.clauses
            .iter()
            .rev()
            .find(|c| c.keyword.end <= offset)
            .map(|c| c.clause)
    }
}
