use super::*;
use itertools::Itertools;

/// Split the token stream into query blocks and collect entity references.
///
/// Strategy:
/// 1. Keep a stack of frames, one per open block. Each frame tracks its own
///    plain-parenthesis depth so clause keywords only count at depth 0.
/// 2. `(` followed by `SELECT`/`WITH` opens a block: a derived table where a
///    table is expected, a CTE body after `name AS`, a subquery otherwise.
/// 3. Set operators start a new operand block inside the same frame.
/// 4. `;` closes every open frame; unclosed blocks run to the end of text.
pub fn walk(sql: &str, tokens: &[Token]) -> (Vec<QueryBlock>, Vec<EntityRecord>, Vec<Span>) {
    let mut walker = Walker {
        sql,
        tokens,
        blocks: Vec::new(),
        entities: Vec::new(),
        statements: Vec::new(),
        root: Frame::new(0),
        nested: Vec::new(),
        statement: 0,
        statement_start: 0,
    };
    walker.open_statement(0);
    let mut i = 0;
    while i < tokens.len() {
        i = walker.step(i);
    }
    walker.close_statement(sql.len(), tokens.len());
    (walker.blocks, walker.entities, walker.statements)
}

/// Unquoted words that read like names but never reference catalog objects.
const NON_NAMES: &[&str] = &[
    "over", "partition", "filter", "within", "interval", "rows", "range", "preceding",
    "following", "unbounded", "current", "row",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Nothing,
    Table,
    AfterTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CteState {
    Idle,
    Name,
    Named { name: String, columns: Vec<String> },
    Body { name: String, columns: Vec<String> },
    AfterBody,
}

#[derive(Debug, Clone)]
struct Frame {
    /// Block that opened the frame.
    origin: BlockId,
    /// Block receiving clauses; differs from `origin` after a set operator.
    block: BlockId,
    depth: usize,
    clause: Option<Clause>,
    expect: Expect,
    item_start: Option<usize>,
    cte: CteState,
}

impl Frame {
    fn new(block: BlockId) -> Self {
        Self {
            origin: block,
            block,
            depth: 0,
            clause: None,
            expect: Expect::Nothing,
            item_start: None,
            cte: CteState::Idle,
        }
    }
}

/// Dotted name starting at some token: `a`, `a.b`, `a.b.*`, `a.` (typing).
struct NameRef {
    parts: Vec<(String, Span)>,
    wildcard: bool,
    trailing_dot: bool,
    /// Index of the first token after the name.
    end: usize,
}

impl NameRef {
    fn span(&self) -> Span {
        let start = self.parts.first().map(|p| p.1.start).unwrap_or_default();
        let end = self.parts.last().map(|p| p.1.end).unwrap_or(start);
        Span::new(start, end)
    }

    fn name(&self) -> String {
        self.parts.last().map(|p| p.0.clone()).unwrap_or_default()
    }

    fn qualifier(&self) -> Option<String> {
        let n = self.parts.len();
        (n > 1).then(|| self.parts[..n - 1].iter().map(|p| p.0.as_str()).join("."))
    }

    fn is_complete(&self) -> bool {
        !self.wildcard && !self.trailing_dot
    }
}

struct Walker<'a> {
    sql: &'a str,
    tokens: &'a [Token],
    blocks: Vec<QueryBlock>,
    entities: Vec<EntityRecord>,
    statements: Vec<Span>,
    root: Frame,
    nested: Vec<Frame>,
    statement: usize,
    statement_start: usize,
}

impl Walker<'_> {
    fn top(&mut self) -> &mut Frame {
        match self.nested.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn step(&mut self, i: usize) -> usize {
        let tokens = self.tokens;
        let token = &tokens[i];
        match &token.kind {
            TokenKind::Semicolon => {
                self.close_statement(token.start, i);
                self.statement += 1;
                self.open_statement(token.end);
                i + 1
            }
            TokenKind::ParenOpen => self.paren_open(i),
            TokenKind::ParenClose => self.paren_close(i),
            TokenKind::Comma => self.comma(i),
            TokenKind::Keyword(kw) => self.keyword(i, *kw),
            TokenKind::Ident(_) | TokenKind::QuotedIdent(_) => self.ident(i),
            _ => i + 1,
        }
    }

    fn new_block(&mut self, kind: BlockKind, parent: Option<BlockId>, start: usize) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(QueryBlock {
            id,
            parent,
            kind,
            span: Span::new(start, start),
            clauses: Vec::new(),
            projection: Vec::new(),
            statement: self.statement,
        });
        id
    }

    fn open_statement(&mut self, start: usize) {
        self.statement_start = start;
        let id = self.new_block(BlockKind::Statement, None, start);
        self.root = Frame::new(id);
    }

    fn close_statement(&mut self, end: usize, end_idx: usize) {
        while let Some(frame) = self.nested.pop() {
            self.finish_frame(&frame, end, end_idx);
        }
        let root = self.root.clone();
        self.finish_frame(&root, end, end_idx);
        self.statements.push(Span::new(self.statement_start, end));
    }

    fn finish_frame(&mut self, frame: &Frame, end: usize, end_idx: usize) {
        self.finish_item(frame, end_idx);
        self.blocks[frame.block].span.end = end;
        self.blocks[frame.origin].span.end = end;
    }

    fn paren_open(&mut self, i: usize) -> usize {
        let start = self.tokens[i].end;
        let opens_query = self
            .tokens
            .get(i + 1)
            .is_some_and(|t| t.is_keyword(Keyword::Select) || t.is_keyword(Keyword::With));
        let frame = self.top().clone();

        if opens_query {
            let kind = match (&frame.cte, frame.expect) {
                (CteState::Body { name, columns }, _) if frame.depth == 0 => BlockKind::Cte {
                    name: name.clone(),
                    columns: columns.clone(),
                },
                (_, Expect::Table) if frame.depth == 0 => BlockKind::Derived { alias: None },
                _ => BlockKind::Subquery,
            };
            let id = self.new_block(kind, Some(frame.block), start);
            self.nested.push(Frame::new(id));
            return i + 1;
        }

        if frame.depth == 0
            && let CteState::Named { name, .. } = frame.cte
        {
            let mut j = i + 1;
            let mut columns = Vec::new();
            while let Some(t) = self.tokens.get(j) {
                j += 1;
                match &t.kind {
                    TokenKind::ParenClose => break,
                    kind => columns.extend(kind.ident().map(str::to_string)),
                }
            }
            self.top().cte = CteState::Named { name, columns };
            return j;
        }

        self.top().depth += 1;
        i + 1
    }

    fn paren_close(&mut self, i: usize) -> usize {
        let frame = self.top();
        if frame.depth > 0 {
            frame.depth -= 1;
            return i + 1;
        }
        let Some(frame) = self.nested.pop() else {
            return i + 1;
        };
        let token = &self.tokens[i];
        self.finish_frame(&frame, token.start, i);

        match self.blocks[frame.origin].kind {
            BlockKind::Derived { .. } => self.derived_alias(frame.origin, i + 1),
            BlockKind::Cte { .. } => {
                self.top().cte = CteState::AfterBody;
                i + 1
            }
            _ => i + 1,
        }
    }

    /// `(...) [AS] alias` after a derived table.
    fn derived_alias(&mut self, block: BlockId, mut j: usize) -> usize {
        if self.tokens.get(j).is_some_and(|t| t.is_keyword(Keyword::As)) {
            j += 1;
        }
        let frame = self.top().clone();
        if let Some((name, span)) = self
            .tokens
            .get(j)
            .and_then(|t| t.ident().map(|n| (n.to_string(), t.span())))
        {
            if let BlockKind::Derived { alias } = &mut self.blocks[block].kind {
                *alias = Some(name.clone());
            }
            self.entities.push(EntityRecord {
                kind: EntityKind::DerivedTable,
                text: name.clone(),
                name: name.clone(),
                qualifier: None,
                span,
                alias: Some(AliasRecord { name, span }),
                block: frame.block,
                clause: frame.clause,
            });
            j += 1;
        }
        self.top().expect = Expect::AfterTable;
        j
    }

    fn comma(&mut self, i: usize) -> usize {
        let frame = self.top().clone();
        if frame.depth > 0 {
            return i + 1;
        }
        match frame.clause {
            Some(Clause::Select) => {
                self.finish_item(&frame, i);
                self.top().item_start = Some(i + 1);
            }
            Some(Clause::From) => self.top().expect = Expect::Table,
            _ => {}
        }
        if frame.cte == CteState::AfterBody {
            self.top().cte = CteState::Name;
        }
        i + 1
    }

    fn begin_clause(&mut self, i: usize, clause: Clause, keyword: Span) {
        let frame = self.top().clone();
        self.finish_item(&frame, i);
        self.blocks[frame.block]
            .clauses
            .push(ClauseSpan { clause, keyword });
        let top = self.top();
        top.clause = Some(clause);
        top.item_start = None;
        top.cte = CteState::Idle;
        top.expect = if clause.takes_tables() {
            Expect::Table
        } else {
            Expect::Nothing
        };
    }

    fn keyword(&mut self, i: usize, kw: Keyword) -> usize {
        let frame = self.top().clone();
        if frame.depth > 0 {
            return i + 1;
        }
        let span = self.tokens[i].span();
        match kw {
            Keyword::Select => {
                self.begin_clause(i, Clause::Select, span);
                self.top().item_start = Some(i + 1);
            }
            Keyword::From => self.begin_clause(i, Clause::From, span),
            Keyword::Join => self.begin_clause(i, Clause::Join, span),
            Keyword::On | Keyword::Using => self.begin_clause(i, Clause::On, span),
            Keyword::Where => self.begin_clause(i, Clause::Where, span),
            Keyword::Having => self.begin_clause(i, Clause::Having, span),
            Keyword::Limit | Keyword::Offset => self.begin_clause(i, Clause::Limit, span),
            Keyword::Into => self.begin_clause(i, Clause::Into, span),
            Keyword::Update => self.begin_clause(i, Clause::Update, span),
            Keyword::Values => self.begin_clause(i, Clause::Values, span),
            Keyword::Set if frame.clause == Some(Clause::Update) => {
                self.begin_clause(i, Clause::Set, span)
            }
            Keyword::Group | Keyword::Order => {
                let tokens = self.tokens;
                if let Some(by) = tokens.get(i + 1).filter(|t| t.is_keyword(Keyword::By)) {
                    let clause = if kw == Keyword::Group {
                        Clause::GroupBy
                    } else {
                        Clause::OrderBy
                    };
                    self.begin_clause(i, clause, Span::new(span.start, by.end));
                    return i + 2;
                }
            }
            kw if Keyword::SET_OPERATORS.contains(&kw) => return self.set_operation(i),
            Keyword::With => self.top().cte = CteState::Name,
            Keyword::As => {
                if let CteState::Named { name, columns } = frame.cte {
                    self.top().cte = CteState::Body { name, columns };
                }
            }
            _ => {}
        }
        i + 1
    }

    /// `UNION [ALL|DISTINCT]` and friends: close the running operand and
    /// start an isolated one.
    fn set_operation(&mut self, i: usize) -> usize {
        let frame = self.top().clone();
        self.finish_item(&frame, i);
        if frame.block != frame.origin {
            self.blocks[frame.block].span.end = self.tokens[i].start;
        }
        let mut j = i + 1;
        if self
            .tokens
            .get(j)
            .is_some_and(|t| t.is_keyword(Keyword::All) || t.is_keyword(Keyword::Distinct))
        {
            j += 1;
        }
        let start = self.tokens[j - 1].end;
        let parent = self.blocks[frame.origin].parent.unwrap_or(frame.origin);
        let id = self.new_block(BlockKind::SetOperand, Some(parent), start);
        let top = self.top();
        top.block = id;
        top.clause = None;
        top.expect = Expect::Nothing;
        top.item_start = None;
        j
    }

    fn name_at(&self, i: usize) -> NameRef {
        let part = |t: &Token| -> Option<(String, Span)> {
            match &t.kind {
                TokenKind::Ident(s) | TokenKind::QuotedIdent(s) => Some((s.clone(), t.span())),
                TokenKind::Keyword(_) => Some((t.text(self.sql).to_string(), t.span())),
                _ => None,
            }
        };
        let mut parts: Vec<(String, Span)> =
            self.tokens.get(i).and_then(part).into_iter().collect();
        let mut wildcard = false;
        let mut trailing_dot = false;
        let mut j = i + 1;
        while self.tokens.get(j).is_some_and(|t| t.kind == TokenKind::Dot) {
            match self.tokens.get(j + 1) {
                Some(t) if t.kind == TokenKind::Star => {
                    wildcard = true;
                    j += 2;
                    break;
                }
                Some(t) if part(t).is_some() && self.tokens[j].touches(t) => {
                    parts.extend(part(t));
                    j += 2;
                }
                _ => {
                    trailing_dot = true;
                    j += 1;
                    break;
                }
            }
        }
        NameRef {
            parts,
            wildcard,
            trailing_dot,
            end: j,
        }
    }

    fn emit(&mut self, kind: EntityKind, name: &NameRef, alias: Option<AliasRecord>) {
        let frame = self.top().clone();
        let span = name.span();
        self.entities.push(EntityRecord {
            kind,
            text: span.slice(self.sql).to_string(),
            name: name.name(),
            qualifier: name.qualifier(),
            span,
            alias,
            block: frame.block,
            clause: frame.clause,
        });
    }

    fn ident(&mut self, i: usize) -> usize {
        let frame = self.top().clone();
        if let TokenKind::Ident(word) = &self.tokens[i].kind
            && NON_NAMES.iter().any(|w| word.eq_ignore_ascii_case(w))
        {
            return i + 1;
        }

        if frame.depth == 0 {
            match &frame.cte {
                CteState::Name => {
                    let name = self.name_at(i);
                    self.emit(EntityKind::CommonTable, &name, None);
                    self.top().cte = CteState::Named {
                        name: name.name(),
                        columns: Vec::new(),
                    };
                    return i + 1;
                }
                CteState::Body { .. } => return i + 1,
                _ => {}
            }
        }

        let name = self.name_at(i);
        let is_call = self
            .tokens
            .get(name.end)
            .is_some_and(|t| t.kind == TokenKind::ParenOpen);

        if frame.expect == Expect::Table && frame.depth == 0 {
            // `INTO t (cols)` lists columns; only FROM and JOIN take table functions.
            let table_function = matches!(frame.clause, Some(Clause::From | Clause::Join));
            if is_call && table_function {
                self.emit(EntityKind::Function, &name, None);
                self.top().expect = Expect::AfterTable;
                return name.end;
            }
            return self.table_reference(name);
        }

        if !name.is_complete() {
            return name.end;
        }
        if is_call {
            self.emit(EntityKind::Function, &name, None);
            return name.end;
        }

        let in_expression = match frame.clause {
            Some(
                Clause::Select
                | Clause::Where
                | Clause::On
                | Clause::GroupBy
                | Clause::Having
                | Clause::OrderBy
                | Clause::Set,
            ) => true,
            Some(Clause::Into) => frame.depth > 0,
            _ => false,
        };
        let after_as = i > 0 && self.tokens[i - 1].is_keyword(Keyword::As);
        if in_expression && !after_as {
            self.emit(EntityKind::Column, &name, None);
        }
        name.end
    }

    /// Table name in FROM / JOIN / INTO / UPDATE position plus its alias.
    fn table_reference(&mut self, name: NameRef) -> usize {
        if name.trailing_dot || name.wildcard {
            return name.end;
        }
        if name.parts.len() > 1 {
            let (db, span) = name.parts[name.parts.len() - 2].clone();
            let db = NameRef {
                parts: vec![(db, span)],
                wildcard: false,
                trailing_dot: false,
                end: name.end,
            };
            self.emit(EntityKind::Database, &db, None);
        }

        let mut j = name.end;
        if self.tokens.get(j).is_some_and(|t| t.is_keyword(Keyword::As)) {
            j += 1;
        }
        let alias = match self.tokens.get(j) {
            Some(t) => t.ident().map(|n| AliasRecord {
                name: n.to_string(),
                span: t.span(),
            }),
            None => None,
        };
        if alias.is_some() {
            j += 1;
        }
        self.emit(EntityKind::Table, &name, alias);
        self.top().expect = Expect::AfterTable;
        j
    }

    /// Record the select item spanning tokens `[item_start, end_idx)`.
    fn finish_item(&mut self, frame: &Frame, end_idx: usize) {
        if frame.clause != Some(Clause::Select) {
            return;
        }
        let Some(start) = frame.item_start else {
            return;
        };
        let mut tokens = &self.tokens[start.min(end_idx)..end_idx];
        let mut skipped = 0;
        while let Some(first) = tokens.first()
            && (first.is_keyword(Keyword::Distinct) || first.is_keyword(Keyword::All))
        {
            tokens = &tokens[1..];
            skipped += 1;
        }
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return;
        };
        let span = Span::new(first.start, last.end);
        let n = tokens.len();

        let alias_at = |k: usize| tokens[k].ident().map(|a| (a.to_string(), tokens[k].span()));
        let (expr_len, alias) = if n >= 3 && tokens[n - 2].is_keyword(Keyword::As) {
            (n - 2, alias_at(n - 1))
        } else if n >= 2 && tokens[n - 1].kind.is_ident() && tokens[n - 2].kind.ends_operand() {
            (n - 1, alias_at(n - 1))
        } else {
            (n, None)
        };

        if let Some((_, alias_span)) = &alias {
            self.entities
                .retain(|e| !(e.kind == EntityKind::Column && e.span == *alias_span));
        }

        let expr_start = start + skipped;
        let expr = self.projection_expr(expr_start, expr_start + expr_len);
        self.blocks[frame.block].projection.push(SelectItem {
            expr,
            alias: alias.map(|a| a.0),
            span,
        });
    }

    /// Classify the non-empty token range `[start, end)` of a select item.
    fn projection_expr(&self, start: usize, end: usize) -> ProjectionExpr {
        let text = || ProjectionExpr::Expression {
            text: Span::new(self.tokens[start].start, self.tokens[end - 1].end)
                .slice(self.sql)
                .to_string(),
        };
        if end - start == 1 && self.tokens[start].kind == TokenKind::Star {
            return ProjectionExpr::Wildcard { qualifier: None };
        }
        if !self.tokens[start].kind.is_ident() {
            return text();
        }
        let name = self.name_at(start);
        if name.end != end || name.trailing_dot {
            return text();
        }
        if name.wildcard {
            return ProjectionExpr::Wildcard {
                qualifier: name.parts.last().map(|p| p.0.clone()),
            };
        }
        ProjectionExpr::Column {
            qualifier: name.parts.iter().rev().nth(1).map(|p| p.0.clone()),
            name: name.name(),
        }
    }
}
