use super::*;
use itertools::Itertools;
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum RuleKind {
    Keyword,
    Table,
    Column,
    Function,
    Schema,
    Join,
    Where,
    GroupBy,
    OrderBy,
    SmartColumn,
    SmartTable,
    SmartJoin,
}

impl RuleKind {
    pub const fn default_priority(self) -> u32 {
        match self {
            RuleKind::Keyword => 100,
            RuleKind::Table => 90,
            RuleKind::Column => 80,
            RuleKind::Function => 70,
            _ => 0,
        }
    }

    /// Kinds that always run first, in this order.
    const fn is_core(self) -> bool {
        matches!(
            self,
            RuleKind::Keyword | RuleKind::Table | RuleKind::Column | RuleKind::Function
        )
    }
}

pub type Condition = fn(&ScopeContext) -> bool;
pub type Produce = fn(&ScopeContext) -> Vec<CompletionCandidate>;

/// A stateless completion rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub kind: RuleKind,
    /// Overrides the kind's default priority.
    pub priority: Option<u32>,
    pub enabled: bool,
    pub condition: Condition,
    pub produce: Produce,
}

impl Rule {
    pub const fn new(
        id: &'static str,
        kind: RuleKind,
        condition: Condition,
        produce: Produce,
    ) -> Self {
        Self {
            id,
            kind,
            priority: None,
            enabled: true,
            condition,
            produce,
        }
    }

    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn priority(&self) -> u32 {
        self.priority.unwrap_or(self.kind.default_priority())
    }
}

/// Fixed rule table, built once and evaluated in a deterministic order.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns false when no rule has that id.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enabled rules grouped by kind: the core kinds first in their fixed
    /// order, then the others by their highest priority, ties broken by
    /// kind. Registration order is kept inside a kind.
    pub fn execution_order(&self) -> Vec<&Rule> {
        let enabled = self.rules.iter().filter(|r| r.enabled).collect::<Vec<_>>();
        let kind_priority = |kind: RuleKind| {
            enabled
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| r.priority())
                .max()
                .unwrap_or(0)
        };
        enabled
            .iter()
            .map(|r| r.kind)
            .unique()
            .sorted_by_key(|&kind| {
                if kind.is_core() {
                    (0, Reverse(0), kind as usize)
                } else {
                    (1, Reverse(kind_priority(kind)), kind as usize)
                }
            })
            .flat_map(|kind| enabled.iter().copied().filter(move |r| r.kind == kind))
            .collect()
    }

    /// Concatenated output of every rule whose condition holds.
    pub fn run(&self, ctx: &ScopeContext) -> Vec<CompletionCandidate> {
        let mut out = Vec::new();
        for rule in self.execution_order() {
            if !(rule.condition)(ctx) {
                continue;
            }
            let produced = (rule.produce)(ctx);
            trace!("Rule {} produced {} candidates", rule.id, produced.len());
            out.extend(produced);
        }
        out
    }
}
