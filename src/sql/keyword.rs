//! SQL keywords the extractor reacts to.
//!
//! Only words that open a clause, shape a join, or bound a block are
//! classified. Everything else stays an identifier so that lenient scanning
//! keeps working on half-typed input.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    On,
    Using,
    As,
    Where,
    Group,
    Order,
    By,
    Having,
    Limit,
    Offset,
    Union,
    Except,
    Intersect,
    With,
    Recursive,
    Distinct,
    All,
    And,
    Or,
    Not,
    In,
    Is,
    Null,
    Like,
    Between,
    Exists,
    Case,
    When,
    Then,
    Else,
    End,
    Asc,
    Desc,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
}

impl Keyword {
    /// Keywords that may precede `JOIN`.
    pub const JOIN_MODIFIERS: [Self; 7] = [
        Keyword::Inner,
        Keyword::Left,
        Keyword::Right,
        Keyword::Full,
        Keyword::Outer,
        Keyword::Cross,
        Keyword::Natural,
    ];

    /// Keywords that split a query into set-operation operands.
    pub const SET_OPERATORS: [Self; 3] = [Keyword::Union, Keyword::Except, Keyword::Intersect];

    /// Attempt to classify a *lower-cased* word slice into a `Keyword`.
    pub fn from_lower(word: &str) -> Option<Self> {
        use Keyword::*;
        let kw = match word {
            "select" => Select,
            "from" => From,
            "join" => Join,
            "inner" => Inner,
            "left" => Left,
            "right" => Right,
            "full" => Full,
            "outer" => Outer,
            "cross" => Cross,
            "natural" => Natural,
            "on" => On,
            "using" => Using,
            "as" => As,
            "where" => Where,
            "group" => Group,
            "order" => Order,
            "by" => By,
            "having" => Having,
            "limit" => Limit,
            "offset" => Offset,
            "union" => Union,
            "except" => Except,
            "intersect" => Intersect,
            "with" => With,
            "recursive" => Recursive,
            "distinct" => Distinct,
            "all" => All,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "in" => In,
            "is" => Is,
            "null" => Null,
            "like" => Like,
            "between" => Between,
            "exists" => Exists,
            "case" => Case,
            "when" => When,
            "then" => Then,
            "else" => Else,
            "end" => End,
            "asc" => Asc,
            "desc" => Desc,
            "insert" => Insert,
            "into" => Into,
            "values" => Values,
            "update" => Update,
            "set" => Set,
            "delete" => Delete,
            _ => return None,
        };
        Some(kw)
    }

    /// Canonical lowercase string form of the keyword.
    pub const fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            Select => "select",
            From => "from",
            Join => "join",
            Inner => "inner",
            Left => "left",
            Right => "right",
            Full => "full",
            Outer => "outer",
            Cross => "cross",
            Natural => "natural",
            On => "on",
            Using => "using",
            As => "as",
            Where => "where",
            Group => "group",
            Order => "order",
            By => "by",
            Having => "having",
            Limit => "limit",
            Offset => "offset",
            Union => "union",
            Except => "except",
            Intersect => "intersect",
            With => "with",
            Recursive => "recursive",
            Distinct => "distinct",
            All => "all",
            And => "and",
            Or => "or",
            Not => "not",
            In => "in",
            Is => "is",
            Null => "null",
            Like => "like",
            Between => "between",
            Exists => "exists",
            Case => "case",
            When => "when",
            Then => "then",
            Else => "else",
            End => "end",
            Asc => "asc",
            Desc => "desc",
            Insert => "insert",
            Into => "into",
            Values => "values",
            Update => "update",
            Set => "set",
            Delete => "delete",
        }
    }

    /// True for keywords after which an expression operand is expected.
    pub fn starts_expression(self) -> bool {
        use Keyword::*;
        matches!(
            self,
            Select
                | Where
                | On
                | By
                | Having
                | And
                | Or
                | Not
                | In
                | Like
                | Between
                | Case
                | When
                | Then
                | Else
                | Distinct
                | All
                | Set
        )
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_keywords() {
        for w in [
            "select", "from", "join", "left", "on", "using", "as", "where", "group", "by",
            "having", "order", "limit", "union", "with", "insert", "update", "delete",
        ] {
            assert!(Keyword::from_lower(w).is_some(), "{w} should be recognized");
        }
    }

    #[test]
    fn rejects_unknown_words() {
        for w in ["foo", "users", "count", "lateral", "random", "SELECT"] {
            assert!(
                Keyword::from_lower(w).is_none(),
                "{w} should NOT be recognized"
            );
        }
    }

    #[test]
    fn display_round_trips_through_from_lower() {
        for kw in [
            Keyword::Select,
            Keyword::Natural,
            Keyword::Recursive,
            Keyword::Between,
            Keyword::Delete,
        ] {
            assert_eq!(Keyword::from_lower(&kw.to_string()), Some(kw));
        }
    }
}
