use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    #[display("keyword")]
    Keyword,
    #[display("table")]
    Table,
    #[display("view")]
    View,
    #[display("column")]
    Column,
    #[display("function")]
    Function,
    #[display("database")]
    Database,
    #[display("alias")]
    Alias,
    #[display("operator")]
    Operator,
}

impl CandidateKind {
    /// Bucket priority used for ordering; kinds without a bucket sort last.
    pub const fn priority(self) -> u32 {
        match self {
            CandidateKind::Keyword => 1000,
            CandidateKind::Function => 900,
            CandidateKind::Table => 800,
            CandidateKind::Column => 700,
            CandidateKind::Database => 600,
            CandidateKind::View => 500,
            CandidateKind::Alias => 400,
            CandidateKind::Operator => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceRange {
    pub start: CaretPosition,
    pub end: CaretPosition,
}

/// One proposed completion. `insert_text` holds the full name until the
/// ranker strips the typed prefix from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCandidate {
    pub display_text: String,
    pub insert_text: String,
    pub kind: CandidateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_range: Option<ReplaceRange>,
    pub sort_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionCandidate {
    pub fn new(kind: CandidateKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display_text: text.clone(),
            insert_text: text,
            kind,
            replace_range: None,
            sort_key: String::new(),
            detail: None,
        }
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Self::new(CandidateKind::Keyword, text)
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_follow_bucket_table() {
        use CandidateKind::*;
        let ordered = [Keyword, Function, Table, Column, Database, View, Alias, Operator];
        assert!(ordered.windows(2).all(|w| w[0].priority() > w[1].priority()));
    }

    #[test]
    fn serializes_camel_case_without_empty_fields() {
        let candidate = CompletionCandidate::new(CandidateKind::Column, "name");
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["insertText"], "name");
        assert_eq!(json["kind"], "column");
        assert!(json.get("replaceRange").is_none());
        assert!(json.get("detail").is_none());
    }
}
