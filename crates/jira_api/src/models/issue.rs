use serde::Deserialize;

use crate::models::WorklogPage;

/// Body of a `search` response. Only `issues` is guaranteed; `total` is used to spot truncation.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SearchResults {
    /// True when the tracker reports more matches than were returned.
    pub fn is_truncated(&self) -> bool {
        self.total
            .map(|total| total as usize > self.issues.len())
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub worklog: WorklogPage,
}

impl Issue {
    /// Summary text, falling back to the key when the tracker sent none.
    pub fn display_name(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or(&self.key)
    }

    pub fn worklogs(&self) -> &[crate::models::WorklogEntry] {
        &self.fields.worklog.worklogs
    }
}
