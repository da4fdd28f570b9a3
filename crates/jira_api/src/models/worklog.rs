//! Worklog models embedded in Jira issue payloads.

use serde::Deserialize;

/// Worklog container returned under `fields.worklog` of an issue.
///
/// Jira embeds at most one page of worklogs here (20 by default), with `total`
/// counting every worklog on the issue.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub worklogs: Vec<WorklogEntry>,
}

/// Represents a single time record logged against an issue: its author, start timestamp and duration in seconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    #[serde(default)]
    pub author: Option<WorklogAuthor>,
    pub started: String,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogAuthor {
    pub name: Option<String>,
}

impl WorklogPage {
    /// True when the issue carries more worklogs than were embedded.
    pub fn is_truncated(&self) -> bool {
        self.total
            .map(|total| total as usize > self.worklogs.len())
            .unwrap_or(false)
    }
}

impl WorklogEntry {
    /// Upstream author identifier (login name), not the display name.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|author| author.name.as_deref())
    }
}
