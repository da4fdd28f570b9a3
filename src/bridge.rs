//! Frontend-facing DTOs for the worklog endpoint and query form.
//!
//! These are the serialized shapes exchanged with browsers; tracker wire
//! models live in `jira_api::models`.

use serde::{Deserialize, Serialize};

/// Query string of both `/api/worklog` and the form page.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct WorklogQuery {
    #[serde(rename = "user-name", default)]
    pub user_name: Option<String>,
    #[serde(rename = "date-required", default)]
    pub date_required: Option<String>,
}

impl WorklogQuery {
    /// True when the page was requested without any submitted fields.
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.date_required.is_none()
    }
}

/// Represents hours one user logged on one issue for the queried day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IssueSummary {
    pub name: String,
    pub link: String,
    pub hours: f64,
}

/// Represents the aggregated answer for one query: total hours plus the contributing issues.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub total_work_hours: f64,
    pub issues: Vec<IssueSummary>,
}
