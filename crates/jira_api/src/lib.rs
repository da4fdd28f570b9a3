//! Typed Jira REST client crate used by the worklog summary service.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{JiraClient, SearchRequest};
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{Issue, IssueFields, SearchResults, WorklogAuthor, WorklogEntry, WorklogPage};
