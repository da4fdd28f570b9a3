//! Error model of the worklog query path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jira_api::JiraError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorklogError>;

#[derive(Debug, Error)]
pub enum WorklogError {
    #[error("user name is required")]
    MissingUserName,
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] JiraError),
    #[error("page rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for WorklogError {
    /// Every failure is a plain-text 500 carrying the error description.
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
