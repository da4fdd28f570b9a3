//! Daily Jira worklog summary service.
//!
//! Exposes `GET /api/worklog` returning per-issue and total hours a user
//! logged on a date, plus a server-rendered query form at `/`.

pub mod bridge;
pub mod config;
pub mod error;
pub mod form;
pub mod server;
pub mod worklog;

pub use bridge::{IssueSummary, QueryResult, WorklogQuery};
pub use config::{Config, ConfigError};
pub use error::WorklogError;
pub use server::{build_router, serve, AppState};
pub use worklog::WorklogService;
