mod issue;
mod worklog;

pub use issue::{Issue, IssueFields, SearchResults};
pub use worklog::{WorklogAuthor, WorklogEntry, WorklogPage};
