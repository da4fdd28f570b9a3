//! Daily worklog aggregation over Jira search results.
//!
//! The search narrows candidates by issue only: an issue matches when *any*
//! of its worklogs was written by the user on the day, so every entry is
//! filtered again here before it is counted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use jira_api::{Issue, JiraClient, JiraConfig, SearchRequest, SearchResults};
use log::{info, warn};

use crate::bridge::{IssueSummary, QueryResult, WorklogQuery};
use crate::error::{Result, WorklogError};

const SECONDS_PER_HOUR: f64 = 3600.0;
const SEARCH_FIELDS: [&str; 2] = ["worklog", "summary"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Stateless query service; cloning shares the underlying HTTP client.
#[derive(Clone)]
pub struct WorklogService {
    client: JiraClient,
}

impl WorklogService {
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: JiraConfig) -> jira_api::Result<Self> {
        JiraClient::new(config).map(Self::new)
    }

    /// Same as [`get_worklog_summary`](Self::get_worklog_summary) for raw query-string input.
    pub async fn summarize_query(&self, query: &WorklogQuery) -> Result<QueryResult> {
        self.get_worklog_summary(
            query.user_name.as_deref().unwrap_or_default(),
            query.date_required.as_deref().unwrap_or_default(),
        )
        .await
    }

    /// Sums the hours `user_name` logged on `date_required`, per issue and overall.
    pub async fn get_worklog_summary(
        &self,
        user_name: &str,
        date_required: &str,
    ) -> Result<QueryResult> {
        if user_name.trim().is_empty() {
            return Err(WorklogError::MissingUserName);
        }
        let date = normalize_date(date_required)?;
        info!("Worklog query for {} on {}", user_name, date);

        let config = self.client.config();
        let request = SearchRequest::new(build_jql(user_name, &date), config.max_results)
            .with_fields(SEARCH_FIELDS);
        let results = self.client.search_issues(&request).await?;

        for warning in truncation_warnings(&results) {
            warn!("Search for {} on {}: {}", user_name, date, warning);
        }

        let summary = summarize(&results, user_name, &date, |key| config.browse_url(key));
        info!(
            "Worklog query for {} on {}: {:.2} hours across {} issues",
            user_name,
            date,
            summary.total_work_hours,
            summary.issues.len()
        );
        Ok(summary)
    }
}

/// Normalizes a user-supplied date to `YYYY-MM-DD`.
pub fn normalize_date(input: &str) -> Result<String> {
    parse_date(input.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| WorklogError::InvalidDate(input.to_string()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date_time| date_time.date_naive())
        })
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|date_time| date_time.date())
        })
}

/// JQL pre-filter selecting issues with a worklog by `user_name` on `date`.
pub fn build_jql(user_name: &str, date: &str) -> String {
    format!(
        "worklogAuthor = \"{}\" and worklogDate = {}",
        escape_jql_string(user_name),
        date
    )
}

fn escape_jql_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Describes each way `results` is incomplete, so the hours may undercount.
pub fn truncation_warnings(results: &SearchResults) -> Vec<String> {
    let mut warnings = Vec::new();
    if results.is_truncated() {
        warnings.push(format!(
            "hit the result cap, {} of {} issues returned",
            results.issues.len(),
            results.total.unwrap_or_default()
        ));
    }
    for issue in results
        .issues
        .iter()
        .filter(|issue| issue.fields.worklog.is_truncated())
    {
        warnings.push(format!(
            "{} embeds {} of {} worklogs",
            issue.key,
            issue.worklogs().len(),
            issue.fields.worklog.total.unwrap_or_default()
        ));
    }
    warnings
}

/// Filters and sums worklogs in upstream order. Issues without positive hours are dropped.
pub fn summarize<F>(results: &SearchResults, user_name: &str, date: &str, link_for: F) -> QueryResult
where
    F: Fn(&str) -> String,
{
    let mut summary = QueryResult::default();
    for issue in &results.issues {
        let hours = issue_hours(issue, user_name, date);
        if hours > 0.0 {
            summary.total_work_hours += hours;
            summary.issues.push(IssueSummary {
                name: issue.display_name().to_string(),
                link: link_for(&issue.key),
                hours,
            });
        }
    }
    summary
}

fn issue_hours(issue: &Issue, user_name: &str, date: &str) -> f64 {
    issue
        .worklogs()
        .iter()
        .filter(|entry| entry.author_name() == Some(user_name) && entry.started.starts_with(date))
        .map(|entry| entry.time_spent_seconds as f64 / SECONDS_PER_HOUR)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::{json, Value};

    fn link(key: &str) -> String {
        format!("https://jira.example.com/browse/{key}")
    }

    fn worklog(author: &str, started: &str, seconds: i64) -> Value {
        json!({
            "author": { "name": author, "displayName": author.to_uppercase() },
            "started": started,
            "timeSpentSeconds": seconds
        })
    }

    fn issue(key: &str, summary: &str, worklogs: Vec<Value>) -> Value {
        json!({
            "key": key,
            "fields": { "summary": summary, "worklog": { "worklogs": worklogs } }
        })
    }

    fn results(issues: Vec<Value>) -> SearchResults {
        serde_json::from_value(json!({ "issues": issues })).expect("fixture should decode")
    }

    fn abc_1() -> Value {
        issue(
            "ABC-1",
            "Fix login",
            vec![
                worklog("alice", "2024-01-05T09:00:00.000+0000", 3600),
                worklog("bob", "2024-01-05T10:00:00.000+0000", 7200),
            ],
        )
    }

    fn assert_total_matches_issues(result: &QueryResult) {
        let sum: f64 = result.issues.iter().map(|issue| issue.hours).sum();
        assert_eq!(result.total_work_hours, sum);
        assert!(result.issues.iter().all(|issue| issue.hours > 0.0));
    }

    #[test]
    fn counts_only_the_requested_author() {
        let result = summarize(&results(vec![abc_1()]), "alice", "2024-01-05", link);

        assert_eq!(result.total_work_hours, 1.0);
        assert_eq!(
            result.issues,
            vec![IssueSummary {
                name: "Fix login".to_string(),
                link: link("ABC-1"),
                hours: 1.0,
            }]
        );
        assert_total_matches_issues(&result);
    }

    #[test]
    fn other_dates_are_not_counted() {
        let result = summarize(&results(vec![abc_1()]), "alice", "2024-01-06", link);
        assert_eq!(result, QueryResult::default());
    }

    #[test]
    fn author_match_is_case_sensitive() {
        let result = summarize(&results(vec![abc_1()]), "Alice", "2024-01-05", link);
        assert!(result.issues.is_empty());
        assert_eq!(result.total_work_hours, 0.0);
    }

    #[test]
    fn zero_hour_issues_are_dropped_and_total_follows_remaining() {
        let fixture = results(vec![
            issue(
                "ABC-2",
                "Someone else's work",
                vec![worklog("bob", "2024-01-05T09:00:00.000+0000", 3600)],
            ),
            issue(
                "ABC-3",
                "Release notes",
                vec![
                    worklog("alice", "2024-01-05T13:00:00.000+0000", 1800),
                    worklog("alice", "2024-01-04T13:00:00.000+0000", 3600),
                ],
            ),
        ]);

        let result = summarize(&fixture, "alice", "2024-01-05", link);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].link, link("ABC-3"));
        assert_eq!(result.issues[0].hours, 0.5);
        assert_eq!(result.total_work_hours, 0.5);
        assert_total_matches_issues(&result);
    }

    #[test]
    fn multiple_entries_accumulate_per_issue_in_upstream_order() {
        let fixture = results(vec![
            issue(
                "ABC-9",
                "Later",
                vec![worklog("alice", "2024-01-05T16:00:00.000+0000", 900)],
            ),
            issue(
                "ABC-4",
                "Earlier",
                vec![
                    worklog("alice", "2024-01-05T08:00:00.000+0000", 3600),
                    worklog("alice", "2024-01-05T11:00:00.000+0000", 5400),
                ],
            ),
        ]);

        let result = summarize(&fixture, "alice", "2024-01-05", link);
        let keys: Vec<&str> = result.issues.iter().map(|issue| issue.name.as_str()).collect();
        assert_eq!(keys, ["Later", "Earlier"]);
        assert_eq!(result.issues[0].hours, 0.25);
        assert_eq!(result.issues[1].hours, 2.5);
        assert_eq!(result.total_work_hours, 2.75);
    }

    #[test]
    fn entries_without_author_are_ignored() {
        let fixture: SearchResults = serde_json::from_value(json!({
            "issues": [{
                "key": "ABC-5",
                "fields": {
                    "summary": "Anonymous",
                    "worklog": { "worklogs": [{
                        "started": "2024-01-05T09:00:00.000+0000",
                        "timeSpentSeconds": 3600
                    }]}
                }
            }]
        }))
        .expect("fixture should decode");

        assert!(summarize(&fixture, "alice", "2024-01-05", link).issues.is_empty());
    }

    #[test]
    fn capped_search_produces_a_warning() {
        let fixture: SearchResults =
            serde_json::from_value(json!({ "total": 3, "issues": [abc_1()] }))
                .expect("fixture should decode");

        assert_eq!(
            truncation_warnings(&fixture),
            vec!["hit the result cap, 1 of 3 issues returned".to_string()]
        );
    }

    #[test]
    fn partial_worklog_page_produces_a_warning_per_issue() {
        let fixture: SearchResults = serde_json::from_value(json!({
            "total": 2,
            "issues": [
                abc_1(),
                {
                    "key": "ABC-7",
                    "fields": {
                        "summary": "Long running",
                        "worklog": {
                            "total": 25,
                            "worklogs": [worklog("alice", "2024-01-05T09:00:00.000+0000", 60)]
                        }
                    }
                }
            ]
        }))
        .expect("fixture should decode");

        assert_eq!(
            truncation_warnings(&fixture),
            vec!["ABC-7 embeds 1 of 25 worklogs".to_string()]
        );
    }

    #[test]
    fn complete_results_produce_no_warnings() {
        let fixture: SearchResults =
            serde_json::from_value(json!({ "total": 1, "issues": [abc_1()] }))
                .expect("fixture should decode");
        assert!(truncation_warnings(&fixture).is_empty());
        assert!(truncation_warnings(&results(vec![abc_1()])).is_empty());
    }

    #[test]
    fn normalize_date_accepts_common_forms() {
        assert_eq!(normalize_date("2024-01-05").unwrap(), "2024-01-05");
        assert_eq!(normalize_date(" 2024-01-05 ").unwrap(), "2024-01-05");
        assert_eq!(normalize_date("2024/01/05").unwrap(), "2024-01-05");
        assert_eq!(normalize_date("2024-01-05T23:30:00+02:00").unwrap(), "2024-01-05");
        assert_eq!(normalize_date("2024-01-05T09:00").unwrap(), "2024-01-05");
        assert_eq!(normalize_date("2024-01-05 09:00:00").unwrap(), "2024-01-05");
    }

    #[test]
    fn normalize_date_rejects_garbage() {
        for input in ["", "   ", "yesterday", "2024-13-01", "2024-02-30", "05.01.2024"] {
            assert!(
                matches!(normalize_date(input), Err(WorklogError::InvalidDate(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn jql_quotes_and_escapes_user_name() {
        assert_eq!(
            build_jql("alice", "2024-01-05"),
            r#"worklogAuthor = "alice" and worklogDate = 2024-01-05"#
        );
        assert_eq!(
            build_jql(r#"ali"ce\"#, "2024-01-05"),
            r#"worklogAuthor = "ali\"ce\\" and worklogDate = 2024-01-05"#
        );
    }

    fn service_for(server: &ServerGuard) -> WorklogService {
        let config = JiraConfig::new("test-token").with_base_url(server.url());
        WorklogService::from_config(config).expect("service should build")
    }

    #[tokio::test]
    async fn summary_queries_upstream_and_links_issues() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_header("authorization", "Bearer test-token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "jql".into(),
                    r#"worklogAuthor = "alice" and worklogDate = 2024-01-05"#.into(),
                ),
                Matcher::UrlEncoded("maxResults".into(), "1000".into()),
                Matcher::UrlEncoded("fields".into(), "worklog,summary".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "total": 1, "issues": [abc_1()] }).to_string())
            .create_async()
            .await;

        let result = service_for(&server)
            .get_worklog_summary("alice", "2024/01/05")
            .await
            .expect("query should succeed");

        mock.assert_async().await;
        assert_eq!(result.total_work_hours, 1.0);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].link.ends_with("/browse/ABC-1"));
        assert!(result.issues[0].link.starts_with(&server.url()));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_upstream() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let service = service_for(&server);

        let err = service
            .get_worklog_summary("alice", "not-a-date")
            .await
            .expect_err("bad date should fail");
        assert!(matches!(err, WorklogError::InvalidDate(_)));

        let err = service
            .summarize_query(&WorklogQuery {
                user_name: None,
                date_required: Some("2024-01-05".to_string()),
            })
            .await
            .expect_err("missing user should fail");
        assert!(matches!(err, WorklogError::MissingUserName));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_failure_discards_the_query() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = service_for(&server)
            .get_worklog_summary("alice", "2024-01-05")
            .await
            .expect_err("upstream error should propagate");
        assert!(matches!(err, WorklogError::Upstream(_)));
        assert!(err.to_string().contains("bad gateway"));
    }
}
