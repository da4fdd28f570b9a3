use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://jira.mrs-electronic.com";
pub const DEFAULT_API_VERSION: &str = "2";
pub const DEFAULT_USER_AGENT: &str = "jira-worklog";
pub const DEFAULT_MAX_RESULTS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_version: String,
    pub token: String,
    pub user_agent: String,
    pub max_results: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("max_results", &self.max_results)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl JiraConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// REST root for the configured API version, always ending in `/`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/rest/api/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    /// Human-facing issue page for `issue_key`.
    pub fn browse_url(&self, issue_key: &str) -> String {
        format!("{}/browse/{}", self.base_url.trim_end_matches('/'), issue_key)
    }
}
