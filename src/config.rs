//! Process configuration read from the environment at startup.

use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use jira_api::config::{
    DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RESULTS,
    DEFAULT_TIMEOUT_SECS,
};
use jira_api::JiraConfig;
use thiserror::Error;

pub const TOKEN_VAR: &str = "JIRA_ACCESS_TOKEN";
pub const BASE_URL_VAR: &str = "JIRA_BASE_URL";
pub const API_VERSION_VAR: &str = "JIRA_API_VERSION";
pub const MAX_RESULTS_VAR: &str = "JIRA_MAX_RESULTS";
pub const TIMEOUT_VAR: &str = "JIRA_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "JIRA_CONNECT_TIMEOUT_SECS";
pub const HOST_VAR: &str = "WORKLOG_HOST";
pub const PORT_VAR: &str = "WORKLOG_PORT";

/// Default listen port.
fn default_port() -> u16 {
    5000
}

/// Default listen address: all interfaces, so a reverse proxy can reach the service.
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Represents the service configuration: where to listen and how to reach the tracker.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub jira: JiraConfig,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                log::warn!("Ignoring unreadable .env file: {}", err);
            }
        }
        Self::from_vars(env::vars().collect())
    }

    /// Builds configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            vars.get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let token = lookup(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let base_url = lookup(BASE_URL_VAR).unwrap_or(DEFAULT_BASE_URL);
        let api_version = lookup(API_VERSION_VAR).unwrap_or(DEFAULT_API_VERSION);
        let max_results = parse_or(lookup(MAX_RESULTS_VAR), MAX_RESULTS_VAR, DEFAULT_MAX_RESULTS)?;
        if max_results == 0 {
            return Err(ConfigError::Invalid {
                name: MAX_RESULTS_VAR,
                value: "0".to_string(),
            });
        }
        let timeout = parse_or(lookup(TIMEOUT_VAR), TIMEOUT_VAR, DEFAULT_TIMEOUT_SECS)?;
        let connect_timeout = parse_or(
            lookup(CONNECT_TIMEOUT_VAR),
            CONNECT_TIMEOUT_VAR,
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        let host = parse_or(lookup(HOST_VAR), HOST_VAR, default_host())?;
        let port = parse_or(lookup(PORT_VAR), PORT_VAR, default_port())?;

        let jira = JiraConfig::new(token)
            .with_base_url(base_url)
            .with_api_version(api_version)
            .with_max_results(max_results)
            .with_timeout(Duration::from_secs(timeout))
            .with_connect_timeout(Duration::from_secs(connect_timeout));

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            jira,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<&str>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
        None => Ok(default),
    }
}
