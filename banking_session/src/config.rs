//! Central configuration for the banking-session crate

use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;

/// Base URL of the banking REST backend
/// Default: "http://localhost:8080"
pub static BANK_API_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("BANK_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
});

/// Per-request timeout applied by the HTTP client, in seconds
pub static BANK_API_TIMEOUT_SECS: LazyLock<u64> =
    LazyLock::new(|| secs_from_env("BANK_API_TIMEOUT_SECS", 10));

/// Upper bound on the startup verification call, in seconds
pub static BANK_VERIFY_TIMEOUT_SECS: LazyLock<u64> =
    LazyLock::new(|| secs_from_env("BANK_VERIFY_TIMEOUT_SECS", 10));

/// Login entry point that anonymous users are sent to
pub static BANK_ROUTE_LOGIN: LazyLock<String> =
    LazyLock::new(|| std::env::var("BANK_ROUTE_LOGIN").unwrap_or_else(|_| "/login".to_string()));

/// Landing page that authenticated users are sent to
pub static BANK_ROUTE_HOME: LazyLock<String> =
    LazyLock::new(|| std::env::var("BANK_ROUTE_HOME").unwrap_or_else(|_| "/".to_string()));

fn secs_from_env(key: &str, default: u64) -> u64 {
    parse_secs(std::env::var(key).ok().as_deref(), default)
}

fn parse_secs(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Settings consumed by [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Bound on the startup verification and on the profile lookup that
    /// resolves the account category. Non-response past it counts as failure.
    pub verify_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verify_timeout: Duration::from_secs(*BANK_VERIFY_TIMEOUT_SECS),
        }
    }
}

/// Redirect targets used by the route guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTargets {
    pub login: String,
    pub home: String,
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self {
            login: BANK_ROUTE_LOGIN.clone(),
            home: BANK_ROUTE_HOME.clone(),
        }
    }
}
