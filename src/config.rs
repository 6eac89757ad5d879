//! Client configuration and tracing setup
//!
//! Values come from the environment (after loading `.env`), falling back
//! to the defaults the widgets were built against.

use std::env;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8002";
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root; the SSE channel lives at `{base_url}/mcp`
    pub base_url: String,
    /// Upper bound on waiting for the `endpoint` event
    pub handshake_timeout: Duration,
    /// Upper bound on a single tool invocation
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read `FINCALC_API_BASE_URL`, `FINCALC_HANDSHAKE_TIMEOUT_MS` and
    /// `FINCALC_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("FINCALC_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let handshake_ms = parse_or_default(
            "FINCALC_HANDSHAKE_TIMEOUT_MS",
            lookup("FINCALC_HANDSHAKE_TIMEOUT_MS"),
            DEFAULT_HANDSHAKE_TIMEOUT_MS,
        );
        let request_secs = parse_or_default(
            "FINCALC_REQUEST_TIMEOUT_SECS",
            lookup("FINCALC_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );

        Self::new(base_url)
            .with_handshake_timeout(Duration::from_millis(handshake_ms))
            .with_request_timeout(Duration::from_secs(request_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            handshake_timeout: Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn parse_or_default(key: &str, raw: Option<String>, default: u64) -> u64 {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %value, default, "Ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

/// Install a fmt subscriber honouring `RUST_LOG` (default `info`).
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
