// =============================================================================
// config.rs - THE CONTROL PANEL
// =============================================================================
//
// One struct, read once at startup. Every knob can be overridden with a
// WATCHDOG_ environment variable (or a .env file), and every knob has a
// default that works out of the box.
//
// The single most important knob is the API key. If it is there, reports
// come from the language model. If it is not, every screen gets demo data.
// That decision is made here, once, and nowhere else.
// =============================================================================

use std::env;
use std::time::Duration;

/// Runtime configuration for the whole engine.
#[derive(Clone)]
pub struct Config {
    // =========================================================================
    // MODEL PROVIDER
    // =========================================================================

    /// Provider API key. `None` means demo mode, system-wide.
    pub openai_api_key: Option<String>,

    /// Base URL of the chat-completion API, without a trailing slash.
    /// Default: https://api.openai.com/v1
    pub openai_base_url: String,

    /// Replaces the per-report default model when set.
    pub model_override: Option<String>,

    /// Upper bound on a single provider call. This only stops a hung
    /// connection from hanging the dashboard; nothing is ever retried.
    pub request_timeout: Duration,

    // =========================================================================
    // SERVERS
    // =========================================================================

    /// Interface both servers bind to.
    pub bind_addr: String,

    /// Dashboard API port. Default: 8080
    pub port: u16,

    /// Metrics port. Default: 9090
    pub metrics_port: u16,

    // =========================================================================
    // PAYWALL
    // =========================================================================

    /// Free-tier deep dives per session. Default: 3
    pub deep_dive_limit: u32,

    // =========================================================================
    // CIRCUIT BREAKER
    // When the provider falls over, stop sending it traffic for a while.
    // =========================================================================

    /// Consecutive failures before the breaker opens. Default: 5
    pub circuit_breaker_failure_threshold: u32,

    /// How long the breaker stays open. Default: 60 seconds
    pub circuit_breaker_reset_timeout: Duration,

    /// Successful half-open calls needed to close again. Default: 1
    pub circuit_breaker_success_threshold: u32,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// A `.env` file in the working directory is honoured if present; its
    /// absence is not an error.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Config {
            openai_api_key: env_non_empty("WATCHDOG_OPENAI_API_KEY")
                .or_else(|| env_non_empty("OPENAI_API_KEY")),
            openai_base_url: env_or_default("WATCHDOG_OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            model_override: env_non_empty("WATCHDOG_MODEL"),
            request_timeout: Duration::from_secs(
                env_or_default("WATCHDOG_REQUEST_TIMEOUT_SECS", "60").parse().unwrap_or(60)
            ),

            bind_addr: env_or_default("WATCHDOG_BIND_ADDR", "0.0.0.0"),
            port: env_or_default("WATCHDOG_PORT", "8080").parse().unwrap_or(8080),
            metrics_port: env_or_default("WATCHDOG_METRICS_PORT", "9090").parse().unwrap_or(9090),

            deep_dive_limit: env_or_default("WATCHDOG_DEEP_DIVE_LIMIT", "3").parse().unwrap_or(3),

            circuit_breaker_failure_threshold: env_or_default(
                "WATCHDOG_CB_FAILURE_THRESHOLD", "5"
            ).parse().unwrap_or(5),
            circuit_breaker_reset_timeout: Duration::from_secs(
                env_or_default("WATCHDOG_CB_RESET_TIMEOUT_SECS", "60").parse().unwrap_or(60)
            ),
            circuit_breaker_success_threshold: env_or_default(
                "WATCHDOG_CB_SUCCESS_THRESHOLD", "1"
            ).parse().unwrap_or(1),
        }
    }

    /// True when no provider credential is configured.
    pub fn demo_mode(&self) -> bool {
        self.openai_api_key.is_none()
    }

    /// Address the dashboard server listens on.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Address the metrics server listens on.
    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.metrics_port)
    }
}

impl Default for Config {
    /// Defaults with no environment lookup at all. Demo mode.
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            model_override: None,
            request_timeout: Duration::from_secs(60),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            metrics_port: 9090,
            deep_dive_limit: 3,
            circuit_breaker_failure_threshold: 5,
            circuit_breaker_reset_timeout: Duration::from_secs(60),
            circuit_breaker_success_threshold: 1,
        }
    }
}

// The key never goes to the logs, not even at debug level.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("model_override", &self.model_override)
            .field("request_timeout", &self.request_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("metrics_port", &self.metrics_port)
            .field("deep_dive_limit", &self.deep_dive_limit)
            .field("circuit_breaker_failure_threshold", &self.circuit_breaker_failure_threshold)
            .field("circuit_breaker_reset_timeout", &self.circuit_breaker_reset_timeout)
            .field("circuit_breaker_success_threshold", &self.circuit_breaker_success_threshold)
            .finish()
    }
}

/// Read an environment variable with a default fallback.
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating blank values as unset.
fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_demo_mode() {
        let config = Config::default();
        assert!(config.demo_mode());
        assert_eq!(config.deep_dive_limit, 3);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config {
            openai_api_key: Some("sk-very-secret".to_string()),
            ..Config::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(!config.demo_mode());
    }
}
