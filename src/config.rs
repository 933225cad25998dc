//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The bus itself only sees
//! [`BusConfig`]; everything else belongs to the composition root.

use std::net::SocketAddr;
use std::time::Duration;

/// Default deadline for a single handler invocation.
pub const DEFAULT_HANDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default deadline for a single escalation notification.
pub const DEFAULT_ESCALATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default inbox capacity: a single slot, the closest `tokio::mpsc`
/// gets to a rendezvous hand-off.
pub const DEFAULT_INBOX_CAPACITY: usize = 1;

/// Construction-time settings of the event bus. Fixed per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Deadline applied to every handler invocation.
    pub handle_timeout: Duration,
    /// Deadline applied to every escalation notification.
    pub escalation_timeout: Duration,
    /// Capacity of the inbound queue. Zero is treated as one.
    pub inbox_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            handle_timeout: DEFAULT_HANDLE_TIMEOUT,
            escalation_timeout: DEFAULT_ESCALATION_TIMEOUT,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

/// Credentials of the Telegram bot used for failure alerts.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API token.
    pub token: String,
    /// Target chat ID.
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Per-request timeout of the HTTP server.
    pub request_timeout: Duration,

    /// Event bus settings.
    pub bus: BusConfig,

    /// Telegram alerting, if both token and chat ID are set.
    pub telegram: Option<TelegramConfig>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30));

        let bus = BusConfig {
            handle_timeout: Duration::from_secs(parse_env(
                "BUS_HANDLE_TIMEOUT_SECS",
                DEFAULT_HANDLE_TIMEOUT.as_secs(),
            )),
            escalation_timeout: Duration::from_secs(parse_env(
                "BUS_ESCALATION_TIMEOUT_SECS",
                DEFAULT_ESCALATION_TIMEOUT.as_secs(),
            )),
            inbox_capacity: parse_env("BUS_INBOX_CAPACITY", DEFAULT_INBOX_CAPACITY),
        };

        let telegram = match (
            non_empty_env("TELEGRAM_TOKEN"),
            non_empty_env("TELEGRAM_CHAT_ID"),
        ) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            _ => None,
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            request_timeout,
            bus,
            telegram,
            log_format,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reads an environment variable, treating blank values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_defaults_match_deployment_constants() {
        let config = BusConfig::default();
        assert_eq!(config.handle_timeout, Duration::from_secs(300));
        assert_eq!(config.escalation_timeout, Duration::from_secs(30));
        assert_eq!(config.inbox_capacity, 1);
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: u64 = parse_env("POPTIMIZER_BUS_TEST_SURELY_UNSET", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn non_empty_env_ignores_missing_key() {
        assert!(non_empty_env("POPTIMIZER_BUS_TEST_SURELY_UNSET").is_none());
    }

    #[test]
    fn telegram_debug_hides_token() {
        let config = TelegramConfig {
            token: "secret-token".to_string(),
            chat_id: "42".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("42"));
    }
}
