//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `POCKET_SHOP_CHECKOUT_DELAY_MS` - Delay before returning to login after checkout (default: 2000)
//! - `POCKET_SHOP_SYNC_POLICY` - `full` or `removals-only` (default: full)
//! - `POCKET_SHOP_CATALOG` - Path to a JSON product list (default: built-in catalog)
//! - `POCKET_SHOP_USERS` - Path to a JSON credential list (default: built-in accounts)
//! - `POCKET_SHOP_LOG_FORMAT` - `text` or `json` (default: text)
//! - `RUST_LOG` - Log filter (default: `pocket_shop_cli=info,pocket_shop_core=info`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pocket_shop_core::session::SessionOptions;
use pocket_shop_core::sync::SyncPolicy;
use thiserror::Error;

const DEFAULT_CHECKOUT_DELAY_MS: &str = "2000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("invalid log format: {s} (expected text or json)")),
        }
    }
}

/// Shop CLI configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Delay between checkout and the return to the login screen
    pub checkout_delay: Duration,
    /// Which cart mutations reach the listing
    pub sync_policy: SyncPolicy,
    /// Product catalog file, if not using the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Credential directory file, if not using the built-in accounts
    pub users_path: Option<PathBuf>,
    /// Log output format
    pub log_format: LogFormat,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let delay_ms = lookup("POCKET_SHOP_CHECKOUT_DELAY_MS")
            .unwrap_or_else(|| DEFAULT_CHECKOUT_DELAY_MS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POCKET_SHOP_CHECKOUT_DELAY_MS".to_string(), e.to_string())
            })?;

        let sync_policy = parse_optional(&lookup, "POCKET_SHOP_SYNC_POLICY")?.unwrap_or_default();
        let log_format = parse_optional(&lookup, "POCKET_SHOP_LOG_FORMAT")?.unwrap_or_default();

        Ok(Self {
            checkout_delay: Duration::from_millis(delay_ms),
            sync_policy,
            catalog_path: lookup("POCKET_SHOP_CATALOG").map(PathBuf::from),
            users_path: lookup("POCKET_SHOP_USERS").map(PathBuf::from),
            log_format,
        })
    }

    /// Session tunables derived from this configuration.
    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions {
            sync_policy: self.sync_policy,
            return_delay: self.checkout_delay,
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            checkout_delay: SessionOptions::default().return_delay,
            sync_policy: SyncPolicy::default(),
            catalog_path: None,
            users_path: None,
            log_format: LogFormat::default(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable with `FromStr`.
fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr<Err = String>,
{
    lookup(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ShopConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShopConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.checkout_delay, Duration::from_secs(2));
        assert_eq!(config.sync_policy, SyncPolicy::Full);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.catalog_path.is_none());
        assert!(config.users_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("POCKET_SHOP_CHECKOUT_DELAY_MS", "250"),
            ("POCKET_SHOP_SYNC_POLICY", "removals-only"),
            ("POCKET_SHOP_CATALOG", "/tmp/catalog.json"),
            ("POCKET_SHOP_USERS", "/tmp/users.json"),
            ("POCKET_SHOP_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.checkout_delay, Duration::from_millis(250));
        assert_eq!(config.sync_policy, SyncPolicy::RemovalsOnly);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
        assert_eq!(config.users_path, Some(PathBuf::from("/tmp/users.json")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_delay() {
        let err = load(&[("POCKET_SHOP_CHECKOUT_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "POCKET_SHOP_CHECKOUT_DELAY_MS"));
    }

    #[test]
    fn test_invalid_policy() {
        let err = load(&[("POCKET_SHOP_SYNC_POLICY", "sometimes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "POCKET_SHOP_SYNC_POLICY"));
    }

    #[test]
    fn test_session_options() {
        let config = load(&[("POCKET_SHOP_CHECKOUT_DELAY_MS", "10")]).unwrap();
        let options = config.session_options();
        assert_eq!(options.return_delay, Duration::from_millis(10));
        assert_eq!(options.sync_policy, SyncPolicy::Full);
    }
}
