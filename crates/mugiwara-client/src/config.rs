//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero configuration:
//! a SQLite file in the platform data directory and the stock derivation
//! secret.

use std::path::PathBuf;
use std::time::Duration;

use mugiwara_shared::constants::{DEFAULT_APP_SECRET, KDF_ITERATIONS};
use mugiwara_shared::AppSecret;
use mugiwara_store::Database;

pub(crate) const DEFAULT_CONVERSATIONS_POLL: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_THREAD_POLL: Duration = Duration::from_secs(3);

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Shared message database.  `None` runs the client in local-only mode:
    /// reads come back empty and sends are optimistic only.
    /// Env: `MUGIWARA_DATABASE_PATH` (empty or `off` disables the store)
    /// Default: platform data dir, see [`Database::default_path`].
    pub database_path: Option<PathBuf>,

    /// Secret every conversation key is derived from.  Every client of a
    /// deployment must agree on it.
    /// Env: `MUGIWARA_APP_SECRET`
    /// Default: the built-in legacy secret.
    pub app_secret: String,

    /// PBKDF2 rounds.
    /// Env: `MUGIWARA_KDF_ITERATIONS`
    /// Default: `100000`
    pub kdf_iterations: u32,

    /// How often the conversation list is re-fetched.
    /// Env: `MUGIWARA_CONVERSATIONS_POLL_MS`
    /// Default: 5 s
    pub conversations_poll_interval: Duration,

    /// How often the open thread is re-fetched.
    /// Env: `MUGIWARA_THREAD_POLL_MS`
    /// Default: 3 s
    pub thread_poll_interval: Duration,

    /// Where the logged-in session is remembered between runs.
    /// Env: `MUGIWARA_SESSION_PATH`
    /// Default: none (session lives in memory only).
    pub session_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_path: Database::default_path().ok(),
            app_secret: DEFAULT_APP_SECRET.to_string(),
            kdf_iterations: KDF_ITERATIONS,
            conversations_poll_interval: DEFAULT_CONVERSATIONS_POLL,
            thread_poll_interval: DEFAULT_THREAD_POLL,
            session_path: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("database_path", &self.database_path)
            .field("app_secret", &"<redacted>")
            .field("kdf_iterations", &self.kdf_iterations)
            .field("conversations_poll_interval", &self.conversations_poll_interval)
            .field("thread_poll_interval", &self.thread_poll_interval)
            .field("session_path", &self.session_path)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("MUGIWARA_DATABASE_PATH") {
            let trimmed = path.trim();
            config.database_path = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("off") {
                None
            } else {
                Some(PathBuf::from(trimmed))
            };
        }

        if let Some(secret) = lookup("MUGIWARA_APP_SECRET") {
            if secret.is_empty() {
                tracing::warn!("Empty MUGIWARA_APP_SECRET, using default");
            } else {
                config.app_secret = secret;
            }
        }

        if let Some(val) = lookup("MUGIWARA_KDF_ITERATIONS") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => {
                    if n < KDF_ITERATIONS {
                        tracing::warn!(
                            iterations = n,
                            recommended = KDF_ITERATIONS,
                            "Low KDF iteration count; keys will not match other clients"
                        );
                    }
                    config.kdf_iterations = n;
                }
                _ => tracing::warn!(value = %val, "Invalid MUGIWARA_KDF_ITERATIONS, using default"),
            }
        }

        if let Some(val) = lookup("MUGIWARA_CONVERSATIONS_POLL_MS") {
            match parse_interval(&val) {
                Some(d) => config.conversations_poll_interval = d,
                None => tracing::warn!(
                    value = %val,
                    "Invalid MUGIWARA_CONVERSATIONS_POLL_MS, using default"
                ),
            }
        }

        if let Some(val) = lookup("MUGIWARA_THREAD_POLL_MS") {
            match parse_interval(&val) {
                Some(d) => config.thread_poll_interval = d,
                None => tracing::warn!(value = %val, "Invalid MUGIWARA_THREAD_POLL_MS, using default"),
            }
        }

        if let Some(path) = lookup("MUGIWARA_SESSION_PATH") {
            if !path.trim().is_empty() {
                config.session_path = Some(PathBuf::from(path.trim()));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    pub fn app_secret(&self) -> AppSecret {
        AppSecret::new(self.app_secret.clone(), self.kdf_iterations)
    }
}

fn parse_interval(val: &str) -> Option<Duration> {
    match val.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ClientConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = from_pairs(&[]);
        assert_eq!(config.app_secret, DEFAULT_APP_SECRET);
        assert_eq!(config.kdf_iterations, 100_000);
        assert_eq!(config.conversations_poll_interval, Duration::from_secs(5));
        assert_eq!(config.thread_poll_interval, Duration::from_secs(3));
        assert!(config.session_path.is_none());
    }

    #[test]
    fn test_store_can_be_disabled() {
        assert!(from_pairs(&[("MUGIWARA_DATABASE_PATH", "off")]).database_path.is_none());
        assert!(from_pairs(&[("MUGIWARA_DATABASE_PATH", "  ")]).database_path.is_none());
        assert_eq!(
            from_pairs(&[("MUGIWARA_DATABASE_PATH", "/tmp/chat.db")]).database_path,
            Some(PathBuf::from("/tmp/chat.db"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("MUGIWARA_APP_SECRET", "deployment-secret"),
            ("MUGIWARA_KDF_ITERATIONS", "200000"),
            ("MUGIWARA_CONVERSATIONS_POLL_MS", "1500"),
            ("MUGIWARA_THREAD_POLL_MS", "750"),
            ("MUGIWARA_SESSION_PATH", "/tmp/session.json"),
        ]);
        assert_eq!(config.app_secret, "deployment-secret");
        assert_eq!(config.app_secret().iterations(), 200_000);
        assert_eq!(config.conversations_poll_interval, Duration::from_millis(1500));
        assert_eq!(config.thread_poll_interval, Duration::from_millis(750));
        assert_eq!(config.session_path, Some(PathBuf::from("/tmp/session.json")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("MUGIWARA_APP_SECRET", ""),
            ("MUGIWARA_KDF_ITERATIONS", "lots"),
            ("MUGIWARA_THREAD_POLL_MS", "0"),
        ]);
        assert_eq!(config.app_secret, DEFAULT_APP_SECRET);
        assert_eq!(config.kdf_iterations, 100_000);
        assert_eq!(config.thread_poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = from_pairs(&[("MUGIWARA_APP_SECRET", "deployment-secret")]);
        let printed = format!("{config:?}");
        assert!(!printed.contains("deployment-secret"), "{printed}");
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("kdf_iterations: 100000"));
    }
}
