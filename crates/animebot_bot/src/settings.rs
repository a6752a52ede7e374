//! Service settings.
//!
//! Sources in order of precedence (later sources override earlier):
//! 1. Bundled defaults (`animebot.toml` shipped with the binary)
//! 2. `~/.config/animebot/animebot.toml` (optional)
//! 3. `./animebot.toml` (optional)
//! 4. An explicit file passed on the command line
//! 5. Environment variables such as `DATABASE_URL` and `PORT`

use animebot_database::PoolSettings;
use animebot_error::{AnimebotError, AnimebotResult, ConfigError};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../animebot.toml");

/// Environment variable to settings key.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("MAX_OPEN_CONNECTIONS", "database.max_connections"),
    ("MAX_IDLE_CONNECTIONS", "database.min_idle"),
    ("DATABASE_CONNECTION_TIMEOUT", "database.connection_timeout_secs"),
    ("RUN_MIGRATIONS", "database.run_migrations"),
    ("NATS_URL", "nats.url"),
    ("NATS_SUBJECT", "nats.subject"),
    ("PORT", "server.port"),
];

/// Root settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Storage
    pub database: DatabaseSettings,
    /// Message bus
    pub nats: NatsSettings,
    /// HTTP listener
    pub server: ServerSettings,
    /// Logging and tracing
    pub telemetry: TelemetrySettings,
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Connection string
    pub url: String,
    /// Maximum open connections
    pub max_connections: u32,
    /// Idle connections kept open
    #[serde(default)]
    pub min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection
    pub connection_timeout_secs: u64,
    /// Apply embedded migrations at startup
    #[serde(default)]
    pub run_migrations: bool,
}

/// NATS settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatsSettings {
    /// Server URL
    pub url: String,
    /// Subject outbound notifications are published to
    pub subject: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logging and tracing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Service name attached to exported spans
    pub service_name: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Export spans to stdout through OpenTelemetry
    #[serde(default)]
    pub otel_stdout: bool,
}

impl From<&DatabaseSettings> for PoolSettings {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_idle: settings.min_idle,
            connection_timeout: Duration::from_secs(settings.connection_timeout_secs),
        }
    }
}

impl ServerSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> AnimebotResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                AnimebotError::from(ConfigError::new(format!(
                    "Invalid bind address {}:{}: {}",
                    self.host, self.port, e
                )))
            })
    }
}

impl Settings {
    /// Load settings from every source, reading overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a file is malformed or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> AnimebotResult<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Load settings, resolving environment overrides through `lookup`.
    #[instrument(skip(lookup))]
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> AnimebotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading settings");

        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/animebot/animebot.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }
        builder = builder.add_source(File::with_name("animebot").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = apply_env_overrides(builder, lookup)?;

        builder
            .build()
            .map_err(|e| {
                AnimebotError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                AnimebotError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Bundled defaults only.
    pub fn defaults() -> AnimebotResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                AnimebotError::from(ConfigError::new(format!(
                    "Bundled configuration is invalid: {}",
                    e
                )))
            })
    }
}

fn apply_env_overrides<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> AnimebotResult<ConfigBuilder<DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        let value = lookup(var).filter(|value| !value.trim().is_empty());
        if value.is_some() {
            debug!(var, key, "Environment override");
        }
        builder = builder.set_override_option(*key, value).map_err(|e| {
            AnimebotError::from(ConfigError::new(format!("Invalid override {}: {}", var, e)))
        })?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_bundled_defaults_parse() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.nats.subject, "notifications");
        assert_eq!(settings.telemetry.log_format, LogFormat::Text);
    }

    #[test]
    fn test_env_overrides_win() {
        let settings = Settings::load_with_env(
            None,
            env(&[
                ("DATABASE_URL", "postgres://u:p@db/anime"),
                ("MAX_OPEN_CONNECTIONS", "25"),
                ("DATABASE_CONNECTION_TIMEOUT", "5"),
                ("PORT", "9000"),
                ("NATS_SUBJECT", "outbound"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.database.url, "postgres://u:p@db/anime");
        assert_eq!(settings.database.max_connections, 25);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.nats.subject, "outbound");

        let pool = PoolSettings::from(&settings.database);
        assert_eq!(pool.connection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let settings = Settings::load_with_env(None, env(&[("PORT", "  ")])).unwrap();
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_bad_port_is_a_config_error() {
        let err = Settings::load_with_env(None, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err.kind(),
            animebot_error::AnimebotErrorKind::Config(_)
        ));
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerSettings {
            host: "127.0.0.1".into(),
            port: 3000,
        };
        assert_eq!(server.bind_addr().unwrap().port(), 3000);
    }
}
