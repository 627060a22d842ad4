//! Process settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `todos.toml` in the working directory, then `TODOS_*` environment
//! variables with `__` between nested keys (`TODOS_SERVER__PORT=8080`).

use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use todo_core::SqliteStoreOptions;

const CONFIG_FILE: &str = "todos";
const ENV_PREFIX: &str = "TODOS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Keep todos in process memory instead of SQLite.
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 4444)?
        .set_default("server.request_timeout_ms", 3000)?
        .set_default("database.url", "sqlite://todos.db")?
        .set_default("database.max_connections", 25)?
        .set_default("database.in_memory", false)?
        .set_default("telemetry.log_level", "info")?
        .set_default("telemetry.json", true)
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    pub fn store_options(&self) -> SqliteStoreOptions {
        SqliteStoreOptions {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            acquire_timeout: self.request_timeout(),
        }
    }
}
