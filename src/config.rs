use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::time::Duration;
use store::AbsenceStore;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://attendance.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_ACADEMIC_YEAR: &str = "2024-2025";

/// Runtime configuration.
///
/// Sources, lowest priority first: built-in defaults, an optional `attendance.toml` in the
/// working directory, environment variables (`DATABASE_URL`, `BIND_ADDRESS`, ...).
/// Command line flags are applied on top by the CLI.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Academic year every counter is recorded under, e.g. "2024-2025".
    pub academic_year: String,
    /// Time to live of cached courses and modules.
    pub cache_ttl_secs: u64,
    /// Server side request timeout.
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().try_parsing(true))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("academic_year", DEFAULT_ACADEMIC_YEAR)?
            .set_default("cache_ttl_secs", 300)?
            .set_default("request_timeout_secs", 30)?
            .add_source(File::with_name("attendance").required(false))
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builds the shared state around an already migrated connection.
pub fn build_app_state(db: DatabaseConnection, settings: &Settings) -> AppState {
    debug!(
        "Building application state for academic year {}",
        settings.academic_year
    );
    let store = AbsenceStore::new(db.clone(), settings.academic_year.clone());

    // Only reference data goes through the cache
    let cache = Cache::builder()
        .max_capacity(100)
        .time_to_live(settings.cache_ttl())
        .build();

    AppState { db, store, cache }
}

/// Connects to the configured database and builds the application state.
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = crate::cli::commands::initdb::connect_and_migrate(&settings.database_url).await?;
    Ok(build_app_state(db, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(source)).try_parsing(true)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_environment(environment(&[])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.academic_year, DEFAULT_ACADEMIC_YEAR);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let settings = Settings::from_environment(environment(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ACADEMIC_YEAR", "2025-2026"),
            ("CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.academic_year, "2025-2026");
        assert_eq!(settings.cache_ttl_secs, 60);
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
    }
}
