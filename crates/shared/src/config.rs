//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STOCKBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_defaults() {
        let cfg: DatabaseConfig = serde_json::from_value(serde_json::json!({
            "url": "postgres://localhost/stockbook_dev"
        }))
        .unwrap();

        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.min_connections, 1);
    }

    #[test]
    fn test_database_overrides() {
        let cfg: DatabaseConfig = serde_json::from_value(serde_json::json!({
            "url": "postgres://localhost/stockbook_test",
            "max_connections": 50,
            "min_connections": 5
        }))
        .unwrap();

        assert_eq!(cfg.url, "postgres://localhost/stockbook_test");
        assert_eq!(cfg.max_connections, 50);
        assert_eq!(cfg.min_connections, 5);
    }
}
