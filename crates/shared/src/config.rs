//! Application configuration management.

use chrono::NaiveDate;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Reporting and export configuration.
    #[serde(default)]
    pub reporting: ReportingConfig,
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

/// Reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// First date scanned by the missing-dates report.
    #[serde(default = "default_history_start_date")]
    pub history_start_date: NaiveDate,
    /// Directory generated report files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Number of rows kept by the top-N exports.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            history_start_date: default_history_start_date(),
            output_dir: default_output_dir(),
            top_n: default_top_n(),
        }
    }
}

fn default_history_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default()
}

fn default_output_dir() -> String {
    "uploads".to_string()
}

fn default_top_n() -> usize {
    10
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
            .add_source(config::Environment::with_prefix("POSRECON").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("POSRECON__DATABASE__URL", Some("postgres://localhost/pos")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/pos");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.reporting.top_n, 10);
                assert_eq!(config.reporting.output_dir, "uploads");
                assert_eq!(
                    config.reporting.history_start_date,
                    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
                );
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("POSRECON__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
