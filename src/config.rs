use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use crate::models::ScoringConstants;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub catalogue: CatalogueSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueSettings {
    /// JSON or TOML file with the pathology catalogue
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    pub default_limit: Option<usize>,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: default_max_limit(),
        }
    }
}

fn default_max_limit() -> usize { 500 }

/// Overrides for the scoring constants; unset fields keep the tuned defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub constants: ScoringConstants,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with OSTEO__, e.g. OSTEO__SERVER__PORT)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., OSTEO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("OSTEO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("OSTEO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn scoring_constants(&self) -> ScoringConstants {
        self.scoring.constants
    }
}

/// Apply the plain CATALOGUE_PATH variable on top of the loaded settings
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("CATALOGUE_PATH") {
        Ok(path) if !path.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("catalogue.path", path)?
            .build(),
        _ => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(ScoringSettings::default().constants, ScoringConstants::default());
    }

    #[test]
    fn test_default_file_matches_request_bounds() {
        let settings =
            Settings::from_toml_str(include_str!("../config/default.toml")).unwrap();

        // Scoring requests accept a limit of up to 500
        assert_eq!(settings.ranking.max_limit, 500);
        assert_eq!(settings.ranking.default_limit, Some(20));
        assert_eq!(settings.scoring_constants(), ScoringConstants::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_minimal_settings() {
        let settings = Settings::from_toml_str(
            r#"
[server]
host = "127.0.0.1"
port = 8080
"#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert!(settings.catalogue.path.is_none());
        assert_eq!(settings.ranking.max_limit, 500);
        assert_eq!(settings.scoring_constants(), ScoringConstants::default());
    }

    #[test]
    fn test_partial_constant_override() {
        let settings = Settings::from_toml_str(
            r#"
[server]
host = "0.0.0.0"
port = 9000

[scoring.constants]
missing_requirement_penalty = 0.2
"#,
        )
        .unwrap();

        let constants = settings.scoring_constants();
        assert_eq!(constants.missing_requirement_penalty, 0.2);
        assert_eq!(constants.sex_preference_bonus, 1.2);
        assert_eq!(constants.pain_location_points, 34);
    }
}
