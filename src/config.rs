use crate::core::SelectionWindow;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub tables: TableSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_regions_table")]
    pub regions: String,
    #[serde(default = "default_questions_table")]
    pub quiz_questions: String,
    #[serde(default = "default_options_table")]
    pub quiz_options: String,
    #[serde(default = "default_destinations_table")]
    pub destinations: String,
    #[serde(default = "default_attractions_table")]
    pub attractions: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            regions: default_regions_table(),
            quiz_questions: default_questions_table(),
            quiz_options: default_options_table(),
            destinations: default_destinations_table(),
            attractions: default_attractions_table(),
        }
    }
}

fn default_regions_table() -> String { "regions".to_string() }
fn default_questions_table() -> String { "quiz_questions".to_string() }
fn default_options_table() -> String { "quiz_options".to_string() }
fn default_destinations_table() -> String { "provinces".to_string() }
fn default_attractions_table() -> String { "province_attractions".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

/// Window policy names accepted in `matching.window`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    TopK,
    NearBest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_destination_limit")]
    pub default_limit: u8,
    #[serde(default = "default_max_limit")]
    pub max_limit: u8,
    #[serde(default = "default_attraction_limit")]
    pub attraction_limit: u8,
    #[serde(default = "default_window")]
    pub window: WindowPolicy,
    #[serde(default = "default_near_best_fraction")]
    pub near_best_fraction: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_destination_limit(),
            max_limit: default_max_limit(),
            attraction_limit: default_attraction_limit(),
            window: default_window(),
            near_best_fraction: default_near_best_fraction(),
        }
    }
}

impl MatchingSettings {
    /// The selection window the matcher is built with
    pub fn selection_window(&self) -> SelectionWindow {
        match self.window {
            WindowPolicy::TopK => SelectionWindow::TopK,
            WindowPolicy::NearBest => {
                let fraction = if self.near_best_fraction.is_finite() {
                    self.near_best_fraction.clamp(0.0, 1.0)
                } else {
                    tracing::warn!(
                        "matching.near_best_fraction is {}, using {}",
                        self.near_best_fraction,
                        default_near_best_fraction()
                    );
                    default_near_best_fraction()
                };
                SelectionWindow::NearBest { fraction }
            }
        }
    }

    /// Resolve the number of destinations for a request
    pub fn destination_limit(&self, requested: Option<u8>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit) as usize
    }
}

fn default_destination_limit() -> u8 { 3 }
fn default_max_limit() -> u8 { 10 }
fn default_attraction_limit() -> u8 { 3 }
fn default_window() -> WindowPolicy { WindowPolicy::TopK }
fn default_near_best_fraction() -> f64 { 0.85 }

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
    /// 4. Environment variables (prefixed with TRAVEL__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRAVEL__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TRAVEL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TRAVEL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
///
/// DATABASE_URL, SUPABASE_URL and SUPABASE_KEY are what hosting platforms
/// and the catalog provider hand out, so they win when present.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("SUPABASE_URL", "catalog.url"),
        ("SUPABASE_KEY", "catalog.api_key"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.default_limit, 3);
        assert_eq!(matching.attraction_limit, 3);
        assert_eq!(matching.window, WindowPolicy::TopK);
        assert_eq!(matching.selection_window(), SelectionWindow::TopK);
    }

    #[test]
    fn test_near_best_window_from_settings() {
        let matching = MatchingSettings {
            window: WindowPolicy::NearBest,
            near_best_fraction: 1.7,
            ..MatchingSettings::default()
        };
        assert_eq!(matching.selection_window(), SelectionWindow::NearBest { fraction: 1.0 });
    }

    #[test]
    fn test_non_finite_fraction_falls_back_to_default() {
        for fraction in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let matching = MatchingSettings {
                window: WindowPolicy::NearBest,
                near_best_fraction: fraction,
                ..MatchingSettings::default()
            };
            assert_eq!(matching.selection_window(), SelectionWindow::NearBest { fraction: 0.85 });
        }
    }

    #[test]
    fn test_destination_limit() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.destination_limit(None), 3);
        assert_eq!(matching.destination_limit(Some(5)), 5);
        assert_eq!(matching.destination_limit(Some(50)), 10);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let settings = Settings::load_from(path).unwrap();
        assert_eq!(settings.catalog.tables.destinations, "provinces");
        assert_eq!(settings.catalog.tables.quiz_questions, "quiz_questions");
        assert_eq!(settings.matching.selection_window(), SelectionWindow::TopK);
    }
}
