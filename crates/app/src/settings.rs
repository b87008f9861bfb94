//! Settings for the command line front end.
//!
//! Values come, in increasing priority, from the defaults below, an optional
//! TOML file (`fairshare.toml` unless `--config` says otherwise) and
//! `FAIRSHARE__*` environment variables, e.g. `FAIRSHARE__APP__LEVEL=debug` or
//! `FAIRSHARE__STORAGE__SQLITE=/tmp/trip.db`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "fairshare.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Nothing survives the process.
    Memory,
    /// Path of the SQLite file, created when missing.
    Sqlite(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level for the fairshare crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Printed in front of every amount.
    pub currency: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            currency: "RM".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub storage: Storage,
    pub display: Display,
    /// Create Alice, Bob and Charlie when the roster is empty.
    pub seed_participants: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: App::default(),
            storage: Storage::Sqlite("fairshare.db".to_string()),
            display: Display::default(),
            seed_participants: true,
        }
    }
}

impl Settings {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("FAIRSHARE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Connection string for the configured storage, `None` for memory.
    pub fn database_url(&self) -> Option<String> {
        match &self.storage {
            Storage::Memory => None,
            Storage::Sqlite(path) => Some(format!("sqlite:{path}?mode=rwc")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Some("does/not/exist.toml")).unwrap();
        assert_eq!(settings.display.currency, "RM");
        assert!(settings.seed_participants);
    }

    #[test]
    fn config_file_is_read_from_the_given_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "fairshare.toml");

        let path = std::env::temp_dir().join(format!("fairshare-{}.toml", std::process::id()));
        std::fs::write(&path, "[display]\ncurrency = \"SGD\"\n").unwrap();
        let settings = Settings::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.display.currency, "SGD");
        assert_eq!(settings.app.level, "warn");
    }

    #[test]
    fn storage_is_read_from_toml() {
        let source = r#"
            seed_participants = false

            [storage]
            sqlite = "/tmp/trip.db"

            [display]
            currency = "EUR"
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.storage, Storage::Sqlite("/tmp/trip.db".to_string()));
        assert_eq!(
            settings.database_url().as_deref(),
            Some("sqlite:/tmp/trip.db?mode=rwc")
        );
        assert_eq!(settings.display.currency, "EUR");
        assert_eq!(settings.app.level, "warn");
        assert!(!settings.seed_participants);
    }

    #[test]
    fn memory_storage_has_no_url() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(r#"storage = "memory""#, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.storage, Storage::Memory);
        assert_eq!(settings.database_url(), None);
    }
}
