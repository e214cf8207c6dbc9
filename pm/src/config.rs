//! Configuration for the migration

use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::migrate::MigrationOptions;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Legacy patients export
    pub patients_csv: PathBuf,

    /// Legacy prenatal visits export
    pub visits_csv: PathBuf,

    /// Environment variable holding the connection string
    pub database_url_env: String,

    /// Progress message every N inserted visits
    pub progress_interval: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patients_csv: PathBuf::from(crate::DEFAULT_PATIENTS_CSV),
            visits_csv: PathBuf::from(crate::DEFAULT_VISITS_CSV),
            database_url_env: crate::DEFAULT_DATABASE_URL_ENV.to_string(),
            progress_interval: crate::DEFAULT_PROGRESS_INTERVAL,
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    ///
    /// Lookup order: explicit path, `./.pm.yml`, `<config dir>/pm/pm.yml`.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path)
                .context(format!("Failed to load config from {}", config_path.display()));
        }

        let default_paths = [
            Some(PathBuf::from(".pm.yml")),
            dirs::config_dir().map(|p| p.join("pm").join("pm.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(Config::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        log::debug!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Pipeline options derived from this config
    pub fn migration_options(&self, dry_run: bool) -> MigrationOptions {
        MigrationOptions {
            patients_csv: self.patients_csv.clone(),
            visits_csv: self.visits_csv.clone(),
            progress_interval: self.progress_interval,
            dry_run,
        }
    }
}
