use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::calendar::ViewMode;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub data:     DataConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarConfig {
    #[serde(default)]
    pub default_view: ViewMode,
}

fn default_seed() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    pub database:     Option<PathBuf>,
    #[serde(default = "default_seed")]
    pub seed_samples: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { database: None, seed_samples: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data.database.clone().unwrap_or_else(|| data_dir().join("pawcal.db"))
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pawcal")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pawcal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.calendar.default_view, ViewMode::Month);
        assert!(cfg.data.seed_samples);
        assert!(cfg.database_path().ends_with("pawcal/pawcal.db"));
    }

    #[test]
    fn full_file() {
        let cfg: AppConfig = toml::from_str(
            "[calendar]\ndefault_view = \"week\"\n\n[data]\ndatabase = \"/tmp/vet.db\"\nseed_samples = false\n",
        ).unwrap();
        assert_eq!(cfg.calendar.default_view, ViewMode::Week);
        assert_eq!(cfg.database_path(), PathBuf::from("/tmp/vet.db"));
        assert!(!cfg.data.seed_samples);
    }

    #[test]
    fn bad_view_is_rejected() {
        assert!(toml::from_str::<AppConfig>("[calendar]\ndefault_view = \"year\"\n").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = AppConfig::load_from(Path::new("/nonexistent/pawcal/config.toml")).unwrap();
        assert_eq!(cfg.calendar.default_view, ViewMode::Month);
    }
}
