//! Application configuration

use crate::command::Command;
use crate::error::AppError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub catalog: CatalogConfig,
    pub tagging: TaggingConfig,
    pub backend: BackendConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            catalog: CatalogConfig::default(),
            tagging: TaggingConfig::default(),
            backend: BackendConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// "dark" or "light"
    pub theme: String,
    pub show_guide_on_startup: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_guide_on_startup: true,
        }
    }
}

/// Remote tag catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "https://ecchi.cloud/api/info".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Initial state of the rename-on-submit toggle
    pub rename_files: bool,
    /// Toast lifetime
    pub notification_ms: u64,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            rename_files: false,
            notification_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Override for the tag_host executable; defaults to the one next to the app
    pub host_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path; a missing file yields defaults.
    ///
    /// A `[keybindings]` table only overrides the commands it names.
    pub fn load_from(config_path: &Path) -> Result<Self, AppError> {
        if !config_path.exists() {
            tracing::info!("Using default configuration");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| AppError::Config(format!("cannot read {:?}: {}", config_path, e)))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{:?}: {}", config_path, e)))?;

        for (id, keys) in default_keybindings() {
            config.keybindings.entry(id).or_insert(keys);
        }

        tracing::info!("Configuration loaded from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "ImageTagger", "ImageTagger")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

pub(crate) fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    kb.insert(Command::OVERLAY_DISMISS.into(), vec!["Escape".into()]);

    // Page
    kb.insert(Command::TAG_SUBMIT.into(), vec!["Space".into()]);
    kb.insert(Command::TAG_SKIP.into(), vec!["Ctrl+Space".into()]);

    // Search input
    kb.insert(Command::SEARCH_CONFIRM.into(), vec!["Return".into()]);
    kb.insert(Command::SEARCH_PREV.into(), vec!["Up".into()]);
    kb.insert(Command::SEARCH_NEXT.into(), vec!["Down".into()]);

    kb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.url, "https://ecchi.cloud/api/info");
        assert_eq!(config.tagging.notification_ms, 2000);
        assert!(!config.tagging.rename_files);
        assert!(config.general.show_guide_on_startup);
        assert_eq!(config.keybindings[Command::TAG_SUBMIT], vec!["Space".to_string()]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\nrename_files = true\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.tagging.rename_files);
        assert_eq!(config.tagging.notification_ms, 2000);
        assert_eq!(config.catalog.timeout_secs, 10);
        assert!(config.backend.host_path.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.general.theme = "light".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.general.theme, "light");
        assert_eq!(loaded.keybindings.len(), 6);
    }

    #[test]
    fn test_partial_keybindings_keep_other_defaults() {
        use crate::command::{CommandDispatcher, KeyChord};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[keybindings]\n\"tag.skip\" = [\"Ctrl+S\"]\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.keybindings[Command::TAG_SKIP], vec!["Ctrl+S".to_string()]);
        assert_eq!(config.keybindings.len(), 6);

        let dispatcher = CommandDispatcher::new(&config.keybindings);
        assert_eq!(dispatcher.resolve(&KeyChord::new("Space"), false), Some(Command::Submit));
        assert_eq!(dispatcher.resolve(&KeyChord::new("Escape"), true), Some(Command::DismissOverlays));
        assert_eq!(dispatcher.resolve(&KeyChord::new("Return"), true), Some(Command::SearchConfirm));
        assert_eq!(dispatcher.resolve(&KeyChord::new("Down"), true), Some(Command::SearchNext));
        assert_eq!(dispatcher.resolve(&KeyChord::new("s").ctrl(), false), Some(Command::Skip));
        assert_eq!(dispatcher.resolve(&KeyChord::new("Space").ctrl(), false), None);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging\nrename_files = yes").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config.general.theme, "dark");
    }
}
