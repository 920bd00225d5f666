//! User settings for VitalDesk
//!
//! Manages backup behaviour and display preferences.

use serde::{Deserialize, Serialize};

use super::paths::VitalPaths;
use crate::error::VitalError;

/// User settings for VitalDesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backups older than this many days are removed by `backup prune`
    #[serde(default = "default_backup_retention_days")]
    pub backup_retention_days: u32,

    /// Write a complete backup when a mutating command finishes
    #[serde(default = "default_backup_on_exit")]
    pub backup_on_exit: bool,

    /// Date format preference for terminal output (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_backup_retention_days() -> u32 {
    30
}

fn default_backup_on_exit() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention_days: default_backup_retention_days(),
            backup_on_exit: default_backup_on_exit(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &VitalPaths) -> Result<Self, VitalError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VitalError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                VitalError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VitalPaths) -> Result<(), VitalError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| VitalError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| VitalError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backup_retention_days, 30);
        assert!(settings.backup_on_exit);
        assert_eq!(settings.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VitalPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            backup_retention_days: 7,
            backup_on_exit: false,
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.backup_retention_days, 7);
        assert!(!loaded.backup_on_exit);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: Settings = serde_json::from_str(r#"{"backup_on_exit": false}"#).unwrap();
        assert_eq!(loaded.schema_version, 1);
        assert_eq!(loaded.backup_retention_days, 30);
        assert!(!loaded.backup_on_exit);
    }
}
