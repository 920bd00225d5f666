//! Path management for VitalDesk
//!
//! Resolves where the store, backups, exports and logs live.
//!
//! ## Path Resolution Order
//!
//! 1. `VITALDESK_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/vitaldesk`, `~/Library/Application Support/vitaldesk`,
//!    `%APPDATA%\vitaldesk\config`)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::VitalError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "VITALDESK_DATA_DIR";

/// Manages all paths used by VitalDesk
#[derive(Debug, Clone)]
pub struct VitalPaths {
    /// Base directory for all VitalDesk data
    base_dir: PathBuf,
}

impl VitalPaths {
    /// Create a new VitalPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, VitalError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create VitalPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (store files)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory; restore logs are written here as well
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the default destination of the plain list exports
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to patients.json
    pub fn patients_file(&self) -> PathBuf {
        self.data_dir().join("patients.json")
    }

    /// Get the path to vitals.json
    pub fn vitals_file(&self) -> PathBuf {
        self.data_dir().join("vitals.json")
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), VitalError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VitalError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| VitalError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| VitalError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, VitalError> {
    ProjectDirs::from("", "", "vitaldesk")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| VitalError::Config("Could not determine home directory".into()))
}
