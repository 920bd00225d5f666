//! Backup catalog
//!
//! Finds complete backups in the backup directory by file name and applies
//! the retention window. Restore logs share the directory but are never
//! listed or pruned.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::error::{VitalError, VitalResult};
use crate::export::FILE_TIMESTAMP_FORMAT;

use super::exporter::BACKUP_PREFIX;

/// Metadata about a backup
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    /// Local time taken from the file name
    pub created_at: NaiveDateTime,
    pub size_bytes: u64,
}

/// Lists and prunes the backups in one directory
pub struct BackupCatalog {
    backup_dir: PathBuf,
}

impl BackupCatalog {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> VitalResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backup_dir)
            .map_err(|e| VitalError::Io(format!("Failed to read backup directory: {}", e)))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| VitalError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(backups)
    }

    /// The most recent backup, if any
    pub fn latest(&self) -> VitalResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Delete backups taken more than `retention_days` before `now`
    ///
    /// Returns the paths that were removed.
    pub fn prune(&self, retention_days: u32, now: NaiveDateTime) -> VitalResult<Vec<PathBuf>> {
        let cutoff = now - Duration::days(i64::from(retention_days));
        let mut deleted = Vec::new();

        for backup in self.list_backups()? {
            if backup.created_at >= cutoff {
                continue;
            }
            fs::remove_file(&backup.path)
                .map_err(|e| VitalError::Io(format!("Failed to delete old backup: {}", e)))?;
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), retention_days, "pruned old backups");
        }
        Ok(deleted)
    }

    /// Resolve `latest`, a path, or a file name inside the backup directory
    pub fn resolve(&self, identifier: &str) -> VitalResult<PathBuf> {
        if identifier.eq_ignore_ascii_case("latest") {
            return self
                .latest()?
                .map(|info| info.path)
                .ok_or_else(|| VitalError::NotFound {
                    entity_type: "Backup",
                    identifier: "latest".into(),
                });
        }

        let as_path = PathBuf::from(identifier);
        if as_path.is_absolute() || as_path.exists() {
            return Ok(as_path);
        }

        let in_dir = self.backup_dir.join(identifier);
        if in_dir.exists() {
            return Ok(in_dir);
        }

        Err(VitalError::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        })
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let created_at = parse_backup_timestamp(&filename)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
    })
}

/// Parse the timestamp out of `VitalDesk_Complete_Backup_<ts>.csv`
fn parse_backup_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let stamp = filename.strip_prefix(BACKUP_PREFIX)?.strip_suffix(".csv")?;
    NaiveDateTime::parse_from_str(stamp, FILE_TIMESTAMP_FORMAT).ok()
}
