//! Backup service
//!
//! Runs backups and restores against the application's storage and records
//! them in the audit log.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::audit::{AuditEntry, EntityType, Operation};
use crate::backup::{BackupCatalog, BackupExporter, BackupImporter, RestoreReport};
use crate::error::VitalResult;
use crate::storage::{PatientRepository, Storage, VitalRepository};

/// Service for complete backups
pub struct BackupService<'a> {
    storage: &'a Storage,
}

impl<'a> BackupService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn exporter(&self) -> BackupExporter<'a, PatientRepository, VitalRepository> {
        BackupExporter::new(
            &self.storage.patients,
            &self.storage.vitals,
            self.storage.paths().backup_dir(),
        )
    }

    /// The catalog of the configured backup directory
    pub fn catalog(&self) -> BackupCatalog {
        BackupCatalog::new(self.storage.paths().backup_dir())
    }

    /// Write a timestamped backup into the backup directory
    pub fn create(&self) -> VitalResult<PathBuf> {
        let path = self.exporter().export()?;
        self.log_event(Operation::Export, &path, self.counts()?)?;
        Ok(path)
    }

    /// Write a backup to an explicit path
    pub fn create_at(&self, path: &Path) -> VitalResult<()> {
        self.exporter().export_to(path)?;
        self.log_event(Operation::Export, path, self.counts()?)
    }

    /// Replace all data with the contents of a backup
    pub fn restore(&self, path: &Path) -> VitalResult<RestoreReport> {
        let importer = BackupImporter::new(
            &self.storage.patients,
            &self.storage.vitals,
            self.storage.paths().backup_dir(),
        );
        let report = importer.restore(path)?;

        self.storage.audit().log_batch(&[
            AuditEntry::event(Operation::Clear, EntityType::Patient, "*", "restore"),
            AuditEntry::event(Operation::Clear, EntityType::Vital, "*", "restore"),
            AuditEntry::event(
                Operation::Restore,
                EntityType::Backup,
                file_name(path),
                report.summary(),
            ),
        ])?;

        Ok(report)
    }

    /// Remove backups older than `retention_days`
    pub fn prune(&self, retention_days: u32) -> VitalResult<Vec<PathBuf>> {
        self.catalog().prune(retention_days, Local::now().naive_local())
    }

    fn counts(&self) -> VitalResult<String> {
        Ok(format!(
            "patients={} vitals={}",
            self.storage.patients.count()?,
            self.storage.vitals.count()?
        ))
    }

    fn log_event(&self, operation: Operation, path: &Path, details: String) -> VitalResult<()> {
        self.storage.audit().log(&AuditEntry::event(
            operation,
            EntityType::Backup,
            file_name(path),
            details,
        ))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
