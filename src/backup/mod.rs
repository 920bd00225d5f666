//! Complete backup and restore for VitalDesk
//!
//! A backup is a single CSV file holding every patient and every vital
//! measurement, written to the backup directory as
//! `VitalDesk_Complete_Backup_<yyyyMMdd_HHmmss>.csv`.
//!
//! # Architecture
//!
//! - `BackupExporter`: snapshots the stores into a backup file
//! - `BackupImporter`: wipes the stores and rebuilds them from a backup,
//!   giving patients fresh identities and re-pointing their measurements
//! - `BackupCatalog`: lists backups and applies the retention window
//! - `RestoreLog`: the `RestoreLog_<yyyyMMdd_HHmmss>.txt` file every
//!   restore leaves behind
//!
//! # Example
//!
//! ```rust,ignore
//! use vitaldesk::backup::{BackupExporter, BackupImporter};
//!
//! let exporter = BackupExporter::new(&storage.patients, &storage.vitals, paths.backup_dir());
//! let path = exporter.export()?;
//!
//! let importer = BackupImporter::new(&storage.patients, &storage.vitals, paths.backup_dir());
//! let report = importer.restore(&path)?;
//! println!("{}", report.summary());
//! ```

mod catalog;
mod exporter;
mod importer;
mod layout;
mod restore_log;

pub use catalog::{BackupCatalog, BackupInfo};
pub use exporter::{backup_file_name, render, BackupExporter, BACKUP_PREFIX};
pub use importer::{BackupImporter, DropReason, RestoreReport, RowKind, RowOutcome, SkipReason};
pub use layout::{COLUMN_COUNT, HEADER, LEGACY_COLUMN_COUNT};
pub use restore_log::RestoreLog;
