//! Audit logging system for VitalDesk
//!
//! Records patient and vital creation, store clears, backups and restores in
//! an append-only JSONL file next to the settings.
//!
//! ```rust,ignore
//! use vitaldesk::audit::{AuditEntry, AuditLogger, EntityType, Operation};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::event(
//!     Operation::Export,
//!     EntityType::Backup,
//!     "VitalDesk_Complete_Backup_20240301_090000.csv",
//!     "patients=12 vitals=480",
//! ))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
