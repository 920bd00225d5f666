//! Service layer for VitalDesk
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, lookups, and audit logging around backups and restores.

pub mod backup;
pub mod patient;
pub mod vital;

pub use backup::BackupService;
pub use patient::PatientService;
pub use vital::VitalService;
