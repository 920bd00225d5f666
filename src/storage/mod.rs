//! Storage layer for VitalDesk
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. The backup engine only sees the two store traits below, so it
//! can run against any table implementation that offers list, create and
//! clear.

pub mod file_io;
pub mod patients;
pub mod vitals;

pub use file_io::{read_json, write_json_atomic, write_text_atomic};
pub use patients::PatientRepository;
pub use vitals::VitalRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::VitalPaths;
use crate::error::VitalError;
use crate::models::{Patient, PatientId, Vital, VitalId};

/// Rows of one table together with its identity counter
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot<T> {
    pub next_id: i64,
    pub rows: Vec<T>,
}

/// Patient table as seen by the backup engine
///
/// `create`, `clear_all` and `restore_snapshot` act on the working copy;
/// `commit` makes it durable.
pub trait PatientStore {
    fn list_all(&self) -> Result<Vec<Patient>, VitalError>;
    /// Insert a patient and return the identity the store assigned to it
    fn create(&self, patient: Patient) -> Result<PatientId, VitalError>;
    /// Remove every patient and reset the identity counter
    fn clear_all(&self) -> Result<(), VitalError>;
    fn commit(&self) -> Result<(), VitalError>;
    /// Copy of the working table, identities included
    fn snapshot(&self) -> Result<TableSnapshot<Patient>, VitalError>;
    /// Replace the working table with `snapshot`, keeping its identities
    fn restore_snapshot(&self, snapshot: TableSnapshot<Patient>) -> Result<(), VitalError>;
}

/// Vital table as seen by the backup engine
pub trait VitalStore {
    fn list_all(&self) -> Result<Vec<Vital>, VitalError>;
    /// Insert a measurement and return the identity the store assigned to it
    fn create(&self, vital: Vital) -> Result<VitalId, VitalError>;
    /// Remove every measurement and reset the identity counter
    fn clear_all(&self) -> Result<(), VitalError>;
    fn commit(&self) -> Result<(), VitalError>;
    fn snapshot(&self) -> Result<TableSnapshot<Vital>, VitalError>;
    fn restore_snapshot(&self, snapshot: TableSnapshot<Vital>) -> Result<(), VitalError>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: VitalPaths,
    pub patients: PatientRepository,
    pub vitals: VitalRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: VitalPaths) -> Result<Self, VitalError> {
        paths.ensure_directories()?;

        Ok(Self {
            patients: PatientRepository::new(paths.patients_file()),
            vitals: VitalRepository::new(paths.vitals_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &VitalPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), VitalError> {
        self.patients.load()?;
        self.vitals.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), VitalError> {
        self.patients.save()?;
        self.vitals.save()?;
        Ok(())
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record the creation of an entity in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), VitalError> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }
}
