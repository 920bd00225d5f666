//! Patient repository for JSON storage
//!
//! Manages loading and saving patients to patients.json. Identities are
//! handed out from a counter that is persisted with the table.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::VitalError;
use crate::models::{Patient, PatientId, PatientStatus};

use super::file_io::{read_json, write_json_atomic};
use super::{PatientStore, TableSnapshot};

/// Serializable patient table
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct PatientData {
    #[serde(default = "first_id")]
    next_id: i64,
    patients: Vec<Patient>,
}

fn first_id() -> i64 {
    1
}

impl Default for PatientData {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            patients: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: BTreeMap<PatientId, Patient>,
}

impl Table {
    fn empty() -> Self {
        Self {
            next_id: first_id(),
            rows: BTreeMap::new(),
        }
    }

    /// Replace the rows; never hand out an id that is already stored, even
    /// if the counter was edited
    fn fill(&mut self, next_id: i64, patients: Vec<Patient>) {
        let highest = patients.iter().map(|p| p.id.value()).max().unwrap_or(0);
        self.next_id = next_id.max(highest + 1);
        self.rows = patients.into_iter().map(|p| (p.id, p)).collect();
    }
}

/// Repository for patient persistence
pub struct PatientRepository {
    path: PathBuf,
    data: RwLock<Table>,
}

impl PatientRepository {
    /// Create a new patient repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Table::empty()),
        }
    }

    /// Load patients from disk, replacing anything held in memory
    pub fn load(&self) -> Result<(), VitalError> {
        let file_data: PatientData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.fill(file_data.next_id, file_data.patients);
        Ok(())
    }

    /// Save patients to disk
    pub fn save(&self) -> Result<(), VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = PatientData {
            next_id: data.next_id,
            patients: data.rows.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a patient by ID
    pub fn get(&self, id: PatientId) -> Result<Option<Patient>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.rows.get(&id).cloned())
    }

    /// Get all patients, ordered by furigana then name
    pub fn get_all(&self) -> Result<Vec<Patient>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut patients: Vec<_> = data.rows.values().cloned().collect();
        patients.sort_by(|a, b| a.furigana.cmp(&b.furigana).then(a.name.cmp(&b.name)));
        Ok(patients)
    }

    /// Get patients with the given status
    pub fn get_by_status(&self, status: PatientStatus) -> Result<Vec<Patient>, VitalError> {
        let all = self.get_all()?;
        Ok(all.into_iter().filter(|p| p.status == status).collect())
    }

    /// Find a patient by national health insurance number
    pub fn get_by_insurance_number(&self, number: &str) -> Result<Option<Patient>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let number = number.trim();
        Ok(data
            .rows
            .values()
            .find(|p| p.national_health_insurance == number)
            .cloned())
    }

    /// Replace a stored patient
    pub fn update(&self, patient: Patient) -> Result<bool, VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.rows.get_mut(&patient.id) {
            Some(existing) => {
                *existing = patient;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Count patients
    pub fn count(&self) -> Result<usize, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.rows.len())
    }
}

impl PatientStore for PatientRepository {
    fn list_all(&self) -> Result<Vec<Patient>, VitalError> {
        self.get_all()
    }

    fn create(&self, mut patient: Patient) -> Result<PatientId, VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = PatientId::new(data.next_id);
        data.next_id += 1;
        patient.id = id;
        data.rows.insert(id, patient);

        Ok(id)
    }

    fn clear_all(&self) -> Result<(), VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = Table::empty();
        Ok(())
    }

    fn commit(&self) -> Result<(), VitalError> {
        self.save()
    }

    fn snapshot(&self) -> Result<TableSnapshot<Patient>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(TableSnapshot {
            next_id: data.next_id,
            rows: data.rows.values().cloned().collect(),
        })
    }

    fn restore_snapshot(&self, snapshot: TableSnapshot<Patient>) -> Result<(), VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.fill(snapshot.next_id, snapshot.rows);
        Ok(())
    }
}
