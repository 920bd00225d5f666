//! Vital sign repository for JSON storage
//!
//! Manages loading and saving measurements to vitals.json

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::VitalError;
use crate::models::{PatientId, Vital, VitalId};

use super::file_io::{read_json, write_json_atomic};
use super::{TableSnapshot, VitalStore};

/// Serializable vital table
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct VitalData {
    #[serde(default = "first_id")]
    next_id: i64,
    vitals: Vec<Vital>,
}

fn first_id() -> i64 {
    1
}

impl Default for VitalData {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            vitals: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: BTreeMap<VitalId, Vital>,
}

impl Table {
    fn empty() -> Self {
        Self {
            next_id: first_id(),
            rows: BTreeMap::new(),
        }
    }

    /// Replace the rows, moving the counter past the highest stored id
    fn fill(&mut self, next_id: i64, vitals: Vec<Vital>) {
        let highest = vitals.iter().map(|v| v.id.value()).max().unwrap_or(0);
        self.next_id = next_id.max(highest + 1);
        self.rows = vitals.into_iter().map(|v| (v.id, v)).collect();
    }
}

/// Repository for vital sign persistence
pub struct VitalRepository {
    path: PathBuf,
    data: RwLock<Table>,
}

impl VitalRepository {
    /// Create a new vital repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Table::empty()),
        }
    }

    /// Load vitals from disk, replacing anything held in memory
    pub fn load(&self) -> Result<(), VitalError> {
        let file_data: VitalData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.fill(file_data.next_id, file_data.vitals);
        Ok(())
    }

    /// Save vitals to disk
    pub fn save(&self) -> Result<(), VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = VitalData {
            next_id: data.next_id,
            vitals: data.rows.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get all measurements for a patient, oldest first
    pub fn get_by_patient(&self, patient_id: PatientId) -> Result<Vec<Vital>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut vitals: Vec<_> = data
            .rows
            .values()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect();
        vitals.sort_by_key(|v| v.measured_at);
        Ok(vitals)
    }

    /// Count measurements
    pub fn count(&self) -> Result<usize, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.rows.len())
    }
}

impl VitalStore for VitalRepository {
    /// All measurements, newest first
    fn list_all(&self) -> Result<Vec<Vital>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut vitals: Vec<_> = data.rows.values().cloned().collect();
        vitals.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));
        Ok(vitals)
    }

    fn create(&self, mut vital: Vital) -> Result<VitalId, VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = VitalId::new(data.next_id);
        data.next_id += 1;
        vital.id = id;
        data.rows.insert(id, vital);

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

    fn snapshot(&self) -> Result<TableSnapshot<Vital>, VitalError> {
        let data = self
            .data
            .read()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(TableSnapshot {
            next_id: data.next_id,
            rows: data.rows.values().cloned().collect(),
        })
    }

    fn restore_snapshot(&self, snapshot: TableSnapshot<Vital>) -> Result<(), VitalError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| VitalError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.fill(snapshot.next_id, snapshot.rows);
        Ok(())
    }
}
