//! Vital sign service

use crate::audit::EntityType;
use crate::error::{VitalError, VitalResult};
use crate::models::{PatientId, Vital};
use crate::storage::{Storage, VitalStore};

/// Service for recording and listing measurements
pub struct VitalService<'a> {
    storage: &'a Storage,
}

impl<'a> VitalService<'a> {
    /// Create a new vital service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a measurement for an existing patient
    pub fn record(&self, mut vital: Vital) -> VitalResult<Vital> {
        vital
            .validate()
            .map_err(|e| VitalError::Validation(e.to_string()))?;

        let patient = self
            .storage
            .patients
            .get(vital.patient_id)?
            .ok_or_else(|| VitalError::patient_not_found(vital.patient_id.to_string()))?;

        vital.id = self.storage.vitals.create(vital.clone())?;
        self.storage.vitals.save()?;

        self.storage.log_create(
            EntityType::Vital,
            vital.id.to_string(),
            Some(patient.name),
            &vital,
        )?;

        Ok(vital)
    }

    /// Measurements of one patient, oldest first
    pub fn list_for_patient(&self, patient_id: PatientId) -> VitalResult<Vec<Vital>> {
        self.storage.vitals.get_by_patient(patient_id)
    }

    /// Most recent measurements across all patients, newest first
    pub fn list_recent(&self, limit: usize) -> VitalResult<Vec<Vital>> {
        let mut all = self.storage.vitals.list_all()?;
        all.truncate(limit);
        Ok(all)
    }
}
