//! Patient service
//!
//! Validation and lookup on top of the patient repository.

use crate::audit::EntityType;
use crate::error::{VitalError, VitalResult};
use crate::models::{Patient, PatientId, PatientStatus};
use crate::storage::{PatientStore, Storage};

/// Service for patient management
pub struct PatientService<'a> {
    storage: &'a Storage,
}

impl<'a> PatientService<'a> {
    /// Create a new patient service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new patient
    ///
    /// The insurance number must be unique; the store assigns the id.
    pub fn create(&self, mut patient: Patient) -> VitalResult<Patient> {
        patient.national_health_insurance = patient.national_health_insurance.trim().to_string();
        patient.name = patient.name.trim().to_string();
        patient.furigana = patient.furigana.trim().to_string();

        patient
            .validate()
            .map_err(|e| VitalError::Validation(e.to_string()))?;

        if self
            .storage
            .patients
            .get_by_insurance_number(&patient.national_health_insurance)?
            .is_some()
        {
            return Err(VitalError::Validation(format!(
                "A patient with insurance number '{}' already exists",
                patient.national_health_insurance
            )));
        }

        patient.id = self.storage.patients.create(patient.clone())?;
        self.storage.patients.save()?;

        self.storage.log_create(
            EntityType::Patient,
            patient.id.to_string(),
            Some(patient.name.clone()),
            &patient,
        )?;

        Ok(patient)
    }

    /// Get a patient by ID
    pub fn get(&self, id: PatientId) -> VitalResult<Option<Patient>> {
        self.storage.patients.get(id)
    }

    /// Find a patient by id or insurance number
    pub fn find(&self, identifier: &str) -> VitalResult<Option<Patient>> {
        if let Some(patient) = self.storage.patients.get_by_insurance_number(identifier)? {
            return Ok(Some(patient));
        }

        match identifier.parse::<PatientId>() {
            Ok(id) => self.storage.patients.get(id),
            Err(_) => Ok(None),
        }
    }

    /// Find a patient or fail with a not-found error
    pub fn require(&self, identifier: &str) -> VitalResult<Patient> {
        self.find(identifier)?
            .ok_or_else(|| VitalError::patient_not_found(identifier))
    }

    /// List patients, optionally only those with the given status
    pub fn list(&self, status: Option<PatientStatus>) -> VitalResult<Vec<Patient>> {
        match status {
            Some(status) => self.storage.patients.get_by_status(status),
            None => self.storage.patients.get_all(),
        }
    }

    /// Change a patient's status, recording the discharge date when leaving
    pub fn set_status(
        &self,
        id: PatientId,
        status: PatientStatus,
        on: chrono::NaiveDate,
    ) -> VitalResult<Patient> {
        let mut patient = self
            .get(id)?
            .ok_or_else(|| VitalError::patient_not_found(id.to_string()))?;

        patient.status = status;
        if status != PatientStatus::Admitted && patient.discharge.is_none() {
            patient.discharge = Some(on);
        }
        patient
            .validate()
            .map_err(|e| VitalError::Validation(e.to_string()))?;

        self.storage.patients.update(patient.clone())?;
        self.storage.patients.save()?;
        Ok(patient)
    }
}
