//! Vital sign model
//!
//! One measurement session for a patient: temperature plus whatever else
//! the nurse recorded at the same time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{PatientId, VitalId};

/// A vital sign measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vital {
    /// Store-assigned identity
    pub id: VitalId,

    /// The patient this measurement belongs to
    pub patient_id: PatientId,

    /// When the measurement was taken (local time)
    pub measured_at: NaiveDateTime,

    /// Body temperature in °C
    pub temperature: f64,

    pub pulse: Option<i32>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,

    /// Body weight in kg
    pub weight: Option<f64>,

    /// Meal intake markers, free-form ("taken", "half", "not taken", ...)
    #[serde(default)]
    pub breakfast: Option<String>,
    #[serde(default)]
    pub lunch: Option<String>,
    #[serde(default)]
    pub dinner: Option<String>,

    /// Hours slept
    #[serde(default)]
    pub sleep: Option<i32>,

    /// Bowel movements since the last measurement
    #[serde(default)]
    pub bowel_movement: Option<i32>,

    #[serde(default)]
    pub note: Option<String>,
}

impl Vital {
    /// Create a new, not yet stored, measurement with only the required values
    pub fn new(patient_id: PatientId, measured_at: NaiveDateTime, temperature: f64) -> Self {
        Self {
            id: VitalId::default(),
            patient_id,
            measured_at,
            temperature,
            pulse: None,
            systolic: None,
            diastolic: None,
            weight: None,
            breakfast: None,
            lunch: None,
            dinner: None,
            sleep: None,
            bowel_movement: None,
            note: None,
        }
    }

    /// Blood pressure as "systolic/diastolic" when both are recorded
    pub fn blood_pressure(&self) -> Option<String> {
        match (self.systolic, self.diastolic) {
            (Some(sys), Some(dia)) => Some(format!("{}/{}", sys, dia)),
            _ => None,
        }
    }

    /// Validate the measurement
    pub fn validate(&self) -> Result<(), VitalValidationError> {
        if !self.patient_id.is_assigned() {
            return Err(VitalValidationError::MissingPatient);
        }

        if !(30.0..=45.0).contains(&self.temperature) {
            return Err(VitalValidationError::TemperatureOutOfRange(self.temperature));
        }

        if let Some(weight) = self.weight {
            if weight <= 0.0 {
                return Err(VitalValidationError::InvalidWeight(weight));
            }
        }

        Ok(())
    }
}

/// Validation errors for vital signs
#[derive(Debug, Clone, PartialEq)]
pub enum VitalValidationError {
    MissingPatient,
    TemperatureOutOfRange(f64),
    InvalidWeight(f64),
}

impl fmt::Display for VitalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPatient => write!(f, "Measurement must belong to a patient"),
            Self::TemperatureOutOfRange(t) => {
                write!(f, "Temperature {:.1} °C is outside 30.0-45.0 °C", t)
            }
            Self::InvalidWeight(w) => write!(f, "Weight must be positive, got {}", w),
        }
    }
}

impl std::error::Error for VitalValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn measured_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_vital() {
        let vital = Vital::new(PatientId::new(1), measured_at(), 36.8);
        assert!(vital.validate().is_ok());
        assert!(vital.blood_pressure().is_none());
        assert!(vital.note.is_none());
    }

    #[test]
    fn test_blood_pressure() {
        let mut vital = Vital::new(PatientId::new(1), measured_at(), 36.5);
        vital.systolic = Some(120);
        assert!(vital.blood_pressure().is_none());
        vital.diastolic = Some(80);
        assert_eq!(vital.blood_pressure().as_deref(), Some("120/80"));
    }

    #[test]
    fn test_validation() {
        let vital = Vital::new(PatientId::default(), measured_at(), 36.5);
        assert_eq!(vital.validate(), Err(VitalValidationError::MissingPatient));

        let vital = Vital::new(PatientId::new(2), measured_at(), 52.0);
        assert!(matches!(
            vital.validate(),
            Err(VitalValidationError::TemperatureOutOfRange(_))
        ));
    }
}
