//! Patient model
//!
//! Represents an inpatient and their admission state.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PatientId;

/// Admission state of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PatientStatus {
    /// Currently on the ward
    #[default]
    Admitted,
    /// Sent home
    Discharged,
    /// Moved to another facility
    Transferred,
}

impl PatientStatus {
    /// Parse a status from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admitted" => Some(Self::Admitted),
            "discharged" => Some(Self::Discharged),
            "transferred" => Some(Self::Transferred),
            _ => None,
        }
    }

    /// Name used in backups and listings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "Admitted",
            Self::Discharged => "Discharged",
            Self::Transferred => "Transferred",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inpatient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Store-assigned identity
    pub id: PatientId,

    /// National health insurance number; the business key
    /// (older data calls this the patient "code")
    #[serde(alias = "code")]
    pub national_health_insurance: String,

    /// Insurance card symbol
    #[serde(default)]
    pub symbol: String,

    /// Insurance card number
    #[serde(default)]
    pub number: String,

    /// Name of the insurer
    #[serde(default)]
    pub insurer_name: String,

    /// Full name
    pub name: String,

    /// Phonetic reading of the name; lists sort on this
    #[serde(default)]
    pub furigana: String,

    pub birth_date: Option<NaiveDate>,
    pub first_visit: Option<NaiveDate>,
    pub admission: Option<NaiveDate>,
    pub discharge: Option<NaiveDate>,

    #[serde(default)]
    pub status: PatientStatus,
}

impl Patient {
    /// Create a new, not yet stored, admitted patient
    pub fn new(
        national_health_insurance: impl Into<String>,
        name: impl Into<String>,
        furigana: impl Into<String>,
    ) -> Self {
        Self {
            id: PatientId::default(),
            national_health_insurance: national_health_insurance.into(),
            symbol: String::new(),
            number: String::new(),
            insurer_name: String::new(),
            name: name.into(),
            furigana: furigana.into(),
            birth_date: None,
            first_visit: None,
            admission: None,
            discharge: None,
            status: PatientStatus::Admitted,
        }
    }

    /// Age in whole calendar years at `on`, by year difference only
    pub fn age_on(&self, on: NaiveDate) -> Option<i32> {
        self.birth_date.map(|birth| on.year() - birth.year())
    }

    /// Validate the patient
    pub fn validate(&self) -> Result<(), PatientValidationError> {
        if self.national_health_insurance.trim().is_empty() {
            return Err(PatientValidationError::MissingInsuranceNumber);
        }

        if self.name.trim().is_empty() {
            return Err(PatientValidationError::EmptyName);
        }

        if self.furigana.trim().is_empty() {
            return Err(PatientValidationError::EmptyFurigana);
        }

        if let (Some(admission), Some(discharge)) = (self.admission, self.discharge) {
            if discharge < admission {
                return Err(PatientValidationError::DischargeBeforeAdmission);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.national_health_insurance)
    }
}

/// Validation errors for patients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientValidationError {
    MissingInsuranceNumber,
    EmptyName,
    EmptyFurigana,
    DischargeBeforeAdmission,
}

impl fmt::Display for PatientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInsuranceNumber => {
                write!(f, "National health insurance number is required")
            }
            Self::EmptyName => write!(f, "Patient name cannot be empty"),
            Self::EmptyFurigana => write!(f, "Furigana cannot be empty"),
            Self::DischargeBeforeAdmission => {
                write!(f, "Discharge date cannot be before the admission date")
            }
        }
    }
}

impl std::error::Error for PatientValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_defaults() {
        let patient = Patient::new("111111111", "田中太郎", "タナカタロウ");
        assert_eq!(patient.status, PatientStatus::Admitted);
        assert!(!patient.id.is_assigned());
        assert!(patient.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut patient = Patient::new("", "Name", "Kana");
        assert_eq!(
            patient.validate(),
            Err(PatientValidationError::MissingInsuranceNumber)
        );

        patient.national_health_insurance = "123".into();
        patient.furigana = "  ".into();
        assert_eq!(patient.validate(), Err(PatientValidationError::EmptyFurigana));

        patient.furigana = "Kana".into();
        patient.admission = NaiveDate::from_ymd_opt(2024, 3, 10);
        patient.discharge = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(
            patient.validate(),
            Err(PatientValidationError::DischargeBeforeAdmission)
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PatientStatus::parse("Discharged"), Some(PatientStatus::Discharged));
        assert_eq!(PatientStatus::parse(" transferred "), Some(PatientStatus::Transferred));
        assert_eq!(PatientStatus::parse(""), None);
        assert_eq!(PatientStatus::Admitted.to_string(), "Admitted");
    }

    #[test]
    fn test_age_is_year_difference() {
        let mut patient = Patient::new("1", "A", "A");
        assert_eq!(patient.age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);

        patient.birth_date = NaiveDate::from_ymd_opt(1950, 12, 31);
        assert_eq!(
            patient.age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            Some(74)
        );
    }

    #[test]
    fn test_legacy_code_field_deserializes() {
        let json = r#"{"id":3,"code":"999","name":"Old","birth_date":null,
            "first_visit":null,"admission":null,"discharge":null}"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.national_health_insurance, "999");
        assert_eq!(patient.status, PatientStatus::Admitted);
        assert_eq!(patient.furigana, "");
    }
}
