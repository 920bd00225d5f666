//! Core data models for VitalDesk
//!
//! Patients and the vital signs measured for them.

pub mod ids;
pub mod patient;
pub mod vital;

pub use ids::{PatientId, VitalId};
pub use patient::{Patient, PatientStatus, PatientValidationError};
pub use vital::{Vital, VitalValidationError};
