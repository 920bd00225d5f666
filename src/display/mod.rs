//! Display formatting for terminal output
//!
//! Provides utilities for formatting patients and vital signs as tables
//! and detail views.

pub mod patient;
pub mod vital;

pub use patient::{format_patient_details, format_patient_list};
pub use vital::format_vital_list;
