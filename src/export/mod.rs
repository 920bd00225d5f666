//! Export module for VitalDesk
//!
//! - `codec`: the CSV dialect shared by every file VitalDesk writes
//! - `list`: one-way patient and vital lists for spreadsheets
//!
//! The complete, restorable backup lives in [`crate::backup`].

pub mod codec;
pub mod list;

pub use list::{export_patients_csv, export_vitals_csv};

/// Date format used in every CSV file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time format used in every CSV file
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp embedded in generated file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
