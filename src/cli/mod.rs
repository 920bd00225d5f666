//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod export;
pub mod patient;
pub mod vital;

pub use backup::{handle_backup_command, BackupCommands};
pub use export::{handle_export_command, ExportCommands};
pub use patient::{handle_patient_command, PatientCommands};
pub use vital::{handle_vital_command, VitalCommands};

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::PatientStatus;

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", value))
}

/// Parse a `YYYY-MM-DD HH:MM[:SS]` command-line date-time
pub fn parse_datetime_arg(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("invalid time '{}', expected YYYY-MM-DD HH:MM[:SS]", value))
}

/// Parse a patient status name
pub fn parse_status_arg(value: &str) -> Result<PatientStatus, String> {
    PatientStatus::parse(value).ok_or_else(|| {
        format!(
            "unknown status '{}', expected admitted, discharged or transferred",
            value
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_date_arg("2024-03-01"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(parse_date_arg("03/01/2024").is_err());

        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime_arg("2024-03-01 09:30"), Ok(expected));
        assert_eq!(parse_datetime_arg("2024-03-01 09:30:00"), Ok(expected));

        assert_eq!(parse_status_arg("Discharged"), Ok(PatientStatus::Discharged));
        assert!(parse_status_arg("gone").is_err());
    }
}
