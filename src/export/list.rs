//! Plain list exports
//!
//! Spreadsheet-friendly lists of patients and measurements. Unlike the
//! complete backup these are one-way: they leave out the status and the
//! nursing fields and are never read back.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::{VitalError, VitalResult};
use crate::models::{Patient, Vital};

use super::codec::{encode_record, LINE_TERMINATOR};
use super::{DATETIME_FORMAT, DATE_FORMAT};

/// Header of the patient list
pub const PATIENT_LIST_HEADER: [&str; 8] = [
    "NationalHealthInsurance",
    "Name",
    "Furigana",
    "BirthDate",
    "Age",
    "FirstVisit",
    "Admission",
    "Discharge",
];

/// Header of the vital list
pub const VITAL_LIST_HEADER: [&str; 7] = [
    "PatientId",
    "MeasuredAt",
    "Temperature",
    "Pulse",
    "Systolic",
    "Diastolic",
    "Weight",
];

/// Export patients to CSV, computing ages at `reference_date`
pub fn export_patients_csv<W: Write>(
    patients: &[Patient],
    reference_date: NaiveDate,
    writer: &mut W,
) -> VitalResult<()> {
    write_line(writer, &encode_record(PATIENT_LIST_HEADER))?;

    for patient in patients {
        let record = encode_record([
            patient.national_health_insurance.clone(),
            patient.name.clone(),
            patient.furigana.clone(),
            format_date(patient.birth_date),
            patient
                .age_on(reference_date)
                .map(|age| age.to_string())
                .unwrap_or_default(),
            format_date(patient.first_visit),
            format_date(patient.admission),
            format_date(patient.discharge),
        ]);
        write_line(writer, &record)?;
    }

    Ok(())
}

/// Export measurements to CSV
pub fn export_vitals_csv<W: Write>(vitals: &[Vital], writer: &mut W) -> VitalResult<()> {
    write_line(writer, &encode_record(VITAL_LIST_HEADER))?;

    for vital in vitals {
        let record = encode_record([
            vital.patient_id.to_string(),
            vital.measured_at.format(DATETIME_FORMAT).to_string(),
            format!("{:.1}", vital.temperature),
            format_opt(vital.pulse),
            format_opt(vital.systolic),
            format_opt(vital.diastolic),
            vital.weight.map(|w| format!("{:.1}", w)).unwrap_or_default(),
        ]);
        write_line(writer, &record)?;
    }

    Ok(())
}

fn write_line<W: Write>(writer: &mut W, record: &str) -> VitalResult<()> {
    write!(writer, "{}{}", record, LINE_TERMINATOR).map_err(|e| VitalError::Export(e.to_string()))
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn format_opt(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
