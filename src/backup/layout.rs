//! Column layout of the complete backup file
//!
//! Patients and measurements share one 26-column table. The first column
//! tells them apart; patient rows fill columns 0..=12 and measurement rows
//! fill 0..=1 plus 13..=25, leaving the rest empty.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::export::{DATETIME_FORMAT, DATE_FORMAT};
use crate::models::{Patient, PatientId, PatientStatus, Vital};

/// Header row, in column order
pub const HEADER: [&str; COLUMN_COUNT] = [
    "DataType",
    "PatientId",
    "NationalHealthInsurance",
    "Symbol",
    "Number",
    "InsurerName",
    "Name",
    "Furigana",
    "BirthDate",
    "FirstVisit",
    "Admission",
    "Discharge",
    "Status",
    "VitalId",
    "MeasuredAt",
    "Temperature",
    "Pulse",
    "Systolic",
    "Diastolic",
    "Weight",
    "Breakfast",
    "Lunch",
    "Dinner",
    "Sleep",
    "BowelMovement",
    "Note",
];

pub const COLUMN_COUNT: usize = 26;

/// Files written before the `Note` column existed
pub const LEGACY_COLUMN_COUNT: usize = 25;

pub const PATIENT_TAG: &str = "Patient";
pub const VITAL_TAG: &str = "Vital";

const DATA_TYPE: usize = 0;
const PATIENT_ID: usize = 1;
const NATIONAL_HEALTH_INSURANCE: usize = 2;
const SYMBOL: usize = 3;
const NUMBER: usize = 4;
const INSURER_NAME: usize = 5;
const NAME: usize = 6;
const FURIGANA: usize = 7;
const BIRTH_DATE: usize = 8;
const FIRST_VISIT: usize = 9;
const ADMISSION: usize = 10;
const DISCHARGE: usize = 11;
const STATUS: usize = 12;
const VITAL_ID: usize = 13;
const MEASURED_AT: usize = 14;
const TEMPERATURE: usize = 15;
const PULSE: usize = 16;
const SYSTOLIC: usize = 17;
const DIASTOLIC: usize = 18;
const WEIGHT: usize = 19;
const BREAKFAST: usize = 20;
const LUNCH: usize = 21;
const DINNER: usize = 22;
const SLEEP: usize = 23;
const BOWEL_MOVEMENT: usize = 24;
const NOTE: usize = 25;

const ALT_DATE_FORMATS: [&str; 1] = ["%Y/%m/%d"];
const ALT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Lay a patient out as a backup row
pub fn patient_row(patient: &Patient) -> Vec<String> {
    let mut row = vec![String::new(); COLUMN_COUNT];
    row[DATA_TYPE] = PATIENT_TAG.to_string();
    row[PATIENT_ID] = patient.id.to_string();
    row[NATIONAL_HEALTH_INSURANCE] = patient.national_health_insurance.clone();
    row[SYMBOL] = patient.symbol.clone();
    row[NUMBER] = patient.number.clone();
    row[INSURER_NAME] = patient.insurer_name.clone();
    row[NAME] = patient.name.clone();
    row[FURIGANA] = patient.furigana.clone();
    row[BIRTH_DATE] = format_date(patient.birth_date);
    row[FIRST_VISIT] = format_date(patient.first_visit);
    row[ADMISSION] = format_date(patient.admission);
    row[DISCHARGE] = format_date(patient.discharge);
    row[STATUS] = patient.status.as_str().to_string();
    row
}

/// Lay a measurement out as a backup row
pub fn vital_row(vital: &Vital) -> Vec<String> {
    let mut row = vec![String::new(); COLUMN_COUNT];
    row[DATA_TYPE] = VITAL_TAG.to_string();
    row[PATIENT_ID] = vital.patient_id.to_string();
    row[VITAL_ID] = vital.id.to_string();
    row[MEASURED_AT] = vital.measured_at.format(DATETIME_FORMAT).to_string();
    row[TEMPERATURE] = vital.temperature.to_string();
    row[PULSE] = format_opt(vital.pulse);
    row[SYSTOLIC] = format_opt(vital.systolic);
    row[DIASTOLIC] = format_opt(vital.diastolic);
    row[WEIGHT] = format_opt(vital.weight);
    row[BREAKFAST] = vital.breakfast.clone().unwrap_or_default();
    row[LUNCH] = vital.lunch.clone().unwrap_or_default();
    row[DINNER] = vital.dinner.clone().unwrap_or_default();
    row[SLEEP] = format_opt(vital.sleep);
    row[BOWEL_MOVEMENT] = format_opt(vital.bowel_movement);
    row[NOTE] = vital.note.clone().unwrap_or_default();
    row
}

/// A decoded row, normalised to the current column count
#[derive(Debug)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    /// Accept a decoded record, padding legacy rows that predate `Note`
    ///
    /// Returns the actual field count when the record is too short.
    pub fn new(mut fields: Vec<String>) -> Result<Self, usize> {
        match fields.len() {
            n if n < LEGACY_COLUMN_COUNT => Err(n),
            LEGACY_COLUMN_COUNT => {
                fields.push(String::new());
                Ok(Self { fields })
            }
            _ => Ok(Self { fields }),
        }
    }

    pub fn data_type(&self) -> &str {
        self.fields[DATA_TYPE].trim()
    }

    /// The patient id as written in the file
    pub fn patient_id(&self) -> &str {
        self.fields[PATIENT_ID].trim()
    }

    /// Build a patient from a patient row; the stored id is left unassigned
    pub fn to_patient(&self) -> Patient {
        Patient {
            id: PatientId::default(),
            national_health_insurance: self.text(NATIONAL_HEALTH_INSURANCE),
            symbol: self.text(SYMBOL),
            number: self.text(NUMBER),
            insurer_name: self.text(INSURER_NAME),
            name: self.text(NAME),
            furigana: self.text(FURIGANA),
            birth_date: self.date(BIRTH_DATE),
            first_visit: self.date(FIRST_VISIT),
            admission: self.date(ADMISSION),
            discharge: self.date(DISCHARGE),
            status: PatientStatus::parse(&self.fields[STATUS]).unwrap_or_default(),
        }
    }

    /// Build a measurement for `patient_id` from a vital row
    ///
    /// Unreadable values fall back: temperature to 0.0, the measurement
    /// time to now, optional values to empty.
    pub fn to_vital(&self, patient_id: PatientId) -> Vital {
        let measured_at = self
            .datetime(MEASURED_AT)
            .unwrap_or_else(|| Local::now().naive_local());
        let temperature = self.number(TEMPERATURE).unwrap_or(0.0);

        let mut vital = Vital::new(patient_id, measured_at, temperature);
        vital.pulse = self.number(PULSE);
        vital.systolic = self.number(SYSTOLIC);
        vital.diastolic = self.number(DIASTOLIC);
        vital.weight = self.number(WEIGHT);
        vital.breakfast = self.optional_text(BREAKFAST);
        vital.lunch = self.optional_text(LUNCH);
        vital.dinner = self.optional_text(DINNER);
        vital.sleep = self.number(SLEEP);
        vital.bowel_movement = self.number(BOWEL_MOVEMENT);
        vital.note = self.optional_text(NOTE);
        vital
    }

    fn text(&self, column: usize) -> String {
        self.fields[column].clone()
    }

    fn optional_text(&self, column: usize) -> Option<String> {
        Some(&self.fields[column])
            .filter(|s| !s.is_empty())
            .cloned()
    }

    fn number<T: std::str::FromStr>(&self, column: usize) -> Option<T> {
        self.fields[column].trim().parse().ok()
    }

    fn date(&self, column: usize) -> Option<NaiveDate> {
        parse_date(&self.fields[column])
    }

    fn datetime(&self, column: usize) -> Option<NaiveDateTime> {
        parse_datetime(&self.fields[column])
    }
}

/// Parse a date in the written format or one of the older ones
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    std::iter::once(DATE_FORMAT)
        .chain(ALT_DATE_FORMATS)
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse a date-time in the written format or one of the older ones
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    std::iter::once(DATETIME_FORMAT)
        .chain(ALT_DATETIME_FORMATS)
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn format_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VitalId;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_header_matches_column_constants() {
        assert_eq!(HEADER[STATUS], "Status");
        assert_eq!(HEADER[VITAL_ID], "VitalId");
        assert_eq!(HEADER[NOTE], "Note");
    }

    #[test]
    fn test_patient_row_leaves_vital_columns_empty() {
        let mut patient = Patient::new("111111111", "田中太郎", "タナカタロウ");
        patient.id = PatientId::new(5);
        patient.status = PatientStatus::Discharged;

        let row = patient_row(&patient);
        assert_eq!(row.len(), COLUMN_COUNT);
        assert_eq!(row[DATA_TYPE], "Patient");
        assert_eq!(row[PATIENT_ID], "5");
        assert_eq!(row[STATUS], "Discharged");
        assert!(row[VITAL_ID..].iter().all(String::is_empty));
    }

    #[test]
    fn test_vital_row_leaves_patient_columns_empty() {
        let mut vital = Vital::new(PatientId::new(5), at(9, 0, 0), 36.8);
        vital.id = VitalId::new(2);
        vital.weight = Some(52.5);

        let row = vital_row(&vital);
        assert_eq!(row[MEASURED_AT], "2024-03-01 09:00:00");
        assert_eq!(row[TEMPERATURE], "36.8");
        assert_eq!(row[WEIGHT], "52.5");
        assert!(row[NATIONAL_HEALTH_INSURANCE..=STATUS].iter().all(String::is_empty));
    }

    #[test]
    fn test_row_pads_legacy_and_rejects_short() {
        let legacy = Row::new(vec![String::new(); LEGACY_COLUMN_COUNT]).unwrap();
        assert_eq!(legacy.fields.len(), COLUMN_COUNT);

        assert_eq!(Row::new(vec![String::new(); 10]).unwrap_err(), 10);
    }

    #[test]
    fn test_unknown_status_defaults_to_admitted() {
        let mut fields = patient_row(&Patient::new("1", "A", "a"));
        fields[STATUS] = "Unknown".into();
        let patient = Row::new(fields).unwrap().to_patient();
        assert_eq!(patient.status, PatientStatus::Admitted);
    }

    #[test]
    fn test_bad_vital_values_fall_back() {
        let mut fields = vital_row(&Vital::new(PatientId::new(1), at(9, 0, 0), 36.5));
        fields[TEMPERATURE] = "warm".into();
        fields[PULSE] = "fast".into();
        fields[MEASURED_AT] = "yesterday".into();

        let before = Local::now().naive_local();
        let vital = Row::new(fields).unwrap().to_vital(PatientId::new(7));
        assert_eq!(vital.patient_id, PatientId::new(7));
        assert_eq!(vital.temperature, 0.0);
        assert_eq!(vital.pulse, None);
        assert!(vital.measured_at >= before);
    }

    #[test]
    fn test_alternate_date_formats() {
        assert_eq!(parse_date("2024/03/01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_datetime("2024-03-01T09:00:00"), Some(at(9, 0, 0)));
        assert_eq!(parse_datetime("2024/03/01 09:00:00"), Some(at(9, 0, 0)));
        assert_eq!(parse_datetime("2024-03-01 09:00"), Some(at(9, 0, 0)));
        assert_eq!(parse_date(""), None);
    }
}
