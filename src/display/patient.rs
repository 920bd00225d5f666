//! Patient display formatting
//!
//! Formats patients for terminal output in table and detail views.

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Patient;

#[derive(Tabled)]
struct PatientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Insurance No.")]
    insurance: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Furigana")]
    furigana: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Admission")]
    admission: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a list of patients as a table
pub fn format_patient_list(patients: &[Patient], today: NaiveDate, date_format: &str) -> String {
    if patients.is_empty() {
        return "No patients found.".to_string();
    }

    let rows = patients.iter().map(|p| PatientRow {
        id: p.id.to_string(),
        insurance: p.national_health_insurance.clone(),
        name: p.name.clone(),
        furigana: p.furigana.clone(),
        age: p.age_on(today).map(|a| a.to_string()).unwrap_or_default(),
        admission: format_date(p.admission, date_format),
        status: p.status.to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    format!("{}\n{} patient(s)", table, patients.len())
}

/// Format a single patient's details
pub fn format_patient_details(patient: &Patient, today: NaiveDate, date_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Patient: {}\n", patient.name));
    output.push_str(&format!("  ID:             {}\n", patient.id));
    output.push_str(&format!("  Furigana:       {}\n", patient.furigana));
    output.push_str(&format!("  Insurance No.:  {}\n", patient.national_health_insurance));
    if !patient.insurer_name.is_empty() {
        output.push_str(&format!("  Insurer:        {}\n", patient.insurer_name));
    }
    if !patient.symbol.is_empty() || !patient.number.is_empty() {
        output.push_str(&format!(
            "  Card:           {} / {}\n",
            patient.symbol, patient.number
        ));
    }
    output.push_str(&format!(
        "  Birth date:     {}{}\n",
        format_date(patient.birth_date, date_format),
        patient
            .age_on(today)
            .map(|a| format!(" (age {})", a))
            .unwrap_or_default()
    ));
    output.push_str(&format!(
        "  First visit:    {}\n",
        format_date(patient.first_visit, date_format)
    ));
    output.push_str(&format!(
        "  Admission:      {}\n",
        format_date(patient.admission, date_format)
    ));
    output.push_str(&format!(
        "  Discharge:      {}\n",
        format_date(patient.discharge, date_format)
    ));
    output.push_str(&format!("  Status:         {}\n", patient.status));

    output
}

fn format_date(date: Option<NaiveDate>, date_format: &str) -> String {
    date.map(|d| d.format(date_format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_patient_list(&[], today(), "%Y-%m-%d"), "No patients found.");
    }

    #[test]
    fn test_list_contains_rows() {
        let mut patient = Patient::new("111111111", "田中太郎", "タナカタロウ");
        patient.id = PatientId::new(1);
        patient.birth_date = NaiveDate::from_ymd_opt(1950, 1, 1);

        let output = format_patient_list(&[patient], today(), "%Y-%m-%d");
        assert!(output.contains("田中太郎"));
        assert!(output.contains("74"));
        assert!(output.contains("Admitted"));
        assert!(output.ends_with("1 patient(s)"));
    }

    #[test]
    fn test_details_use_date_format() {
        let mut patient = Patient::new("1", "A", "a");
        patient.admission = NaiveDate::from_ymd_opt(2024, 2, 1);

        let output = format_patient_details(&patient, today(), "%d/%m/%Y");
        assert!(output.contains("Admission:      01/02/2024"));
        assert!(output.contains("Discharge:      -"));
    }
}
