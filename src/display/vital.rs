//! Vital sign display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Vital;

#[derive(Tabled)]
struct VitalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Measured")]
    measured_at: String,
    #[tabled(rename = "Temp °C")]
    temperature: String,
    #[tabled(rename = "Pulse")]
    pulse: String,
    #[tabled(rename = "BP")]
    blood_pressure: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// Format measurements as a table
pub fn format_vital_list(vitals: &[Vital]) -> String {
    if vitals.is_empty() {
        return "No vital signs recorded.".to_string();
    }

    let rows = vitals.iter().map(|v| VitalRow {
        id: v.id.to_string(),
        patient: v.patient_id.to_string(),
        measured_at: v.measured_at.format("%Y-%m-%d %H:%M").to_string(),
        temperature: format!("{:.1}", v.temperature),
        pulse: v.pulse.map(|p| p.to_string()).unwrap_or_default(),
        blood_pressure: v.blood_pressure().unwrap_or_default(),
        weight: v.weight.map(|w| format!("{:.1}", w)).unwrap_or_default(),
        note: v
            .note
            .as_deref()
            .map(|n| n.lines().next().unwrap_or_default().to_string())
            .unwrap_or_default(),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}
