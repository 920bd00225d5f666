//! Vital sign CLI commands

use chrono::{Local, NaiveDateTime};
use clap::Subcommand;

use crate::display::format_vital_list;
use crate::error::VitalResult;
use crate::models::Vital;
use crate::services::{PatientService, VitalService};
use crate::storage::Storage;

use super::parse_datetime_arg;

/// Vital subcommands
#[derive(Subcommand)]
pub enum VitalCommands {
    /// Record a measurement
    Add {
        /// Patient ID or insurance number
        patient: String,

        /// Body temperature in °C
        temperature: f64,

        /// Measurement time (YYYY-MM-DD HH:MM[:SS]), defaults to now
        #[arg(long, value_parser = parse_datetime_arg)]
        at: Option<NaiveDateTime>,

        #[arg(long)]
        pulse: Option<i32>,

        #[arg(long)]
        systolic: Option<i32>,

        #[arg(long)]
        diastolic: Option<i32>,

        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        breakfast: Option<String>,

        #[arg(long)]
        lunch: Option<String>,

        #[arg(long)]
        dinner: Option<String>,

        /// Hours slept
        #[arg(long)]
        sleep: Option<i32>,

        /// Bowel movements since the last measurement
        #[arg(long)]
        bowel_movement: Option<i32>,

        #[arg(short, long)]
        note: Option<String>,
    },

    /// List measurements
    List {
        /// Only this patient (ID or insurance number)
        #[arg(short, long)]
        patient: Option<String>,

        /// Number of measurements to show when listing all patients
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

impl VitalCommands {
    /// Whether the command changes stored data
    pub fn mutates(&self) -> bool {
        matches!(self, Self::Add { .. })
    }
}

/// Handle a vital command
pub fn handle_vital_command(storage: &Storage, cmd: VitalCommands) -> VitalResult<()> {
    let patients = PatientService::new(storage);
    let service = VitalService::new(storage);

    match cmd {
        VitalCommands::Add {
            patient,
            temperature,
            at,
            pulse,
            systolic,
            diastolic,
            weight,
            breakfast,
            lunch,
            dinner,
            sleep,
            bowel_movement,
            note,
        } => {
            let patient = patients.require(&patient)?;
            let measured_at = at.unwrap_or_else(|| Local::now().naive_local());

            let mut vital = Vital::new(patient.id, measured_at, temperature);
            vital.pulse = pulse;
            vital.systolic = systolic;
            vital.diastolic = diastolic;
            vital.weight = weight;
            vital.breakfast = breakfast;
            vital.lunch = lunch;
            vital.dinner = dinner;
            vital.sleep = sleep;
            vital.bowel_movement = bowel_movement;
            vital.note = note;

            let vital = service.record(vital)?;
            println!(
                "Recorded {:.1} °C for {} at {}",
                vital.temperature,
                patient.name,
                vital.measured_at.format("%Y-%m-%d %H:%M")
            );
        }

        VitalCommands::List { patient, limit } => {
            let vitals = match patient {
                Some(identifier) => {
                    let patient = patients.require(&identifier)?;
                    service.list_for_patient(patient.id)?
                }
                None => service.list_recent(limit)?,
            };
            println!("{}", format_vital_list(&vitals));
        }
    }

    Ok(())
}
