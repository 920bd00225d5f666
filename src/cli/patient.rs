//! Patient CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_patient_details, format_patient_list};
use crate::error::VitalResult;
use crate::models::{Patient, PatientStatus};
use crate::services::PatientService;
use crate::storage::Storage;

use super::{parse_date_arg, parse_status_arg};

/// Patient subcommands
#[derive(Subcommand)]
pub enum PatientCommands {
    /// Register a new patient
    Add {
        /// National health insurance number
        insurance_number: String,

        /// Full name
        name: String,

        /// Phonetic reading of the name
        #[arg(short, long)]
        furigana: String,

        /// Insurance card symbol
        #[arg(long, default_value = "")]
        symbol: String,

        /// Insurance card number
        #[arg(long, default_value = "")]
        number: String,

        /// Insurer name
        #[arg(long, default_value = "")]
        insurer: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        birth_date: Option<NaiveDate>,

        /// First visit date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        first_visit: Option<NaiveDate>,

        /// Admission date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        admission: Option<NaiveDate>,
    },

    /// List patients
    List {
        /// Only patients with this status (admitted, discharged, transferred)
        #[arg(short, long, value_parser = parse_status_arg)]
        status: Option<PatientStatus>,
    },

    /// Show a patient's details
    Show {
        /// Patient ID or insurance number
        patient: String,
    },

    /// Discharge or transfer a patient
    Discharge {
        /// Patient ID or insurance number
        patient: String,

        /// Record a transfer to another facility instead of a discharge
        #[arg(long)]
        transferred: bool,

        /// Discharge date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
}

impl PatientCommands {
    /// Whether the command changes stored data
    pub fn mutates(&self) -> bool {
        matches!(self, Self::Add { .. } | Self::Discharge { .. })
    }
}

/// Handle a patient command
pub fn handle_patient_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PatientCommands,
) -> VitalResult<()> {
    let service = PatientService::new(storage);
    let today = Local::now().date_naive();

    match cmd {
        PatientCommands::Add {
            insurance_number,
            name,
            furigana,
            symbol,
            number,
            insurer,
            birth_date,
            first_visit,
            admission,
        } => {
            let mut patient = Patient::new(insurance_number, name, furigana);
            patient.symbol = symbol;
            patient.number = number;
            patient.insurer_name = insurer;
            patient.birth_date = birth_date;
            patient.first_visit = first_visit;
            patient.admission = admission.or(Some(today));

            let patient = service.create(patient)?;
            println!("Registered patient: {} (ID: {})", patient.name, patient.id);
        }

        PatientCommands::List { status } => {
            let patients = service.list(status)?;
            println!("{}", format_patient_list(&patients, today, &settings.date_format));
        }

        PatientCommands::Show { patient } => {
            let patient = service.require(&patient)?;
            print!("{}", format_patient_details(&patient, today, &settings.date_format));
        }

        PatientCommands::Discharge {
            patient,
            transferred,
            date,
        } => {
            let patient = service.require(&patient)?;
            let status = if transferred {
                PatientStatus::Transferred
            } else {
                PatientStatus::Discharged
            };
            let updated = service.set_status(patient.id, status, date.unwrap_or(today))?;
            println!("{} is now {}", updated.name, updated.status);
        }
    }

    Ok(())
}
