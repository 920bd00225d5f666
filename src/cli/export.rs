//! CLI commands for list exports

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Subcommand;

use crate::audit::{AuditEntry, EntityType, Operation};
use crate::error::{VitalError, VitalResult};
use crate::export::{export_patients_csv, export_vitals_csv, FILE_TIMESTAMP_FORMAT};
use crate::storage::{Storage, VitalStore};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the patient list to CSV
    Patients {
        /// Output file path (defaults to Patients_<timestamp>.csv in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export all vital signs to CSV
    Vitals {
        /// Output file path (defaults to VitalSigns_<timestamp>.csv in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> VitalResult<()> {
    let now = Local::now();

    let (output, entity_type, count) = match cmd {
        ExportCommands::Patients { output } => {
            let output = output_path(storage, output, "Patients", now)?;
            let patients = storage.patients.get_all()?;
            let mut writer = create_writer(&output)?;
            export_patients_csv(&patients, now.date_naive(), &mut writer)?;
            finish(writer)?;
            (output, EntityType::Patient, patients.len())
        }
        ExportCommands::Vitals { output } => {
            let output = output_path(storage, output, "VitalSigns", now)?;
            let mut vitals = storage.vitals.list_all()?;
            vitals.sort_by(|a, b| {
                a.patient_id
                    .cmp(&b.patient_id)
                    .then(a.measured_at.cmp(&b.measured_at))
            });
            let mut writer = create_writer(&output)?;
            export_vitals_csv(&vitals, &mut writer)?;
            finish(writer)?;
            (output, EntityType::Vital, vitals.len())
        }
    };

    storage.audit().log(&AuditEntry::event(
        Operation::Export,
        entity_type,
        output.display().to_string(),
        format!("rows={}", count),
    ))?;

    println!("Exported {} row(s) to: {}", count, output.display());
    Ok(())
}

fn output_path(
    storage: &Storage,
    output: Option<PathBuf>,
    prefix: &str,
    now: chrono::DateTime<Local>,
) -> VitalResult<PathBuf> {
    if let Some(path) = output {
        return Ok(path);
    }

    let dir = storage.paths().export_dir();
    fs::create_dir_all(&dir)
        .map_err(|e| VitalError::Io(format!("Failed to create export directory: {}", e)))?;
    Ok(dir.join(format!("{}_{}.csv", prefix, now.format(FILE_TIMESTAMP_FORMAT))))
}

fn create_writer(output: &Path) -> VitalResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        VitalError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>) -> VitalResult<()> {
    writer
        .flush()
        .map_err(|e| VitalError::Export(format!("Failed to flush export: {}", e)))
}
