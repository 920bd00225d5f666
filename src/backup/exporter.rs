//! Complete backup export
//!
//! Snapshots both stores into one CSV: the header, every patient ordered by
//! furigana, then every measurement ordered by patient and time. Patients
//! come first so that every measurement row refers to a patient already
//! seen when the file is read back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{VitalError, VitalResult};
use crate::export::codec::{encode_record, LINE_TERMINATOR};
use crate::export::FILE_TIMESTAMP_FORMAT;
use crate::models::{Patient, Vital};
use crate::storage::{write_text_atomic, PatientStore, VitalStore};

use super::layout::{patient_row, vital_row, HEADER};

/// File name prefix of complete backups
pub const BACKUP_PREFIX: &str = "VitalDesk_Complete_Backup_";

/// File name of a backup taken at `at`
pub fn backup_file_name(at: NaiveDateTime) -> String {
    format!("{}{}.csv", BACKUP_PREFIX, at.format(FILE_TIMESTAMP_FORMAT))
}

/// Writes complete backups of a patient store and a vital store
pub struct BackupExporter<'a, P: PatientStore, V: VitalStore> {
    patients: &'a P,
    vitals: &'a V,
    backup_dir: PathBuf,
}

impl<'a, P: PatientStore, V: VitalStore> BackupExporter<'a, P, V> {
    pub fn new(patients: &'a P, vitals: &'a V, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            patients,
            vitals,
            backup_dir: backup_dir.into(),
        }
    }

    /// Write a timestamped backup into the backup directory
    ///
    /// Two exports within the same second write the same file; the later
    /// one wins.
    pub fn export(&self) -> VitalResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            VitalError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        let path = self
            .backup_dir
            .join(backup_file_name(Local::now().naive_local()));
        self.export_to(&path)?;
        Ok(path)
    }

    /// Write a backup to an explicit path
    pub fn export_to(&self, path: &Path) -> VitalResult<()> {
        let patients = self.patients.list_all()?;
        let vitals = self.vitals.list_all()?;
        let (patient_count, vital_count) = (patients.len(), vitals.len());

        let document = render(patients, vitals);
        write_text_atomic(path, &document)?;

        info!(
            path = %path.display(),
            patients = patient_count,
            vitals = vital_count,
            "backup written"
        );
        Ok(())
    }

    /// Render the backup document without touching disk
    pub fn render(&self) -> VitalResult<String> {
        Ok(render(self.patients.list_all()?, self.vitals.list_all()?))
    }
}

/// Render a backup document from the given rows
pub fn render(mut patients: Vec<Patient>, mut vitals: Vec<Vital>) -> String {
    patients.sort_by(|a, b| a.furigana.cmp(&b.furigana));
    vitals.sort_by(|a, b| {
        a.patient_id
            .cmp(&b.patient_id)
            .then(a.measured_at.cmp(&b.measured_at))
    });

    let mut document = String::new();
    push_record(&mut document, HEADER);

    for patient in &patients {
        push_record(&mut document, patient_row(patient));
    }
    for vital in &vitals {
        push_record(&mut document, vital_row(vital));
    }

    debug!(
        patients = patients.len(),
        vitals = vitals.len(),
        bytes = document.len(),
        "backup rendered"
    );
    document
}

fn push_record<I, S>(document: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    document.push_str(&encode_record(fields));
    document.push_str(LINE_TERMINATOR);
}
