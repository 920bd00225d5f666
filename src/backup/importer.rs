//! Complete backup import
//!
//! Replaces the contents of both stores with the rows of a backup file.
//! Patients get fresh identities from the store, so every measurement's
//! patient reference is translated through a map built while the patient
//! rows are read.
//!
//! The import runs in four phases: structural checks, clearing the stores,
//! scanning rows, and finalising. Structural problems are reported before
//! anything is touched. After that a restore log is always written, and the
//! stores are only committed once every row has been applied. Both tables
//! are snapshotted before they are cleared; any later failure, including a
//! failed commit, puts the snapshots back and commits them again.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{VitalError, VitalResult};
use crate::export::codec::{decode_record, split_records};
use crate::models::{Patient, PatientId, Vital};
use crate::storage::{PatientStore, TableSnapshot, VitalStore};

use super::layout::{Row, LEGACY_COLUMN_COUNT, PATIENT_TAG, VITAL_TAG};
use super::restore_log::RestoreLog;

const BOM: char = '\u{feff}';

/// What kind of entity a row restored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Patient,
    Vital,
}

/// Why a row was not read at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The row had fewer columns than even the legacy layout
    TooFewFields(usize),
}

/// Why a readable row was left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The patient row's id column is not a number
    InvalidPatientId(String),
    /// An earlier patient row in the file already used this id
    DuplicatePatientId(i64),
    /// The measurement refers to a patient not present earlier in the file
    UnknownPatient(String),
    /// The measurement's patient was in the file but could not be stored
    PatientNotRestored(i64),
}

/// Result of applying one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Imported(RowKind),
    Skipped(SkipReason),
    Dropped(DropReason),
    /// The store refused the row
    Failed(String),
    /// Unrecognised data type; carries the tag as written
    Ignored(String),
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Imported(RowKind::Patient) => write!(f, "patient restored"),
            RowOutcome::Imported(RowKind::Vital) => write!(f, "vital restored"),
            RowOutcome::Skipped(SkipReason::TooFewFields(n)) => write!(
                f,
                "skipped, {} fields (at least {} expected)",
                n, LEGACY_COLUMN_COUNT
            ),
            RowOutcome::Dropped(DropReason::InvalidPatientId(raw)) => {
                write!(f, "dropped, invalid patient id '{}'", raw)
            }
            RowOutcome::Dropped(DropReason::DuplicatePatientId(old)) => {
                write!(f, "dropped, duplicate patient id {}", old)
            }
            RowOutcome::Dropped(DropReason::UnknownPatient(raw)) => {
                write!(f, "dropped, vital for unknown patient '{}'", raw)
            }
            RowOutcome::Dropped(DropReason::PatientNotRestored(old)) => {
                write!(f, "dropped, patient {} was not restored", old)
            }
            RowOutcome::Failed(reason) => write!(f, "failed, {}", reason),
            RowOutcome::Ignored(tag) => write!(f, "ignored, unknown data type '{}'", tag),
        }
    }
}

/// Counts collected over one restore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of distinct old-to-new patient id mappings
    pub patients_restored: usize,
    pub vitals_restored: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub failed: usize,
    pub ignored: usize,
    /// Where the restore log was written, if writing it succeeded
    pub log_path: Option<PathBuf>,
}

impl RestoreReport {
    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Imported(RowKind::Patient) => self.patients_restored += 1,
            RowOutcome::Imported(RowKind::Vital) => self.vitals_restored += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
            RowOutcome::Dropped(_) => self.dropped += 1,
            RowOutcome::Failed(_) => self.failed += 1,
            RowOutcome::Ignored(_) => self.ignored += 1,
        }
    }

    /// One-line summary for display
    pub fn summary(&self) -> String {
        format!(
            "{} patients, {} vitals restored ({} skipped, {} dropped, {} failed, {} ignored)",
            self.patients_restored,
            self.vitals_restored,
            self.skipped,
            self.dropped,
            self.failed,
            self.ignored
        )
    }
}

/// Old-to-new patient identity translation for one import
#[derive(Debug, Default)]
struct IdMap {
    restored: HashMap<i64, PatientId>,
    failed: HashSet<i64>,
}

impl IdMap {
    fn seen(&self, old_id: i64) -> bool {
        self.restored.contains_key(&old_id) || self.failed.contains(&old_id)
    }
}

/// Both tables as they were before the import cleared them
struct Snapshot {
    patients: TableSnapshot<Patient>,
    vitals: TableSnapshot<Vital>,
}

/// Restores complete backups into a patient store and a vital store
pub struct BackupImporter<'a, P: PatientStore, V: VitalStore> {
    patients: &'a P,
    vitals: &'a V,
    log_dir: PathBuf,
}

impl<'a, P: PatientStore, V: VitalStore> BackupImporter<'a, P, V> {
    /// Create an importer that writes its restore logs into `log_dir`
    pub fn new(patients: &'a P, vitals: &'a V, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            patients,
            vitals,
            log_dir: log_dir.into(),
        }
    }

    /// Restore from `path` and return the number of patients restored
    pub fn import(&self, path: &Path) -> VitalResult<usize> {
        self.restore(path).map(|report| report.patients_restored)
    }

    /// Restore from `path` and return the full report
    ///
    /// # Errors
    ///
    /// `FileNotFound` and `InvalidFormat` are returned before the stores
    /// are touched and without a restore log. Any later failure is returned
    /// as `Import`, carrying the path of the restore log that describes it.
    pub fn restore(&self, path: &Path) -> VitalResult<RestoreReport> {
        if !path.exists() {
            return Err(VitalError::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)
            .map_err(|e| VitalError::Io(format!("Failed to read backup file: {}", e)))?;
        let text = text.strip_prefix(BOM).unwrap_or(&text);

        let records = split_records(text);
        if !records.iter().skip(1).any(|r| !r.trim().is_empty()) {
            return Err(VitalError::InvalidFormat(format!(
                "{} has no data rows after the header",
                path.display()
            )));
        }

        info!(path = %path.display(), records = records.len(), "restoring backup");
        let mut log = RestoreLog::begin(path, records.len());

        let result = self.snapshot().and_then(|before| {
            self.apply(&records, &mut log).map_err(|err| {
                warn!(error = %err, "restore failed, putting previous data back");
                self.roll_back(before);
                err
            })
        });

        match result {
            Ok(mut report) => {
                log.success(&report);
                report.log_path = self.write_log(log);
                info!(
                    patients = report.patients_restored,
                    vitals = report.vitals_restored,
                    skipped = report.skipped,
                    dropped = report.dropped,
                    "restore completed"
                );
                Ok(report)
            }
            Err(err) => {
                log.failure(&err);

                let log_path = self
                    .write_log(log)
                    .unwrap_or_else(|| self.log_dir.clone());
                Err(VitalError::Import {
                    message: err.to_string(),
                    log_path,
                })
            }
        }
    }

    fn apply(&self, records: &[&str], log: &mut RestoreLog) -> VitalResult<RestoreReport> {
        self.vitals.clear_all()?;
        self.patients.clear_all()?;

        let mut report = RestoreReport::default();
        let mut ids = IdMap::default();

        for (index, record) in records.iter().enumerate().skip(1) {
            if record.trim().is_empty() {
                continue;
            }

            let line = index + 1;
            let outcome = self.apply_record(record, &mut ids);
            match &outcome {
                RowOutcome::Imported(_) => {}
                RowOutcome::Ignored(_) => debug!(line, %outcome, "row ignored"),
                _ => {
                    debug!(line, %outcome, "row not restored");
                    log.line_note(line, &outcome);
                }
            }
            report.record(&outcome);
        }

        self.vitals.commit()?;
        self.patients.commit()?;

        report.patients_restored = ids.restored.len();
        Ok(report)
    }

    fn apply_record(&self, record: &str, ids: &mut IdMap) -> RowOutcome {
        let row = match Row::new(decode_record(record)) {
            Ok(row) => row,
            Err(count) => return RowOutcome::Skipped(SkipReason::TooFewFields(count)),
        };

        match row.data_type() {
            PATIENT_TAG => {
                let old_id: i64 = match row.patient_id().parse() {
                    Ok(id) => id,
                    Err(_) => {
                        return RowOutcome::Dropped(DropReason::InvalidPatientId(
                            row.patient_id().to_string(),
                        ))
                    }
                };
                // the first row with an id owns it; later ones would re-point its vitals
                if ids.seen(old_id) {
                    return RowOutcome::Dropped(DropReason::DuplicatePatientId(old_id));
                }

                match self.patients.create(row.to_patient()) {
                    Ok(new_id) => {
                        ids.restored.insert(old_id, new_id);
                        RowOutcome::Imported(RowKind::Patient)
                    }
                    Err(e) => {
                        ids.failed.insert(old_id);
                        RowOutcome::Failed(format!("patient {}: {}", old_id, e))
                    }
                }
            }
            VITAL_TAG => {
                let old_id = row.patient_id().parse::<i64>().ok();
                let new_id = match old_id.and_then(|id| ids.restored.get(&id)) {
                    Some(id) => *id,
                    None => {
                        return match old_id.filter(|id| ids.failed.contains(id)) {
                            Some(id) => RowOutcome::Dropped(DropReason::PatientNotRestored(id)),
                            None => RowOutcome::Dropped(DropReason::UnknownPatient(
                                row.patient_id().to_string(),
                            )),
                        }
                    }
                };

                match self.vitals.create(row.to_vital(new_id)) {
                    Ok(id) if id.is_assigned() => RowOutcome::Imported(RowKind::Vital),
                    Ok(id) => RowOutcome::Failed(format!("store returned vital id {}", id)),
                    Err(e) => RowOutcome::Failed(format!("vital: {}", e)),
                }
            }
            other => RowOutcome::Ignored(other.to_string()),
        }
    }

    fn snapshot(&self) -> VitalResult<Snapshot> {
        Ok(Snapshot {
            patients: self.patients.snapshot()?,
            vitals: self.vitals.snapshot()?,
        })
    }

    /// Put both tables back and make them durable again
    ///
    /// A table whose commit fails here keeps the previous contents on disk,
    /// since commits replace the file atomically.
    fn roll_back(&self, before: Snapshot) {
        let vitals = self
            .vitals
            .restore_snapshot(before.vitals)
            .and_then(|()| self.vitals.commit());
        if let Err(e) = vitals {
            warn!(error = %e, "failed to put vitals back after failed restore");
        }

        let patients = self
            .patients
            .restore_snapshot(before.patients)
            .and_then(|()| self.patients.commit());
        if let Err(e) = patients {
            warn!(error = %e, "failed to put patients back after failed restore");
        }
    }

    fn write_log(&self, log: RestoreLog) -> Option<PathBuf> {
        match log.write(&self.log_dir) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, dir = %self.log_dir.display(), "failed to write restore log");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::exporter::{render, BackupExporter};
    use crate::backup::layout::HEADER;
    use crate::export::codec::encode_record;
    use crate::models::{Patient, PatientStatus, Vital, VitalId};
    use crate::storage::{PatientRepository, VitalRepository};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::cell::Cell;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        patients: PatientRepository,
        vitals: VitalRepository,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let patients = PatientRepository::new(temp.path().join("patients.json"));
            let vitals = VitalRepository::new(temp.path().join("vitals.json"));
            Self {
                temp,
                patients,
                vitals,
            }
        }

        fn importer(&self) -> BackupImporter<'_, PatientRepository, VitalRepository> {
            BackupImporter::new(&self.patients, &self.vitals, self.log_dir())
        }

        fn log_dir(&self) -> PathBuf {
            self.temp.path().join("logs")
        }

        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.temp.path().join(name);
            fs::write(&path, contents).unwrap();
            path
        }

        fn log_files(&self) -> Vec<PathBuf> {
            match fs::read_dir(self.log_dir()) {
                Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
                Err(_) => Vec::new(),
            }
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn header() -> String {
        encode_record(HEADER)
    }

    fn patient_line(old_id: &str, name: &str) -> String {
        let mut fields = vec![String::new(); 26];
        fields[0] = "Patient".into();
        fields[1] = old_id.into();
        fields[2] = format!("NHI-{}", old_id);
        fields[6] = name.into();
        fields[7] = name.into();
        encode_record(fields)
    }

    fn vital_line(old_patient: &str, measured_at: &str, temperature: &str) -> String {
        let mut fields = vec![String::new(); 26];
        fields[0] = "Vital".into();
        fields[1] = old_patient.into();
        fields[14] = measured_at.into();
        fields[15] = temperature.into();
        encode_record(fields)
    }

    fn document(lines: &[String]) -> String {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    #[test]
    fn test_three_line_scenario() {
        let fx = Fixture::new();
        let mut patient_fields = vec![String::new(); 26];
        patient_fields[0] = "Patient".into();
        patient_fields[1] = "1".into();
        patient_fields[2] = "111111111".into();
        patient_fields[6] = "田中太郎".into();
        patient_fields[7] = "タナカタロウ".into();
        patient_fields[12] = "Admitted".into();

        let text = document(&[
            header(),
            encode_record(patient_fields),
            vital_line("1", "2024-03-01 09:00:00", "36.8"),
        ]);
        let path = fx.write("backup.csv", &text);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.patients_restored, 1);
        assert_eq!(report.vitals_restored, 1);

        let patients = fx.patients.list_all().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "田中太郎");
        assert_eq!(patients[0].status, PatientStatus::Admitted);

        let vitals = fx.vitals.list_all().unwrap();
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].patient_id, patients[0].id);
        assert_eq!(vitals[0].temperature, 36.8);
        assert_eq!(vitals[0].measured_at, at(1, 9, 0));

        let log_path = report.log_path.unwrap();
        let log = fs::read_to_string(log_path).unwrap();
        assert!(log.contains("Source file: backup.csv"));
        assert!(log.contains("Total records: 3"));
        assert!(log.contains("Patients restored: 1"));
    }

    #[test]
    fn test_ids_are_remapped() {
        let fx = Fixture::new();
        // existing data is wiped and identities restart from 1
        fx.patients.create(Patient::new("x", "Old", "old")).unwrap();

        let text = document(&[
            header(),
            patient_line("5", "Five"),
            patient_line("9", "Nine"),
            vital_line("9", "2024-03-01 09:00:00", "37.2"),
        ]);
        let path = fx.write("backup.csv", &text);

        assert_eq!(fx.importer().import(&path).unwrap(), 2);

        let nine = fx
            .patients
            .list_all()
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Nine")
            .unwrap();
        assert_eq!(nine.id, PatientId::new(2));

        let vitals = fx.vitals.list_all().unwrap();
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].patient_id, nine.id);
        assert_eq!(vitals[0].id, VitalId::new(1));
    }

    #[test]
    fn test_round_trip_through_exporter() {
        let fx = Fixture::new();
        let mut tanaka = Patient::new("111111111", "田中太郎", "タナカタロウ");
        tanaka.symbol = "A-1".into();
        tanaka.insurer_name = "Insurer, Ltd.".into();
        tanaka.birth_date = NaiveDate::from_ymd_opt(1950, 6, 15);
        tanaka.admission = NaiveDate::from_ymd_opt(2024, 2, 1);
        tanaka.status = PatientStatus::Transferred;
        let tanaka_id = fx.patients.create(tanaka).unwrap();
        let ito_id = fx.patients.create(Patient::new("222", "伊藤", "イトウ")).unwrap();

        let mut detailed = Vital::new(tanaka_id, at(1, 9, 0), 36.8);
        detailed.pulse = Some(72);
        detailed.systolic = Some(120);
        detailed.diastolic = Some(80);
        detailed.weight = Some(52.5);
        detailed.breakfast = Some("all".into());
        detailed.sleep = Some(7);
        detailed.bowel_movement = Some(1);
        detailed.note = Some("said \"fine\", slept well\nrecheck at noon".into());
        fx.vitals.create(detailed).unwrap();
        fx.vitals.create(Vital::new(ito_id, at(2, 14, 30), 37.0)).unwrap();
        fx.patients.commit().unwrap();
        fx.vitals.commit().unwrap();

        let before_patients = fx.patients.list_all().unwrap();
        let before_vitals = fx.vitals.list_all().unwrap();

        let exporter = BackupExporter::new(&fx.patients, &fx.vitals, fx.temp.path());
        let path = exporter.export().unwrap();
        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.patients_restored, 2);
        assert_eq!(report.vitals_restored, 2);
        assert_eq!(report.skipped + report.dropped + report.failed, 0);

        let strip_patient = |mut p: Patient| {
            p.id = PatientId::default();
            p
        };
        let mut after: Vec<_> = fx.patients.list_all().unwrap().into_iter().map(strip_patient).collect();
        let mut before: Vec<_> = before_patients.into_iter().map(strip_patient).collect();
        after.sort_by(|a, b| a.name.cmp(&b.name));
        before.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(after, before);

        // measurements are compared through their owner's name, since ids change
        let keyed = |vitals: Vec<Vital>, owners: &[Patient]| {
            let mut keyed: Vec<(String, Vital)> = vitals
                .into_iter()
                .map(|mut v| {
                    let owner = owners.iter().find(|p| p.id == v.patient_id).unwrap();
                    v.id = VitalId::default();
                    v.patient_id = PatientId::default();
                    (owner.name.clone(), v)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            keyed
        };
        let owners_before = vec![
            Patient { id: tanaka_id, ..Patient::new("", "田中太郎", "") },
            Patient { id: ito_id, ..Patient::new("", "伊藤", "") },
        ];
        assert_eq!(
            keyed(fx.vitals.list_all().unwrap(), &fx.patients.list_all().unwrap()),
            keyed(before_vitals, &owners_before)
        );
    }

    /// Restore one patient and one vital built from `width` columns
    fn restore_with_width(width: usize) -> (Vec<Patient>, Vec<Vital>) {
        let fx = Fixture::new();
        let mut patient = vec![String::new(); width];
        patient[0] = "Patient".into();
        patient[1] = "3".into();
        patient[2] = "333".into();
        patient[3] = "B-7".into();
        patient[5] = "City Insurer".into();
        patient[6] = "Legacy".into();
        patient[7] = "レガシー".into();
        patient[8] = "1948-11-02".into();
        patient[10] = "2024-01-10".into();
        patient[12] = "Discharged".into();
        let mut vital = vec![String::new(); width];
        vital[0] = "Vital".into();
        vital[1] = "3".into();
        vital[14] = "2024-03-01 09:00:00".into();
        vital[15] = "36.4".into();
        vital[16] = "68".into();
        vital[19] = "48.5".into();
        vital[20] = "half".into();
        vital[24] = "2".into();

        let text = document(&[header(), encode_record(patient), encode_record(vital)]);
        let path = fx.write("rows.csv", &text);
        let report = fx.importer().restore(&path).unwrap();
        assert_eq!((report.patients_restored, report.vitals_restored), (1, 1));

        let patients = fx
            .patients
            .list_all()
            .unwrap()
            .into_iter()
            .map(|mut p| {
                p.id = PatientId::default();
                p
            })
            .collect();
        let vitals = fx
            .vitals
            .list_all()
            .unwrap()
            .into_iter()
            .map(|mut v| {
                v.id = VitalId::default();
                v.patient_id = PatientId::default();
                v
            })
            .collect();
        (patients, vitals)
    }

    #[test]
    fn test_legacy_rows_match_current_rows_with_empty_note() {
        let (legacy_patients, legacy_vitals) = restore_with_width(25);
        let (patients, vitals) = restore_with_width(26);

        assert_eq!(legacy_patients, patients);
        assert_eq!(legacy_vitals, vitals);
        assert_eq!(vitals[0].note, None);
        assert_eq!(vitals[0].pulse, Some(68));
        assert_eq!(patients[0].status, PatientStatus::Discharged);
    }

    #[test]
    fn test_short_row_is_skipped_and_logged() {
        let fx = Fixture::new();
        let text = document(&[
            header(),
            patient_line("1", "A"),
            "Vital,1,2024-03-01".to_string(),
        ]);
        let path = fx.write("short.csv", &text);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.patients_restored, 1);
        assert_eq!(report.vitals_restored, 0);

        let log = fs::read_to_string(report.log_path.unwrap()).unwrap();
        assert!(log.contains("Line 3: skipped, 3 fields"));
        assert!(log.contains("Lines skipped: 1"));
    }

    #[test]
    fn test_orphan_vital_is_dropped() {
        let fx = Fixture::new();
        let text = document(&[
            header(),
            vital_line("42", "2024-03-01 09:00:00", "36.5"),
            patient_line("1", "A"),
        ]);
        let path = fx.write("orphan.csv", &text);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.dropped, 1);
        assert_eq!(report.patients_restored, 1);
        assert!(fx.vitals.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_patient_id_and_unknown_type() {
        let fx = Fixture::new();
        let mut unknown = vec![String::new(); 26];
        unknown[0] = "Medication".into();
        let text = document(&[
            header(),
            patient_line("abc", "Bad"),
            encode_record(unknown),
            patient_line("2", "Good"),
        ]);
        let path = fx.write("mixed.csv", &text);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.patients_restored, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.ignored, 1);
    }

    #[test]
    fn test_bom_and_crlf_are_tolerated() {
        let fx = Fixture::new();
        let text = format!("\u{feff}{}\r\n{}\r\n", header(), patient_line("1", "A"));
        let path = fx.write("bom.csv", &text);

        assert_eq!(fx.importer().import(&path).unwrap(), 1);
        assert_eq!(fx.patients.list_all().unwrap()[0].name, "A");
    }

    #[test]
    fn test_header_and_blank_line_is_invalid_and_untouched() {
        let fx = Fixture::new();
        fx.patients.create(Patient::new("1", "Existing", "e")).unwrap();

        let path = fx.write("empty.csv", &format!("{}\n\n", header()));
        let err = fx.importer().restore(&path).unwrap_err();

        assert!(matches!(err, VitalError::InvalidFormat(_)));
        assert_eq!(fx.patients.count().unwrap(), 1);
        assert!(fx.log_files().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let fx = Fixture::new();
        let err = fx
            .importer()
            .restore(&fx.temp.path().join("nope.csv"))
            .unwrap_err();
        assert!(matches!(err, VitalError::FileNotFound(_)));
        assert!(err.is_structural());
        assert!(fx.log_files().is_empty());
    }

    /// Patient store whose `create` fails on chosen calls and whose
    /// `commit` can be made to fail
    struct FlakyPatients {
        inner: PatientRepository,
        fail_on_call: Option<usize>,
        fail_commit: bool,
        calls: Cell<usize>,
    }

    impl PatientStore for FlakyPatients {
        fn list_all(&self) -> VitalResult<Vec<Patient>> {
            self.inner.list_all()
        }

        fn create(&self, patient: Patient) -> VitalResult<PatientId> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if Some(call) == self.fail_on_call {
                return Err(VitalError::Storage("constraint violated".into()));
            }
            self.inner.create(patient)
        }

        fn clear_all(&self) -> VitalResult<()> {
            self.inner.clear_all()
        }

        fn commit(&self) -> VitalResult<()> {
            if self.fail_commit {
                return Err(VitalError::Storage("disk full".into()));
            }
            self.inner.commit()
        }

        fn snapshot(&self) -> VitalResult<TableSnapshot<Patient>> {
            self.inner.snapshot()
        }

        fn restore_snapshot(&self, snapshot: TableSnapshot<Patient>) -> VitalResult<()> {
            self.inner.restore_snapshot(snapshot)
        }
    }

    #[test]
    fn test_failed_patient_drops_its_vitals() {
        let fx = Fixture::new();
        let patients = FlakyPatients {
            inner: PatientRepository::new(fx.temp.path().join("flaky.json")),
            fail_on_call: Some(1),
            fail_commit: false,
            calls: Cell::new(0),
        };
        let text = document(&[
            header(),
            patient_line("1", "Broken"),
            patient_line("2", "Fine"),
            vital_line("1", "2024-03-01 09:00:00", "36.5"),
            vital_line("2", "2024-03-01 09:00:00", "36.6"),
        ]);
        let path = fx.write("flaky.csv", &text);

        let importer = BackupImporter::new(&patients, &fx.vitals, fx.log_dir());
        let report = importer.restore(&path).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.patients_restored, 1);
        assert_eq!(report.vitals_restored, 1);
        assert_eq!(report.dropped, 1);

        let log = fs::read_to_string(report.log_path.unwrap()).unwrap();
        assert!(log.contains("patient 1 was not restored"));
    }

    #[test]
    fn test_commit_failure_rolls_back_and_logs() {
        let fx = Fixture::new();
        let inner = PatientRepository::new(fx.temp.path().join("flaky.json"));
        inner.create(Patient::new("0", "Before", "b")).unwrap();
        inner.commit().unwrap();

        let patients = FlakyPatients {
            inner,
            fail_on_call: None,
            fail_commit: true,
            calls: Cell::new(0),
        };
        let text = document(&[header(), patient_line("1", "After")]);
        let path = fx.write("commit.csv", &text);

        let importer = BackupImporter::new(&patients, &fx.vitals, fx.log_dir());
        let err = importer.restore(&path).unwrap_err();

        match err {
            VitalError::Import { message, log_path } => {
                assert!(message.contains("disk full"));
                let log = fs::read_to_string(log_path).unwrap();
                assert!(log.contains("Restore failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let names: Vec<_> = patients
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Before"]);
        assert_eq!(fx.log_files().len(), 1);
    }

    #[test]
    fn test_failed_patient_commit_keeps_previous_vitals() {
        let fx = Fixture::new();
        let inner = PatientRepository::new(fx.temp.path().join("flaky.json"));
        let before_id = inner.create(Patient::new("0", "Before", "b")).unwrap();
        inner.commit().unwrap();
        fx.vitals.create(Vital::new(before_id, at(1, 6, 0), 35.5)).unwrap();
        fx.vitals.commit().unwrap();

        let patients = FlakyPatients {
            inner,
            fail_on_call: None,
            fail_commit: true,
            calls: Cell::new(0),
        };
        let text = document(&[
            header(),
            patient_line("1", "After"),
            vital_line("1", "2024-03-02 09:00:00", "39.9"),
        ]);
        let path = fx.write("commit.csv", &text);

        let importer = BackupImporter::new(&patients, &fx.vitals, fx.log_dir());
        assert!(importer.restore(&path).is_err());

        let temperatures = |vitals: Vec<Vital>| -> Vec<f64> {
            vitals.into_iter().map(|v| v.temperature).collect()
        };
        assert_eq!(temperatures(fx.vitals.list_all().unwrap()), vec![35.5]);
        assert_eq!(fx.vitals.list_all().unwrap()[0].patient_id, before_id);

        // the vital file on disk was rewritten with the previous rows
        let on_disk = VitalRepository::new(fx.temp.path().join("vitals.json"));
        on_disk.load().unwrap();
        assert_eq!(temperatures(on_disk.list_all().unwrap()), vec![35.5]);

        // the patient file was never replaced
        let on_disk = PatientRepository::new(fx.temp.path().join("flaky.json"));
        on_disk.load().unwrap();
        let names: Vec<_> = on_disk.list_all().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Before"]);

        // identities continue where they were
        assert_eq!(fx.vitals.create(Vital::new(before_id, at(3, 6, 0), 36.0)).unwrap(), VitalId::new(2));
    }

    #[test]
    fn test_duplicate_patient_id_keeps_first_row() {
        let fx = Fixture::new();
        let text = document(&[
            header(),
            patient_line("5", "First"),
            patient_line("5", "Second"),
            vital_line("5", "2024-03-01 09:00:00", "36.9"),
        ]);
        let path = fx.write("duplicate.csv", &text);

        assert_eq!(fx.importer().import(&path).unwrap(), 1);

        let patients = fx.patients.list_all().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "First");
        let vitals = fx.vitals.list_all().unwrap();
        assert_eq!(vitals.len(), 1);
        assert_eq!(vitals[0].patient_id, patients[0].id);

        let log = fx
            .log_files()
            .into_iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .next()
            .unwrap();
        assert!(log.contains("Line 3: dropped, duplicate patient id 5"));
        assert!(log.contains("Patients restored: 1"));
        assert!(log.contains("Rows dropped: 1"));
    }

    #[test]
    fn test_log_counts_records_not_physical_lines() {
        let fx = Fixture::new();
        let mut vital = vec![String::new(); 26];
        vital[0] = "Vital".into();
        vital[1] = "1".into();
        vital[14] = "2024-03-01 09:00:00".into();
        vital[15] = "36.5".into();
        vital[25] = "first line\nsecond line".into();
        let text = document(&[header(), patient_line("1", "A"), encode_record(vital)]);
        let path = fx.write("multiline.csv", &text);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.vitals_restored, 1);
        assert_eq!(
            fx.vitals.list_all().unwrap()[0].note.as_deref(),
            Some("first line\nsecond line")
        );

        let log = fs::read_to_string(report.log_path.unwrap()).unwrap();
        assert!(log.contains("Total records: 3"));
    }

    #[test]
    fn test_render_then_restore_without_disk_export() {
        let fx = Fixture::new();
        let mut patient = Patient::new("1", "A", "a");
        patient.id = PatientId::new(77);
        let document = render(
            vec![patient],
            vec![Vital::new(PatientId::new(77), at(3, 8, 15), 36.9)],
        );
        let path = fx.write("rendered.csv", &document);

        let report = fx.importer().restore(&path).unwrap();
        assert_eq!(report.vitals_restored, 1);
        assert_eq!(
            fx.vitals.list_all().unwrap()[0].patient_id,
            PatientId::new(1)
        );
    }
}
