//! Restore log
//!
//! A plain-text record of one import, buffered in memory and written to the
//! backup directory once the import has finished, whichever way it ended.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::VitalResult;
use crate::export::{DATETIME_FORMAT, FILE_TIMESTAMP_FORMAT};
use crate::storage::write_text_atomic;

use super::importer::RestoreReport;

/// Buffered restore log
#[derive(Debug)]
pub struct RestoreLog {
    started_at: NaiveDateTime,
    buffer: String,
}

impl RestoreLog {
    /// Start a log for `source` holding `total_records` records
    ///
    /// A record is one CSV row, header included. A quoted field spanning
    /// several physical lines still counts once.
    pub fn begin(source: &Path, total_records: usize) -> Self {
        Self::begin_at(source, total_records, Local::now().naive_local())
    }

    pub(crate) fn begin_at(source: &Path, total_records: usize, started_at: NaiveDateTime) -> Self {
        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());

        let mut buffer = String::new();
        let _ = writeln!(buffer, "Restore started: {}", started_at.format(DATETIME_FORMAT));
        let _ = writeln!(buffer, "Source file: {}", source_name);
        let _ = writeln!(buffer, "Total records: {}", total_records);
        buffer.push('\n');

        Self { started_at, buffer }
    }

    /// Note something about a single record
    pub fn line_note(&mut self, line: usize, message: impl std::fmt::Display) {
        let _ = writeln!(self.buffer, "Line {}: {}", line, message);
    }

    /// Append the success block
    pub fn success(&mut self, report: &RestoreReport) {
        let _ = writeln!(self.buffer);
        let _ = writeln!(self.buffer, "Restore completed successfully");
        let _ = writeln!(self.buffer, "Patients restored: {}", report.patients_restored);
        let _ = writeln!(self.buffer, "Vitals restored: {}", report.vitals_restored);
        let _ = writeln!(self.buffer, "Lines skipped: {}", report.skipped);
        let _ = writeln!(self.buffer, "Rows dropped: {}", report.dropped);
        let _ = writeln!(self.buffer, "Rows failed: {}", report.failed);
        let _ = writeln!(self.buffer, "Rows ignored: {}", report.ignored);
        self.finished();
    }

    /// Append the failure block
    pub fn failure(&mut self, error: &dyn std::error::Error) {
        let _ = writeln!(self.buffer);
        let _ = writeln!(self.buffer, "Restore failed");
        let _ = writeln!(self.buffer, "Error: {}", error);
        let _ = writeln!(self.buffer, "Detail: {:?}", error);
        self.finished();
    }

    fn finished(&mut self) {
        let _ = writeln!(
            self.buffer,
            "Finished: {}",
            Local::now().naive_local().format(DATETIME_FORMAT)
        );
    }

    /// File name derived from the start time
    pub fn file_name(&self) -> String {
        format!("RestoreLog_{}.txt", self.started_at.format(FILE_TIMESTAMP_FORMAT))
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Write the log into `dir`; consumes the log so it is written once
    pub fn write(self, dir: &Path) -> VitalResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        write_text_atomic(&path, &self.buffer)?;
        Ok(path)
    }
}
