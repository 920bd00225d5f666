//! File I/O utilities with atomic writes
//!
//! Store tables and backup documents are written through a temp file and a
//! rename, so a crash leaves either the old file or the new one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::VitalError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, VitalError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| VitalError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| VitalError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), VitalError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| VitalError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Write a whole text document atomically
pub fn write_text_atomic<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), VitalError> {
    write_atomic(path, |writer| {
        writer
            .write_all(contents.as_bytes())
            .map_err(|e| VitalError::Io(format!("Failed to write data: {}", e)))
    })
}

/// Run `fill` against a temp file next to `path`, sync it, then rename it over `path`
fn write_atomic<P, F>(path: P, fill: F) -> Result<(), VitalError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), VitalError>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VitalError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name).to_path_buf();

    let file = File::create(&temp_path)
        .map_err(|e| VitalError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    let written = fill(&mut writer).and_then(|_| {
        writer
            .flush()
            .map_err(|e| VitalError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| VitalError::Storage(format!("Failed to sync data: {}", e)))
    });

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        VitalError::Storage(format!("Failed to rename temp file: {}", e))
    })
}
