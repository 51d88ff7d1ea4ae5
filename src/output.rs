//! Persists a finished [`Output`] as a pretty-printed JSON document.
//!
//! The document is written to a sibling temporary file and renamed into place,
//! so readers only ever see a complete file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::{FetcherError, Result};
use crate::types::Output;

pub fn write_output(path: &Path, output: &Output) -> Result<()> {
    info!("Writing {} blocks to {}", output.blocks.len(), path.display());

    let tmp_path = temporary_path(path);
    if let Err(e) = write_json(&tmp_path, output) {
        let _ = fs::remove_file(&tmp_path);
        return Err(FetcherError::output(path, e.to_string()));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FetcherError::output(path, format!("failed to move output into place: {e}"))
    })
}

pub fn read_output(path: &Path) -> Result<Output> {
    let file = File::open(path).map_err(|e| FetcherError::output(path, e.to_string()))?;
    serde_json::from_reader(file).map_err(|e| FetcherError::output(path, e.to_string()))
}

fn write_json(path: &Path, output: &Output) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, output)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
