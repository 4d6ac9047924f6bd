use crate::error::ScrapeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

/// Loads a CSV table. A missing file is an empty table, not an error, so a
/// first run and an upsert against a fresh path behave the same.
pub fn load_table<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, ScrapeError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("table {:?} does not exist, treating as empty", path);
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    tracing::info!("loaded {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Writes a CSV table, replacing the file. The destination is probed for
/// writability first: a spreadsheet left open elsewhere must surface as a
/// reported error, not a silent retry loop.
pub fn save_table<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), ScrapeError> {
    let path = path.as_ref();

    if path.exists() {
        OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|_| ScrapeError::StoreLocked(path.to_path_buf()))?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!("saved {} rows to {:?}", rows.len(), path);
    Ok(())
}
