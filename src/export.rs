//! Downloadable snapshots of the dashboard.
//!
//! A snapshot is the [`DashboardView`] as pretty-printed JSON, gzip-compressed
//! when the target path ends in `.gz`.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use crate::dashboard::DashboardView;
use crate::error::Result;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Write `view` to `path`, creating parent directories as needed.
pub fn write_report<P: AsRef<Path>>(path: P, view: &DashboardView) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(view)?;
    let file = fs::File::create(path)?;

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(&json)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(&json)?;
        writer.flush()?;
    }

    info!(path = %path.display(), bytes = json.len(), "wrote impact report");
    Ok(())
}

/// Read a snapshot written by [`write_report`] (handles `.gz` transparently).
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<DashboardView> {
    let path = path.as_ref();
    let contents = if is_gzip(path) {
        let decoder = GzDecoder::new(BufReader::new(fs::File::open(path)?));
        let mut buf_reader = BufReader::new(decoder);
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;
        contents
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&contents)?)
}
