//! Reading a report snapshot from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Error loading a report file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Decoded report text and the capture time shared by all its cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub timestamp: String,
}

/// Decode ISO-8859-1: every byte is the code point of the same value.
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Format a capture time in UTC, e.g. `2014-03-01 12:30:00.25 +0000 UTC`.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%Y-%m-%d %H:%M:%S%.f +0000 UTC")
        .to_string()
}

/// Read a Latin-1 report file; its modification time becomes the
/// snapshot timestamp.
///
/// # Errors
///
/// Returns `SourceError::Io` when the file or its metadata cannot be read.
pub fn load_report(path: impl AsRef<Path>) -> Result<Snapshot, SourceError> {
    let path = path.as_ref();
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(io_err)?;
    let bytes = fs::read(path).map_err(io_err)?;

    let snapshot = Snapshot {
        text: decode_latin1(&bytes),
        timestamp: format_timestamp(modified),
    };
    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        timestamp = %snapshot.timestamp,
        "loaded report"
    );
    Ok(snapshot)
}
