//! Saved-response data source.
//!
//! Replays a `/api/stats` response written by `botwatch --export` (or the
//! `e` key), re-reading it whenever the file is rewritten.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use botwatch_types::{AggregateBy, StatsResponse};

use super::{DataSource, SourceError};

/// Read and decode a saved stats response.
pub fn read_response(path: &Path) -> Result<StatsResponse, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| SourceError::Parse(e.to_string()))
}

/// What a file looked like when it was last read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// A data source backed by a saved stats response.
///
/// The grouping of a saved response is fixed when it is written. Asking
/// for a different one is reported through [`DataSource::error`] instead of
/// silently showing rows grouped the old way.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    stamp: Option<FileStamp>,
    saved_mode: Option<AggregateBy>,
    requested: AggregateBy,
    read_error: Option<String>,
    mode_error: Option<String>,
}

impl FileSource {
    /// Replay the response saved at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            stamp: None,
            saved_mode: None,
            requested: AggregateBy::None,
            read_error: None,
            mode_error: None,
        }
    }

    /// Path of the saved response.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Grouping recorded in the file, once it has been read.
    pub fn saved_aggregation(&self) -> Option<AggregateBy> {
        self.saved_mode
    }

    fn check_mode(&mut self) {
        self.mode_error = match self.saved_mode {
            Some(saved) if saved != self.requested => Some(format!(
                "saved response is grouped by {}, cannot regroup by {}",
                saved.label(),
                self.requested.label()
            )),
            _ => None,
        };
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<StatsResponse> {
        let stamp = FileStamp::of(&self.path);
        // A vanished file keeps the last good response on screen.
        if self.stamp.is_some() && (stamp.is_none() || stamp == self.stamp) {
            return None;
        }

        match read_response(&self.path) {
            Ok(response) => {
                self.stamp = stamp;
                self.read_error = None;
                self.saved_mode = Some(
                    response
                        .aggregated_by
                        .as_deref()
                        .map(AggregateBy::parse)
                        .unwrap_or_default(),
                );
                self.check_mode();
                Some(response)
            }
            Err(e) => {
                self.read_error = Some(e.to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.read_error.as_deref().or(self.mode_error.as_deref())
    }

    fn set_aggregation(&mut self, mode: AggregateBy) {
        self.requested = mode;
        self.check_mode();
    }

    fn refresh(&mut self) {
        self.stamp = None;
    }
}
