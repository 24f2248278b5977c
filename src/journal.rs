//! Append-only conversion journal.
//!
//! One line per successful conversion, written exactly once, never rewritten
//! or re-read by this crate. The file handle is opened in append mode when a
//! batch starts and held until the [`Journal`] is dropped, so repeated
//! appends across a long interactive session never truncate earlier entries.
//! Each line is flushed immediately — a mid-batch crash loses nothing that
//! was already recorded.

use crate::error::FerryError;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One successful conversion, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub title: String,
    pub author: String,
    pub artifact: PathBuf,
}

/// Durable, append-only record of successful conversions.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Journal {
    /// Open (or create) the journal at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FerryError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| FerryError::JournalOpen {
                path: path.clone(),
                source,
            })?;

        debug!("Journal open for appending: {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// The journal file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and flush it to disk.
    ///
    /// Line shape: `[2026-02-14 09:30:12] "Dune" by Herbert -> out/Dune.epub`
    pub fn record(&mut self, entry: &LogEntry) -> Result<(), FerryError> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(
            self.writer,
            "[{stamp}] \"{}\" by {} -> {}",
            entry.title,
            entry.author,
            entry.artifact.display()
        )
        .and_then(|()| self.writer.flush())
        .map_err(|source| FerryError::JournalAppend {
            path: self.path.clone(),
            source,
        })
    }
}
