// src/storage/event_journal.rs
//! File-backed event journal.
//!
//! Persists the registry's event log as JSON lines, one [`EventRecord`] per
//! line, appended in sequence order. The journal is the durable copy of the
//! log; everything else the registry holds is rebuilt from it on startup.

use crate::errors::RegistryError;
use crate::models::event::EventRecord;
use crate::utils::serialization::{deserialize, serialize};
use log::{debug, error, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Append-only JSON-lines journal of registry events.
///
/// Every line on disk is a complete record. An append that fails part-way is
/// truncated back off the file; if even that fails the journal refuses all
/// further appends.
#[derive(Debug)]
pub struct EventJournal {
    path: PathBuf,
    file: File,
    /// Length of the file up to the last durable record.
    len: u64,
    failed: bool,
}

impl EventJournal {
    /// Opens the journal at `path`, creating it if it does not exist.
    ///
    /// A trailing record without its newline is the remains of an append that
    /// never completed. It is cut off with a warning rather than rejected.
    ///
    /// # Returns
    /// The journal positioned for appending, plus every event already in it
    /// in file order.
    ///
    /// # Errors
    /// - `Journal` if the file cannot be opened, read or truncated
    /// - `Replay` if a complete line is not a valid event record
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<EventRecord>), RegistryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let complete = contents.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        if complete < contents.len() {
            warn!(
                "Discarding {} bytes of an unfinished record at the end of {}",
                contents.len() - complete,
                path.display()
            );
            file.set_len(complete as u64)?;
            file.sync_data()?;
        }

        let mut events = Vec::new();
        for (line_no, line) in contents[..complete].split(|b| *b == b'\n').enumerate() {
            let line = std::str::from_utf8(line).map_err(|e| {
                RegistryError::Replay(format!("{}:{}: {}", path.display(), line_no + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: EventRecord = deserialize(line).map_err(|e| {
                RegistryError::Replay(format!("{}:{}: {}", path.display(), line_no + 1, e))
            })?;
            events.push(record);
        }

        info!("Opened event journal {} with {} events", path.display(), events.len());
        let journal = EventJournal {
            path,
            file,
            len: complete as u64,
            failed: false,
        };
        Ok((journal, events))
    }

    /// Appends one event and flushes it to disk before returning.
    ///
    /// On error the file is left exactly as it was before the call.
    pub fn append(&mut self, record: &EventRecord) -> Result<(), RegistryError> {
        if self.failed {
            return Err(RegistryError::Journal(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is unusable after a failed rollback", self.path.display()),
            )));
        }

        let mut line = serialize(record).map_err(|e| RegistryError::Replay(e.to_string()))?;
        line.push('\n');
        if let Err(err) = self.write_line(line.as_bytes()) {
            self.roll_back();
            return Err(err.into());
        }
        self.len += line.len() as u64;

        debug!(
            "Journaled event #{} for credential {} to {}",
            record.seq,
            record.event.credential_id(),
            self.path.display()
        );
        Ok(())
    }

    fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.sync_data()
    }

    /// Truncates whatever a failed append left behind.
    fn roll_back(&mut self) {
        match self.file.set_len(self.len).and_then(|_| self.file.sync_data()) {
            Ok(()) => warn!("Rolled back a failed append to {}", self.path.display()),
            Err(err) => {
                error!(
                    "Could not roll back {}: {}; refusing further appends",
                    self.path.display(),
                    err
                );
                self.failed = true;
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }
}
