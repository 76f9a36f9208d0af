//! Append-only reading log on the SD card.
//!
//! On the node the card is mounted through the ESP-IDF VFS (e.g.
//! `/sdcard/river.csv`) so plain `std::fs` works on both targets. One CSV
//! line per record:
//!
//! ```text
//! <unix_secs>,<depth_mm>,sent
//! <unix_secs>,<depth_mm>,seen
//! ```
//!
//! Writes are best-effort: a missing or full card is logged once per
//! failure and never reaches the decision core.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;

use crate::app::ports::ReadingLog;
use crate::Measurement;

pub struct FileReadingLog {
    path: PathBuf,
    /// Record `seen` rows for measurements that were observed but not sent.
    record_unsent: bool,
    write_errors: u32,
}

impl FileReadingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            record_unsent: true,
            write_errors: 0,
        }
    }

    /// `false` keeps the file to transmitted readings only.
    pub fn with_unsent(mut self, record_unsent: bool) -> Self {
        self.record_unsent = record_unsent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    fn append(&mut self, value: Measurement, tag: &str) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{},{},{}", secs, value, tag));
        if let Err(e) = result {
            self.write_errors = self.write_errors.saturating_add(1);
            warn!("sd_log: write to {} failed: {}", self.path.display(), e);
        }
    }
}

impl ReadingLog for FileReadingLog {
    fn append_reading(&mut self, value: Measurement) {
        self.append(value, "sent");
    }

    fn record_measurement(&mut self, value: Measurement) {
        if self.record_unsent {
            self.append(value, "seen");
        }
    }
}
