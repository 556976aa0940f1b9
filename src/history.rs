//! Append-only log of questions and the commands they produced.
//!
//! Each record is assembled in memory and appended with a single write on
//! an `O_APPEND` handle, so concurrent invocations never interleave partial
//! records.

use crate::config::Config;
use crate::providers::{Clock, SystemClock};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const NO_HISTORY: &str = "No history found.";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct HistoryRecorder {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl HistoryRecorder {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(&config.history_file, Box::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record, logging and discarding any I/O failure.
    pub fn record(&self, question: &str, commands: &[String]) {
        if let Err(e) = self.append(question, commands) {
            warn!("Failed to write history: {:#}", e);
        }
    }

    /// Appends a record, reporting I/O failures to the caller.
    pub fn append(&self, question: &str, commands: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let entry = self.format_entry(question, commands);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("appending to {}", self.path.display()))?;

        info!("Recorded {} command line(s) to history", commands.len());
        Ok(())
    }

    fn format_entry(&self, question: &str, commands: &[String]) -> String {
        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let mut entry = format!("[{}] Q: {}\nCommands:\n", timestamp, question);
        for command in commands {
            entry.push_str(command);
            entry.push('\n');
        }
        entry.push('\n');
        entry
    }

    /// Prints the whole log verbatim, or a notice when there is none.
    pub fn show(&self) {
        let mut out = io::stdout();
        let _ = self.show_with_io(&mut out);
    }

    pub fn show_with_io<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.path.exists() {
            return writeln!(out, "{}", NO_HISTORY);
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => writeln!(out, "{}", content),
            Err(e) => writeln!(out, "Error reading history file: {}", e),
        }
    }
}
