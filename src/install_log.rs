//! Installation log
//!
//! An append-only sequence of timestamped lines that lives for the whole
//! session, plus the `LogView` the log tab renders from. The view is a separate
//! buffer: lines are appended to both as they arrive, and a refresh rebuilds
//! the view from the log.

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One timestamped log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveTime,
    pub message: String,
}

impl LogEntry {
    /// Stamp `message` with the current local time
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().time(),
            message: message.into(),
        }
    }

    pub fn at(timestamp: NaiveTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Ordered, append-only installation log
#[derive(Debug, Clone, Default)]
pub struct InstallLog {
    entries: Vec<LogEntry>,
}

impl InstallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        tracing::debug!(target: "install_log", "{}", entry.message);
        self.entries.push(entry);
    }

    /// Stamp and append a message, returning the stored entry
    pub fn log(&mut self, message: impl Into<String>) -> &LogEntry {
        self.push(LogEntry::now(message));
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Rendered lines, `[HH:MM:SS] message`
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Irreversible; callers confirm with the user first.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every entry, one per line, overwriting `path`
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            writeln!(writer, "{}", entry)
                .with_context(|| format!("Failed to write log file {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush log file {}", path.display()))?;
        Ok(())
    }
}

/// What the log tab currently displays
#[derive(Debug, Clone)]
pub struct LogView {
    lines: Vec<String>,
    /// Index of the first visible line
    pub scroll_offset: usize,
    /// Keep the newest line in view as lines arrive
    pub follow: bool,
    /// Number of lines the log pane can show at once
    viewport: usize,
}

impl Default for LogView {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            scroll_offset: 0,
            follow: true,
            viewport: 1,
        }
    }
}

impl LogView {
    pub fn append(&mut self, entry: &LogEntry) {
        self.lines.push(entry.to_string());
        if self.follow {
            self.scroll_to_bottom();
        }
    }

    /// Replace the view with exactly the contents of `log`
    pub fn refresh(&mut self, log: &InstallLog) {
        self.lines = log.lines();
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
        if self.follow {
            self.scroll_to_bottom();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
        self.follow = true;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    /// Tell the view how many lines are visible; called on every resize
    pub fn set_viewport(&mut self, height: usize) {
        self.viewport = height.max(1);
        if self.follow {
            self.scroll_to_bottom();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_offset());
        }
    }

    /// Offset that puts the newest line on the last visible row
    pub fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport)
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max = self.max_offset();
        self.scroll_offset = self.scroll_offset.min(max).saturating_sub(amount);
        self.follow = self.scroll_offset == max;
    }

    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.max_offset();
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max);
        self.follow = self.scroll_offset == max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_offset();
        self.follow = true;
    }
}
