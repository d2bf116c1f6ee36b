use std::fmt;

use chrono::{DateTime, Utc};

use crate::level::Level;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A single log record, built once at the call site and immutable afterwards.
///
/// Timestamp and thread identity are captured at construction, not at
/// delivery. `Clone` produces the independent per-sink copies handed out at
/// fan-out time, so no two sinks ever share a view of the same record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: Level,
    module: String,
    message: String,
    file: Option<String>,
    line: u32,
    timestamp: DateTime<Utc>,
    thread: String,
}

impl LogRecord {
    pub fn new(level: Level, module: impl Into<String>, message: impl Into<String>) -> Self {
        let current = std::thread::current();
        let thread = match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        };
        Self {
            level,
            module: module.into(),
            message: message.into(),
            file: None,
            line: 0,
            timestamp: Utc::now(),
            thread,
        }
    }

    /// Attaches the source location of the call site.
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn location(&self) -> Option<(&str, u32)> {
        self.file.as_deref().map(|file| (file, self.line))
    }

    /// Escalation-file line: `[<timestamp>] [<module>] <message>`, with the
    /// source location appended when one is present.
    pub fn render(&self) -> String {
        let time = self.timestamp.format(TIMESTAMP_FORMAT);
        let mut line = format!("[{time}] [{}] {}", self.module, self.message);
        if let Some((file, lineno)) = self.location() {
            line.push_str(&format!(" ({file}:{lineno})"));
        }
        line
    }
}

impl fmt::Display for LogRecord {
    /// Level-bearing form used for diagnostics and generic sinks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.timestamp.format(TIMESTAMP_FORMAT);
        write!(f, "[{time} {} {}] {}", self.level, self.module, self.message)?;
        if let Some((file, line)) = self.location() {
            write!(f, " ({file}:{line})")?;
        }
        Ok(())
    }
}

/// A fatal event: one log record plus the termination metadata the shutdown
/// sequence needs. Created exactly once per event on the detecting thread and
/// moved into the pipeline whole; the producer keeps nothing.
#[derive(Debug)]
pub struct FatalRecord {
    record: LogRecord,
    reason: String,
    level: Level,
    signal_id: i32,
}

impl FatalRecord {
    /// Builds the record for a signal- or exception-style fatal event; the
    /// reason doubles as the escalated message.
    pub fn new(reason: impl Into<String>, level: Level, signal_id: i32) -> Self {
        let reason = reason.into();
        let record = LogRecord::new(level, "fatal", reason.clone());
        Self {
            record,
            reason,
            level,
            signal_id,
        }
    }

    /// Wraps an already-built record, e.g. a crash message carrying context.
    pub fn wrap(record: LogRecord, reason: impl Into<String>, signal_id: i32) -> Self {
        let level = record.level();
        Self {
            record,
            reason: reason.into(),
            level,
            signal_id,
        }
    }

    pub fn record(&self) -> &LogRecord {
        &self.record
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn signal_id(&self) -> i32 {
        self.signal_id
    }

    pub(crate) fn into_parts(self) -> (LogRecord, String, Level, i32) {
        (self.record, self.reason, self.level, self.signal_id)
    }
}

#[test]
fn render_includes_location_when_present() {
    let record = LogRecord::new(Level::Warning, "net", "timeout").with_location("net.rs", 42);
    let line = record.render();
    assert!(line.contains("[net] timeout (net.rs:42)"), "{line}");

    let bare = LogRecord::new(Level::Info, "net", "up").render();
    assert!(bare.ends_with("[net] up"), "{bare}");
}

#[test]
fn display_carries_the_level() {
    let record = LogRecord::new(Level::Error, "db", "connection lost");
    let text = record.to_string();
    assert!(text.contains("ERROR"), "{text}");
    assert!(text.contains("connection lost"), "{text}");
}

#[test]
fn wrapped_fatal_record_keeps_the_original_level() {
    let record = LogRecord::new(Level::Error, "vm", "stack overflow in script");
    let fatal = FatalRecord::wrap(record, "unrecoverable script error", 0);
    assert_eq!(fatal.level(), Level::Error);
    assert_eq!(fatal.reason(), "unrecoverable script error");
    assert_eq!(fatal.record().message(), "stack overflow in script");
}

#[test]
fn fatal_record_embeds_the_reason() {
    let fatal = FatalRecord::new("assert failed", Level::Fatal, 11);
    assert_eq!(fatal.record().message(), "assert failed");
    assert_eq!(fatal.level(), Level::Fatal);
    assert_eq!(fatal.signal_id(), 11);
}
