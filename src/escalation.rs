use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    config::ASYNCLOG_CONFIG,
    level::Level,
    message::LogRecord,
    worker::{ActiveWorker, Token},
};

/// One severity tier: its own worker thread plus a single tier-named log
/// file, opened at construction and kept open for the manager's lifetime.
pub struct EscalationChannel {
    worker: ActiveWorker,
    file: Arc<Mutex<File>>,
}

impl EscalationChannel {
    fn open(dir: &Path, tier: &str) -> std::io::Result<Self> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(dir.join(format!("{tier}.log")))?;
        Ok(Self {
            worker: ActiveWorker::spawn(&format!("escalation-{tier}")),
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Queues one record for the tier file. The file is unbuffered, so once
    /// the returned token resolves the line has reached the OS; waiting on it
    /// makes the write durable against an abrupt exit right after.
    pub fn log(&self, record: LogRecord) -> Token {
        let file = Arc::clone(&self.file);
        self.worker.submit(move || {
            let mut file = file.lock().unwrap();
            writeln!(file, "{}", record.render()).unwrap();
        })
    }
}

/// Mirrors high-severity records into per-tier outputs, independent of
/// whatever sinks the main pipeline has configured.
///
/// Constructed explicitly and shared as an `Arc`; there is no hidden global
/// instance. Each tier owns a dedicated worker, so a slow escalation write on
/// one tier never delays another.
pub struct EscalationManager {
    fatal: EscalationChannel,
    error: EscalationChannel,
    warning: EscalationChannel,
}

impl EscalationManager {
    /// Opens `fatal.log`, `error.log` and `warning.log` under `dir`, creating
    /// the directory first.
    pub fn open<P: AsRef<Path>>(dir: P) -> std::io::Result<Arc<Self>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Arc::new(Self {
            fatal: EscalationChannel::open(dir, "fatal")?,
            error: EscalationChannel::open(dir, "error")?,
            warning: EscalationChannel::open(dir, "warning")?,
        }))
    }

    /// Opens under the directory named by `ASYNCLOG_ESCALATION_DIR`.
    pub fn open_default() -> std::io::Result<Arc<Self>> {
        Self::open(&ASYNCLOG_CONFIG.ESCALATION_DIR)
    }

    pub fn log_fatal(&self, record: LogRecord) -> Token {
        self.fatal.log(record)
    }

    pub fn log_error(&self, record: LogRecord) -> Token {
        self.error.log(record)
    }

    pub fn log_warning(&self, record: LogRecord) -> Token {
        self.warning.log(record)
    }

    /// Threshold routing used by `save`: Warning goes to the warning tier,
    /// anything above to the error tier. The fatal tier is reserved for the
    /// fatal shutdown path.
    pub(crate) fn escalate(&self, record: &LogRecord) {
        if record.level() >= Level::Error {
            self.log_error(record.clone());
        } else if record.level() >= Level::Warning {
            self.log_warning(record.clone());
        }
    }
}

#[cfg(test)]
fn test_dir(name: &str) -> String {
    let dir = format!("/tmp/asynclog-esc-{}-{name}", std::process::id());
    std::fs::remove_dir_all(&dir).ok();
    dir
}

#[test]
fn waited_token_means_durable_line() {
    let dir = test_dir("durable");
    let manager = EscalationManager::open(&dir).unwrap();
    let record = LogRecord::new(Level::Fatal, "core", "giving up").with_location("core.rs", 7);
    manager.log_fatal(record).wait().unwrap();
    let content = std::fs::read_to_string(format!("{dir}/fatal.log")).unwrap();
    assert!(content.contains("[core] giving up (core.rs:7)"), "{content}");
}

#[test]
fn escalate_routes_by_threshold() {
    let dir = test_dir("routing");
    let manager = EscalationManager::open(&dir).unwrap();
    manager.escalate(&LogRecord::new(Level::Warning, "m", "warn msg"));
    manager.escalate(&LogRecord::new(Level::Error, "m", "err msg"));
    manager.escalate(&LogRecord::new(Level::Fatal, "m", "fatal via save"));
    manager.escalate(&LogRecord::new(Level::Info, "m", "info msg"));

    // Tier queues are FIFO, so a waited marker proves earlier writes landed.
    manager
        .log_warning(LogRecord::new(Level::Warning, "m", "marker"))
        .wait()
        .unwrap();
    manager
        .log_error(LogRecord::new(Level::Error, "m", "marker"))
        .wait()
        .unwrap();

    let warning = std::fs::read_to_string(format!("{dir}/warning.log")).unwrap();
    let error = std::fs::read_to_string(format!("{dir}/error.log")).unwrap();
    let fatal = std::fs::read_to_string(format!("{dir}/fatal.log")).unwrap_or_default();
    assert!(warning.contains("warn msg"), "{warning}");
    assert!(!warning.contains("err msg"));
    assert!(error.contains("err msg"), "{error}");
    assert!(error.contains("fatal via save"), "{error}");
    assert!(!fatal.contains("fatal via save"));
    assert!(!warning.contains("info msg"));
    assert!(!error.contains("info msg"));
}
