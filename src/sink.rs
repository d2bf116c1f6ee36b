use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use colored::Colorize;

use crate::{level::Level, message::LogRecord};

/// Capability a sink hands to the pipeline at registration time.
///
/// Ownership of the record transfers to the sink; the sink may process it
/// asynchronously on its own schedule but must not block the fan-out call
/// indefinitely. The pipeline never inspects a sink's internal state.
pub trait Sink {
    fn receive(&mut self, record: LogRecord);
}

/// Line-per-record file sink, flushed on every write.
pub struct FileSink {
    file: BufWriter<File>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn receive(&mut self, record: LogRecord) {
        writeln!(self.file, "{record}").unwrap();
        self.file.flush().unwrap();
    }
}

/// Stdout sink with colored level tags.
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn receive(&mut self, record: LogRecord) {
        let level = match record.level() {
            Level::Fatal => "FATAL".red().bold(),
            Level::Error => "ERROR".red(),
            Level::Warning => "WARN".yellow(),
            Level::Info => "INFO".green(),
            Level::Debug => "DEBUG".blue(),
        };
        println!("[{level}] {}", record.render());
        std::io::stdout().flush().unwrap();
    }
}

#[test]
fn file_sink_writes_one_line_per_record() {
    let path = format!("/tmp/asynclog-file-sink-{}.log", std::process::id());
    std::fs::remove_file(&path).ok();
    let mut sink = FileSink::new(&path).unwrap();
    sink.receive(LogRecord::new(Level::Info, "net", "hello"));
    sink.receive(LogRecord::new(Level::Error, "net", "broken").with_location("net.rs", 42));
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("hello"));
    assert!(content.contains("(net.rs:42)"));
}

#[test]
fn console_sink_accepts_all_levels() {
    let mut sink = ConsoleSink;
    for level in [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ] {
        sink.receive(LogRecord::new(level, "console", "tick"));
    }
}
