use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::{
    level::Level,
    message::LogRecord,
    pipeline::{LogPipeline, PipelineGuard},
};

/// Adapter that lets the standard `log` macros feed a pipeline.
pub struct PipelineLogger {
    pipeline: Arc<LogPipeline>,
}

impl PipelineLogger {
    pub fn new(pipeline: Arc<LogPipeline>) -> Self {
        Self { pipeline }
    }
}

impl Log for PipelineLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut entry = LogRecord::new(
            Level::from(record.level()),
            record.target(),
            record.args().to_string(),
        );
        if let Some(file) = record.file() {
            entry = entry.with_location(file, record.line().unwrap_or(0));
        }
        self.pipeline.save(entry);
    }

    fn flush(&self) {}
}

/// Installs the pipeline as the global `log` backend.
/// Returns a guard that shuts the pipeline down when dropped.
#[must_use = "the returned guard shuts the pipeline down; keep it alive for the logging session"]
pub fn init_global(pipeline: Arc<LogPipeline>) -> Result<PipelineGuard, SetLoggerError> {
    log::set_boxed_logger(Box::new(PipelineLogger::new(Arc::clone(&pipeline))))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(PipelineGuard::new(pipeline))
}
