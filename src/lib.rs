//! # asynclog
//! Asynchronous logging pipeline: producer threads hand records to a façade,
//! a single dedicated worker thread fans them out to registered sinks in
//! strict submission order, records at Warning or above are mirrored into
//! per-tier escalation files, and a fatal event runs a guaranteed
//! flush-then-terminate sequence.
//!
//! ## Usage
//! ```rust
//! use asynclog::{EscalationManager, FileSink, Level, LogPipeline, LogRecord};
//!
//! let escalation = EscalationManager::open("/tmp/asynclog-doc1/esc").unwrap();
//! let pipeline = LogPipeline::new(escalation);
//!
//! let sink = FileSink::new("/tmp/asynclog-doc1/app.log").unwrap();
//! pipeline.add_sink(Box::new(sink)).unwrap();
//!
//! pipeline.save(LogRecord::new(Level::Info, "net", "hello"));
//! // drains every queued record before releasing the worker
//! pipeline.shutdown().unwrap();
//! ```
//!
//! ## Through the `log` facade
//! The pipeline can install itself as the global `log` backend. The returned
//! guard shuts the pipeline down when dropped.
//! ```rust
//! use std::sync::Arc;
//! use asynclog::{ConsoleSink, EscalationManager, LogPipeline};
//!
//! let escalation = EscalationManager::open("/tmp/asynclog-doc2/esc").unwrap();
//! let pipeline = Arc::new(LogPipeline::new(escalation));
//! pipeline.add_sink(Box::new(ConsoleSink)).unwrap();
//!
//! let _guard = asynclog::init_global(pipeline).unwrap();
//! log::info!("hello from the log facade");
//! log::warn!("this one is also mirrored to the warning tier");
//! ```
//!
//! ## Guarantees
//! - Tasks on a pipeline run in FIFO order on one dedicated thread; a record
//!   is delivered to every sink registered at submission time, or (only
//!   during the shutdown drain) to none — never partially.
//! - `save` never blocks on I/O; `add_sink` and `shutdown` block until their
//!   task ran and so act as synchronization barriers.
//! - A submission racing a shutdown fails its token instead of hanging.
//! - A fatal event is durably written to `fatal.log` before the sinks are
//!   evicted and the process is terminated.

mod bridge;
mod config;
mod escalation;
mod level;
mod message;
mod pipeline;
mod sink;
mod terminate;
mod worker;

pub use bridge::{PipelineLogger, init_global};
pub use config::{ASYNCLOG_CONFIG, AsyncLogConfig};
pub use escalation::{EscalationChannel, EscalationManager};
pub use level::Level;
pub use message::{FatalRecord, LogRecord};
pub use pipeline::{LogPipeline, PipelineGuard};
pub use sink::{ConsoleSink, FileSink, Sink};
pub use terminate::{DefaultTerminator, ExitDisposition, Terminate};
pub use worker::{ActiveWorker, Token, WorkerGone};
