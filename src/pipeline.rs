use std::sync::{Arc, Mutex};

use crate::{
    escalation::EscalationManager,
    message::{FatalRecord, LogRecord},
    sink::Sink,
    terminate::{DefaultTerminator, ExitDisposition, Terminate},
    worker::{ActiveWorker, WorkerGone},
};

type SinkRegistry = Mutex<Vec<Box<dyn Sink + Send>>>;

/// Public entry point of the pipeline.
///
/// Owns the sink registry and one [`ActiveWorker`]; every mutation of the
/// registry happens as a task on that worker's single thread, so producers
/// never touch it directly and the queue itself is the serialization point.
/// The lock around the registry is the type-system-visible form of that
/// single-thread discipline; it is never contended.
pub struct LogPipeline {
    worker: ActiveWorker,
    sinks: Arc<SinkRegistry>,
    escalation: Arc<EscalationManager>,
    terminator: Arc<dyn Terminate>,
}

impl LogPipeline {
    pub fn new(escalation: Arc<EscalationManager>) -> Self {
        Self::with_terminator(escalation, Arc::new(DefaultTerminator))
    }

    /// Injects the termination collaborator. Tests use this to observe the
    /// fatal disposition without exiting the test process.
    pub fn with_terminator(
        escalation: Arc<EscalationManager>,
        terminator: Arc<dyn Terminate>,
    ) -> Self {
        Self {
            worker: ActiveWorker::spawn("log-pipeline"),
            sinks: Arc::new(Mutex::new(Vec::new())),
            escalation,
            terminator,
        }
    }

    /// Queues `record` for fan-out to every sink registered at this moment's
    /// queue position. Records at Warning or above are additionally mirrored
    /// to the escalation manager, synchronously on the caller's own thread
    /// before the fan-out is queued; ordering between the mirror and the
    /// primary sinks is deliberately left undefined. Never blocks on I/O.
    pub fn save(&self, record: LogRecord) {
        self.escalation.escalate(&record);
        let sinks = Arc::clone(&self.sinks);
        let _ = self.worker.submit(move || fan_out(&sinks, record));
    }

    /// Queues the terminal shutdown sequence and returns immediately. Once
    /// the task runs it never hands control back: the fatal tier is written
    /// and awaited, the registry is cleared, and the terminator ends the
    /// process.
    pub fn fatal(&self, fatal: FatalRecord) {
        let sinks = Arc::clone(&self.sinks);
        let escalation = Arc::clone(&self.escalation);
        let terminator = Arc::clone(&self.terminator);
        let _ = self.worker.submit(move || {
            let (record, reason, level, signal_id) = fatal.into_parts();
            // The fatal mirror must be durable before anything else happens;
            // the process will not survive past this task.
            let _ = escalation.log_fatal(record).wait();
            // Fan-out tasks queued before this one have already run on this
            // thread; after the clear nothing can reach the sinks anymore.
            sinks.lock().unwrap().clear();
            eprintln!("asynclog: exiting after fatal event ({level}): {reason}");
            terminator.terminate(ExitDisposition { level, signal_id });
        });
    }

    /// Registers a sink and blocks until the registration task has run on the
    /// worker. On return every subsequent `save` sees the sink, and no `save`
    /// racing this call can pass it unobserved: both are serialized through
    /// the same queue.
    pub fn add_sink(&self, sink: Box<dyn Sink + Send>) -> Result<(), WorkerGone> {
        let sinks = Arc::clone(&self.sinks);
        self.worker
            .submit(move || sinks.lock().unwrap().push(sink))
            .wait()
    }

    /// Drains everything queued so far, clears the registry and only then
    /// releases the worker, so a racing `add_sink` cannot slip in behind the
    /// clear. Idempotent; late submissions fail their token instead of
    /// running against a half-dismantled pipeline.
    pub fn shutdown(&self) -> Result<(), WorkerGone> {
        let sinks = Arc::clone(&self.sinks);
        let cleared = self
            .worker
            .submit(move || sinks.lock().unwrap().clear())
            .wait();
        self.worker.shutdown();
        cleared
    }
}

impl Drop for LogPipeline {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn fan_out(sinks: &SinkRegistry, record: LogRecord) {
    let mut sinks = sinks.lock().unwrap();
    if sinks.is_empty() {
        // Misconfiguration must be observable, not silent.
        eprintln!("asynclog: no sinks registered, message lost: [{record}]");
        return;
    }
    for sink in sinks.iter_mut() {
        sink.receive(record.clone());
    }
}

/// Shuts the pipeline down when dropped. Holding one of these is the RAII
/// form of calling [`LogPipeline::shutdown`]; omitting both loses the
/// drain-then-release ordering guarantee, which is a correctness bug and not
/// merely a leak.
pub struct PipelineGuard {
    pipeline: Arc<LogPipeline>,
}

impl PipelineGuard {
    pub fn new(pipeline: Arc<LogPipeline>) -> Self {
        Self { pipeline }
    }
}

impl Drop for PipelineGuard {
    fn drop(&mut self) {
        let _ = self.pipeline.shutdown();
    }
}
