//! End-to-end pipeline scenarios: fan-out copies, escalation mirroring,
//! registration barriers, shutdown safety and the fatal sequence.

use std::sync::{
    Arc, Mutex,
    mpsc::{self, Sender},
};
use std::time::Duration;

use asynclog::{
    EscalationManager, ExitDisposition, FatalRecord, Level, LogPipeline, LogRecord, Sink,
    Terminate, WorkerGone,
};

/// Test sink that stores every record it receives.
struct Recorder {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl Recorder {
    fn new() -> (Self, Arc<Mutex<Vec<LogRecord>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                records: Arc::clone(&records),
            },
            records,
        )
    }
}

impl Sink for Recorder {
    fn receive(&mut self, record: LogRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Terminator that reports the disposition and then kills the worker thread
/// by panicking, standing in for the process exit of the real one.
struct TestTerminator {
    report: Mutex<Sender<ExitDisposition>>,
}

impl Terminate for TestTerminator {
    fn terminate(&self, disposition: ExitDisposition) -> ! {
        self.report.lock().unwrap().send(disposition).unwrap();
        panic!("process terminated");
    }
}

fn escalation_dir(name: &str) -> String {
    let dir = format!("/tmp/asynclog-e2e-{}-{name}", std::process::id());
    std::fs::remove_dir_all(&dir).ok();
    dir
}

fn read_tier(dir: &str, tier: &str) -> String {
    std::fs::read_to_string(format!("{dir}/{tier}.log")).unwrap_or_default()
}

#[test]
fn save_fans_out_an_independent_copy_to_every_sink() {
    let dir = escalation_dir("fanout");
    let pipeline = LogPipeline::new(EscalationManager::open(&dir).unwrap());
    let (sink_a, records_a) = Recorder::new();
    let (sink_b, records_b) = Recorder::new();
    pipeline.add_sink(Box::new(sink_a)).unwrap();
    pipeline.add_sink(Box::new(sink_b)).unwrap();

    pipeline.save(LogRecord::new(Level::Info, "net", "hello"));
    pipeline.shutdown().unwrap();

    let got_a = records_a.lock().unwrap();
    let got_b = records_b.lock().unwrap();
    assert_eq!(got_a.len(), 1);
    assert_eq!(got_b.len(), 1);
    assert_eq!(got_a[0].message(), "hello");
    assert_eq!(got_b[0].message(), "hello");
    assert_eq!(got_a[0].module(), got_b[0].module());
    assert_eq!(got_a[0].level(), got_b[0].level());
    assert_eq!(got_a[0].timestamp(), got_b[0].timestamp());
    assert_eq!(got_a[0].thread(), got_b[0].thread());

    // Info is below the escalation threshold.
    assert_eq!(read_tier(&dir, "warning"), "");
    assert_eq!(read_tier(&dir, "error"), "");
}

#[test]
fn empty_registry_is_reported_not_fatal() {
    let dir = escalation_dir("nosinks");
    let pipeline = LogPipeline::new(EscalationManager::open(&dir).unwrap());
    pipeline.save(LogRecord::new(Level::Info, "net", "x"));
    pipeline.shutdown().unwrap();
}

#[test]
fn warning_is_mirrored_exactly_once_with_zero_sinks() {
    let dir = escalation_dir("mirror");
    let escalation = EscalationManager::open(&dir).unwrap();
    let pipeline = LogPipeline::new(Arc::clone(&escalation));

    pipeline.save(LogRecord::new(Level::Warning, "disk", "nearly full"));
    pipeline.save(LogRecord::new(Level::Error, "disk", "write failed"));
    pipeline.shutdown().unwrap();

    // Flush both tiers behind the mirrored writes before reading.
    escalation
        .log_warning(LogRecord::new(Level::Warning, "t", "marker"))
        .wait()
        .unwrap();
    escalation
        .log_error(LogRecord::new(Level::Error, "t", "marker"))
        .wait()
        .unwrap();

    let warning = read_tier(&dir, "warning");
    let error = read_tier(&dir, "error");
    assert_eq!(
        warning.matches("nearly full").count(),
        1,
        "warning tier: {warning}"
    );
    assert_eq!(
        error.matches("write failed").count(),
        1,
        "error tier: {error}"
    );
    assert!(!error.contains("nearly full"));
}

#[test]
fn add_sink_is_a_barrier() {
    let dir = escalation_dir("barrier");
    let pipeline = LogPipeline::new(EscalationManager::open(&dir).unwrap());

    // Submitted before the registration task, so it must be missed.
    pipeline.save(LogRecord::new(Level::Info, "seq", "before"));

    let (sink, records) = Recorder::new();
    pipeline.add_sink(Box::new(sink)).unwrap();

    for n in 0..20 {
        pipeline.save(LogRecord::new(Level::Info, "seq", format!("after {n}")));
    }
    pipeline.shutdown().unwrap();

    let got = records.lock().unwrap();
    assert_eq!(got.len(), 20);
    assert!(got.iter().all(|r| r.message().starts_with("after")));
    // FIFO order survives end to end.
    for (n, record) in got.iter().enumerate() {
        assert_eq!(record.message(), format!("after {n}"));
    }
}

#[test]
fn shutdown_twice_does_not_hang_or_double_deliver() {
    let dir = escalation_dir("double");
    let pipeline = LogPipeline::new(EscalationManager::open(&dir).unwrap());
    let (sink, records) = Recorder::new();
    pipeline.add_sink(Box::new(sink)).unwrap();
    pipeline.save(LogRecord::new(Level::Info, "seq", "only once"));

    pipeline.shutdown().unwrap();
    assert_eq!(pipeline.shutdown(), Err(WorkerGone));
    assert_eq!(records.lock().unwrap().len(), 1);
}

#[test]
fn post_shutdown_calls_fail_gracefully() {
    let dir = escalation_dir("late");
    let pipeline = LogPipeline::new(EscalationManager::open(&dir).unwrap());
    let (sink, records) = Recorder::new();
    pipeline.add_sink(Box::new(sink)).unwrap();
    pipeline.shutdown().unwrap();

    pipeline.save(LogRecord::new(Level::Info, "late", "dropped"));
    pipeline.fatal(FatalRecord::new("too late", Level::Fatal, 0));
    let (late_sink, _) = Recorder::new();
    assert_eq!(pipeline.add_sink(Box::new(late_sink)), Err(WorkerGone));
    assert!(records.lock().unwrap().is_empty());
}

#[test]
fn fatal_escalates_durably_then_clears_sinks_then_terminates() {
    let dir = escalation_dir("fatal");
    let escalation = EscalationManager::open(&dir).unwrap();
    let (report, observed) = mpsc::channel();
    let pipeline = LogPipeline::with_terminator(
        escalation,
        Arc::new(TestTerminator {
            report: Mutex::new(report),
        }),
    );
    let (sink, records) = Recorder::new();
    pipeline.add_sink(Box::new(sink)).unwrap();
    pipeline.save(LogRecord::new(Level::Info, "net", "still alive"));

    pipeline.fatal(FatalRecord::new("assert failed", Level::Fatal, 11));

    let disposition = observed
        .recv_timeout(Duration::from_secs(5))
        .expect("fatal task never reached the terminator");
    assert_eq!(disposition.level, Level::Fatal);
    assert_eq!(disposition.signal_id, 11);
    assert_eq!(disposition.exit_code(), 139);

    // The fatal tier was written and awaited before termination.
    let fatal = read_tier(&dir, "fatal");
    assert!(fatal.contains("assert failed"), "fatal tier: {fatal}");

    // Records queued before the fatal task were still delivered; nothing can
    // reach the sinks afterwards and no new sink can be registered.
    assert_eq!(records.lock().unwrap().len(), 1);
    pipeline.save(LogRecord::new(Level::Info, "net", "ghost"));
    let (late_sink, _) = Recorder::new();
    assert_eq!(pipeline.add_sink(Box::new(late_sink)), Err(WorkerGone));
    assert_eq!(records.lock().unwrap().len(), 1);
}

#[test]
fn log_facade_records_flow_through_the_pipeline() {
    let dir = escalation_dir("facade");
    let pipeline = Arc::new(LogPipeline::new(EscalationManager::open(&dir).unwrap()));
    let (sink, records) = Recorder::new();
    pipeline.add_sink(Box::new(sink)).unwrap();

    let guard = asynclog::init_global(Arc::clone(&pipeline)).unwrap();
    log::info!(target: "facade", "routed through the facade");
    drop(guard);

    let got = records.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].module(), "facade");
    assert_eq!(got[0].message(), "routed through the facade");
    assert_eq!(got[0].level(), Level::Info);
    assert!(got[0].location().is_some());
}
