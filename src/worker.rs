use std::{
    sync::{Mutex, RwLock},
    thread::JoinHandle,
};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use thiserror::Error;

/// Returned by [`Token::wait`] when the worker was shut down before the task
/// could run. The caller must treat the task as never executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("active worker is gone; the task was never executed")]
pub struct WorkerGone;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Job {
    task: Task,
    done: Sender<()>,
}

/// Handle to one submitted task.
#[derive(Debug)]
pub struct Token {
    done: Receiver<()>,
}

impl Token {
    /// Blocks until the specific task this token belongs to has executed.
    ///
    /// Resolves `Err(WorkerGone)` if the worker was shut down first; it never
    /// blocks forever and never panics the caller.
    pub fn wait(self) -> Result<(), WorkerGone> {
        self.done.recv().map_err(|_| WorkerGone)
    }
}

/// Single-thread sequential task executor: an unbounded FIFO queue drained by
/// one dedicated background thread. Tasks run in submission order, one at a
/// time; [`ActiveWorker::submit`] never blocks the producer.
pub struct ActiveWorker {
    queue: RwLock<Option<Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ActiveWorker {
    pub fn spawn(name: &str) -> Self {
        let (queue, jobs) = unbounded::<Job>();
        let handle = std::thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                while let Ok(job) = jobs.recv() {
                    (job.task)();
                    // Fire-and-forget submitters drop their token; a closed
                    // completion channel is not an error.
                    let _ = job.done.send(());
                }
            })
            .expect("unable to spawn worker thread");
        Self {
            queue: RwLock::new(Some(queue)),
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Enqueues a task and returns immediately.
    ///
    /// After [`ActiveWorker::shutdown`] the returned token is still valid but
    /// resolves to `Err(WorkerGone)`; the task itself never runs. Producers
    /// racing a shutdown therefore never hang and never fault.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> Token {
        let (done, wait) = bounded(1);
        if let Some(queue) = self.queue.read().unwrap().as_ref() {
            // A failed send drops the job, and with it the completion sender.
            let _ = queue.send(Job {
                task: Box::new(task),
                done,
            });
        }
        Token { done: wait }
    }

    /// Stops accepting tasks, lets the thread drain everything already queued
    /// and joins it. Idempotent; also invoked on drop.
    pub fn shutdown(&self) {
        let queue = self.queue.write().unwrap().take();
        drop(queue);
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[test]
fn tasks_run_in_submission_order() {
    let worker = ActiveWorker::spawn("test-order");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut last = None;
    for i in 0..100 {
        let seen = Arc::clone(&seen);
        last = Some(worker.submit(move || seen.lock().unwrap().push(i)));
    }
    last.unwrap().wait().unwrap();
    assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
}

#[test]
fn shutdown_drains_queued_tasks() {
    let worker = ActiveWorker::spawn("test-drain");
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let counter = Arc::clone(&counter);
        worker.submit(move || {
            std::thread::sleep(Duration::from_micros(100));
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    worker.shutdown();
    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

#[test]
fn submit_after_shutdown_fails_the_token() {
    let worker = ActiveWorker::spawn("test-gone");
    worker.shutdown();
    let ran = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&ran);
    let token = worker.submit(move || {
        flag.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(token.wait(), Err(WorkerGone));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn shutdown_twice_is_harmless() {
    let worker = ActiveWorker::spawn("test-twice");
    worker.submit(|| {}).wait().unwrap();
    worker.shutdown();
    worker.shutdown();
}
