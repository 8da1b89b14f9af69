//! Serial execution engine: a single-worker FIFO task queue.
//!
//! One dedicated worker thread owns a state value exclusively and runs
//! submitted jobs against it one at a time, in strict submission order. This
//! is the correctness mechanism that keeps concurrent store operations from
//! interleaving at the item level.
//!
//! The engine itself never fails: `submit` is non-blocking and always
//! returns. Failures originate inside a job and travel through that job's own
//! completion channel; if the worker is gone (after a job panic), a submitted
//! job is dropped, which closes its completion channel and the caller
//! observes the disconnect there.

use std::sync::mpsc;
use std::thread;

type Job<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

/// Single-worker FIFO executor owning a state value of type `T`.
///
/// Dropping the executor closes the queue; already-submitted jobs still
/// drain before the worker exits and is joined.
pub struct SerialExecutor<T> {
    sender: Option<mpsc::Sender<Job<T>>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> SerialExecutor<T> {
    /// Spawn the worker thread, handing it exclusive ownership of `state`.
    pub fn spawn(name: impl Into<String>, mut state: T) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job<T>>();

        let worker = thread::Builder::new().name(name.into()).spawn(move || {
            // recv yields jobs in submission order; the loop ends when every
            // sender is gone and the queue has drained.
            while let Ok(job) = receiver.recv() {
                job(&mut state);
            }
        })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Enqueue `job` and return immediately.
    ///
    /// The job runs exactly once, strictly after all previously submitted
    /// jobs have finished. Never blocks and never fails; if the worker has
    /// exited, the job is dropped along with anything it captured.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Box::new(job));
        }
    }
}

impl<T> Drop for SerialExecutor<T> {
    fn drop(&mut self) {
        // Close the queue first so the worker's recv loop can end.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_run_in_submission_order() {
        let executor = SerialExecutor::spawn("test-worker", Vec::<u32>::new()).unwrap();
        let (done_tx, done_rx) = mpsc::channel();

        for i in 0..100 {
            executor.submit(move |seen: &mut Vec<u32>| seen.push(i));
        }
        executor.submit(move |seen: &mut Vec<u32>| {
            done_tx.send(seen.clone()).unwrap();
        });

        let seen = done_rx.recv().unwrap();
        assert_eq!(seen, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn test_queued_jobs_drain_on_drop() {
        let (tx, rx) = mpsc::channel();
        {
            let executor = SerialExecutor::spawn("test-worker", ()).unwrap();
            for i in 0..10 {
                let tx = tx.clone();
                executor.submit(move |_: &mut ()| {
                    tx.send(i).unwrap();
                });
            }
            // Drop joins the worker after the queue drains.
        }
        drop(tx);
        assert_eq!(rx.iter().collect::<Vec<i32>>(), (0..10).collect::<Vec<i32>>());
    }

    #[test]
    fn test_job_after_worker_panic_is_dropped_and_closes_its_channel() {
        let executor = SerialExecutor::spawn("test-worker", ()).unwrap();
        executor.submit(|_: &mut ()| panic!("worker down"));

        // FIFO order means this job sits behind the panicking one, so it can
        // never run; it is dropped when the worker dies, closing `tx`.
        let (tx, rx) = mpsc::channel::<()>();
        executor.submit(move |_: &mut ()| {
            let _ = tx.send(());
        });
        assert!(rx.recv().is_err());
    }
}
