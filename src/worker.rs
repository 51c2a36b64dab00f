//! Worker harness (§4.7): N background producers feeding one foreground
//! consumer over a bounded channel. Used directly by batched actions and by
//! the resolver's parallel glue resolution (§4.6.1).
//!
//! The original source coordinated this with two condition variables; per
//! the redesign note in §9 this is built on `std::sync::mpsc` channels plus
//! a shared atomic cancellation flag instead -- channel closure already
//! gives workers a clean "stop" signal, so a condvar pair buys nothing here.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DEFAULT_CHANNEL_CAPACITY: usize = 10;

/// Shared stop signal: set once `wait()` is called or a caller wants to
/// abandon in-flight background work early.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `bg` across `workers` background threads and `fg` on the calling
/// thread's spawned consumer, per the two-tier scheme in §4.7.
///
/// `bg` receives the cancellation token and a worker index, and returns
/// `(Option<T>, done)`: `Some(result)` is queued for the consumer; `done =
/// true` ends that worker. `delay_ms`, when non-zero, both staggers worker
/// startup by `delay_ms * index` and makes each worker sleep `delay_ms *
/// workers` between iterations (rudimentary rate limiting per §4.7).
pub struct WorkerHarness<T: Send + 'static> {
    handles: Vec<JoinHandle<()>>,
    fg_handle: Option<JoinHandle<()>>,
    cancel: CancelToken,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Send + 'static> WorkerHarness<T> {
    pub fn spawn<B, F>(workers: usize, delay_ms: u64, bg: B, fg: F) -> Self
    where
        B: Fn(&CancelToken, usize) -> (Option<T>, bool) + Send + Sync + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx): (SyncSender<T>, Receiver<T>) = sync_channel(DEFAULT_CHANNEL_CAPACITY);
        let cancel = CancelToken::new();
        let bg = Arc::new(bg);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let tx = tx.clone();
            let cancel = cancel.clone();
            let bg = Arc::clone(&bg);
            handles.push(thread::spawn(move || {
                if delay_ms > 0 {
                    thread::sleep(Duration::from_millis(delay_ms * idx as u64));
                }
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let (result, done) = bg(&cancel, idx);
                    if let Some(r) = result {
                        if tx.send(r).is_err() {
                            break; // consumer gone
                        }
                    }
                    if done {
                        break;
                    }
                    if delay_ms > 0 {
                        thread::sleep(Duration::from_millis(delay_ms * workers as u64));
                    }
                }
            }));
        }
        drop(tx); // only the clones held by workers keep the channel open

        let mut fg = fg;
        let fg_handle = Some(thread::spawn(move || {
            for item in rx.iter() {
                fg(item);
            }
        }));

        WorkerHarness { handles, fg_handle, cancel, _marker: std::marker::PhantomData }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Blocks until every background worker has exited, then waits for the
    /// foreground consumer to drain the channel.
    pub fn wait(mut self) {
        for h in self.handles.drain(..) {
            let _ = h.join();
        }
        if let Some(h) = self.fg_handle.take() {
            let _ = h.join();
        }
    }

    /// Requests early termination: sets the cancellation flag so workers
    /// exit on their next loop check, then waits as `wait()` does.
    pub fn cancel_and_wait(self) {
        self.cancel.cancel();
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[test]
    fn harness_runs_bg_to_completion_and_drains_into_fg() {
        let counter = Arc::new(AtomicUsize::new(0));
        let produced: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let produced_clone = Arc::clone(&produced);

        let counter_clone = Arc::clone(&counter);
        let harness = WorkerHarness::spawn(
            3,
            0,
            move |_cancel, idx| {
                let n = counter_clone.fetch_add(1, Ordering::SeqCst);
                if n >= 9 {
                    (None, true)
                } else {
                    (Some(idx * 100 + n), n >= 6)
                }
            },
            move |item| produced_clone.lock().unwrap().push(item),
        );
        harness.wait();

        assert!(!produced.lock().unwrap().is_empty());
    }

    #[test]
    fn cancel_stops_workers_promptly() {
        let harness: WorkerHarness<()> = WorkerHarness::spawn(
            2,
            0,
            |_cancel, _idx| {
                thread::sleep(Duration::from_millis(5));
                (None, false)
            },
            |_: ()| {},
        );
        let token = harness.cancel_token();
        token.cancel();
        harness.wait();
    }
}
