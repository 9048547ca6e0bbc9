//! Fixed-rate periodic worker.
//!
//! Spawns a thread that invokes a tick callback at a fixed cadence. Deadlines
//! are derived from the start instant (`start + n * period`), not from tick
//! completion, so a slow tick makes the next one fire immediately instead of
//! letting the cadence drift — callers must tolerate zero or near-zero
//! elapsed time between ticks. The callback returning `false` ends the
//! worker from within; `stop()` or dropping the handle ends it from outside.
//!
//! Safety: each `Ticker` owns exactly one thread that is joined when the
//! handle is stopped or dropped, preventing thread leaks.

use crossbeam_channel as xch;
use motion_traits::clock::Clock;
use std::thread;
use std::time::Duration;

pub struct Ticker {
    stop_tx: xch::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl Ticker {
    /// Start a worker that calls `tick` once per `period`, the first call
    /// firing immediately. `tick` keeps the worker alive by returning `true`.
    pub fn spawn<C, F>(clock: C, period: Duration, mut tick: F) -> Self
    where
        C: Clock + Send + Sync + 'static,
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = xch::bounded::<()>(1);

        let join_handle = thread::spawn(move || {
            let start = clock.now();
            let mut ticks: u32 = 0;
            loop {
                let deadline = start + period * ticks;
                let wait = deadline.saturating_duration_since(clock.now());
                match stop_rx.recv_timeout(wait) {
                    Ok(()) | Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("ticker received stop signal");
                        break;
                    }
                    Err(xch::RecvTimeoutError::Timeout) => {}
                }
                if !tick() {
                    tracing::debug!("ticker stopping: tick callback ended the run");
                    break;
                }
                ticks = ticks.saturating_add(1);
            }
            tracing::trace!("ticker thread exiting cleanly");
        });

        Self {
            stop_tx,
            join_handle: Some(join_handle),
        }
    }

    /// Stop the worker and join its thread. An in-flight tick runs to
    /// completion before the thread exits.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        // The worker may already have exited on its own; a send failure just
        // means the receiver is gone.
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("ticker thread joined"),
                Err(e) => tracing::warn!(?e, "ticker thread panicked during shutdown"),
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.halt();
    }
}
