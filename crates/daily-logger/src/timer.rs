//! Periodic rotation check for idle periods

use crate::Result;
use crate::rotation::RotationState;
use crate::supervisor::{self, SupervisedThread};
use flume::{RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Background thread that calls [`RotationState::ensure_fresh`] on a fixed
/// interval, so a file still rolls over at midnight when nothing is logged.
#[derive(Debug)]
pub struct RotationTimer {
    stop: Option<Sender<()>>,
    thread: Option<SupervisedThread>,
}

impl RotationTimer {
    /// Start checking `state` every `interval`
    pub fn start(
        state: Arc<RotationState>,
        interval: Duration,
        restart_limit: u32,
    ) -> Result<Self> {
        let (stop, stopped) = flume::bounded::<()>(1);

        let thread = supervisor::spawn("daily-logger-timer", restart_limit, move || {
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => match state.ensure_fresh() {
                        Ok(true) => {
                            tracing::debug!(path = %state.path().display(), "rotated by timer")
                        }
                        Ok(false) => {}
                        Err(e) => tracing::error!(error = %e, "scheduled log rotation failed"),
                    },
                    // Stop requested or timer handle dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })?;

        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Whether the timer thread is still running
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the timer and wait for its thread to exit
    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread immediately.
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            thread.join();
        }
    }
}

impl Drop for RotationTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
