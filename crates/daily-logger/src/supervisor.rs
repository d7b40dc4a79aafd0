//! Named background threads with panic containment
//!
//! A supervised body runs inside `catch_unwind`. If it panics the panic is
//! reported and the body is started again, until the restart budget is
//! spent. A body that returns normally ends the thread.

use crate::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

/// Handle to a supervised thread
#[derive(Debug)]
pub struct SupervisedThread {
    name: String,
    handle: JoinHandle<()>,
}

impl SupervisedThread {
    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!(task = %self.name, "supervised thread panicked outside its body");
        }
    }
}

/// Run `body` on a new thread named `name`, restarting it after a panic at
/// most `restart_limit` times.
pub fn spawn<F>(
    name: impl Into<String>,
    restart_limit: u32,
    mut body: F,
) -> Result<SupervisedThread>
where
    F: FnMut() + Send + 'static,
{
    let name = name.into();
    let task = name.clone();
    // Child of the caller's current span.
    let span = tracing::info_span!("supervised", task = %name);

    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _entered = span.enter();
            let mut restarts = 0u32;
            loop {
                match panic::catch_unwind(AssertUnwindSafe(|| body())) {
                    Ok(()) => break,
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        if restarts >= restart_limit {
                            tracing::error!(
                                %task,
                                %reason,
                                restarts,
                                "background task panicked, restart budget spent"
                            );
                            break;
                        }
                        restarts += 1;
                        tracing::warn!(
                            %task,
                            %reason,
                            restarts,
                            "background task panicked, restarting"
                        );
                    }
                }
            }
        })
        .map_err(|source| Error::Spawn {
            name: name.clone(),
            source,
        })?;

    Ok(SupervisedThread { name, handle })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tracing_test::traced_test;

    #[test]
    fn test_body_runs_once_on_success() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        let thread = spawn("test-once", 3, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(thread.name(), "test-once");
        thread.join();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_restarts_after_panic() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        let thread = spawn("test-restart", 3, move || {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                panic!("transient failure");
            }
        })
        .unwrap();
        thread.join();

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(logs_contain("restarting"));
    }

    #[test]
    #[traced_test]
    fn test_gives_up_after_budget() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();

        let thread = spawn("test-give-up", 2, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            panic!("always fails");
        })
        .unwrap();
        thread.join();

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(logs_contain("restart budget spent"));
    }
}
