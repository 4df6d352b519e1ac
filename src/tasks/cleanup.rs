//! TTL Cleanup Task
//!
//! Background sweep that periodically removes expired cache entries, so
//! memory is not pinned by entries nobody reads again.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Weak;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheEngine;

// == Cleanup Handle ==
/// Handle to a running sweep. Dropping it without calling [`stop`] lets the
/// sweep run until the cache itself is dropped.
///
/// [`stop`]: CleanupHandle::stop
#[derive(Debug)]
pub enum CleanupHandle {
    /// Sweep running as a Tokio task
    Task(JoinHandle<()>),
    /// Sweep running on a dedicated thread, used outside a Tokio runtime
    Thread {
        stop: mpsc::Sender<()>,
        thread: thread::JoinHandle<()>,
    },
}

impl CleanupHandle {
    // == Stop ==
    /// Stops the sweep. A thread sweep is joined before returning.
    pub fn stop(self) {
        match self {
            CleanupHandle::Task(handle) => handle.abort(),
            CleanupHandle::Thread { stop, thread } => {
                // The thread may already have exited if the cache was dropped
                let _ = stop.send(());
                if thread.join().is_err() {
                    warn!("TTL cleanup thread panicked");
                }
            }
        }
    }

    /// Whether the sweep has finished running.
    pub fn is_finished(&self) -> bool {
        match self {
            CleanupHandle::Task(handle) => handle.is_finished(),
            CleanupHandle::Thread { thread, .. } => thread.is_finished(),
        }
    }
}

/// Spawns a background sweep that removes expired entries every `interval`.
///
/// The sweep holds only a weak reference to the cache and exits on its own
/// once the cache is dropped. It runs as a Tokio task when called inside a
/// runtime and on a named thread otherwise. Returns `None` if the thread
/// could not be spawned; the cache still expires entries lazily on read.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(Arc::downgrade(&engine), Duration::from_secs(60));
/// // Later, during shutdown:
/// if let Some(handle) = handle {
///     handle.stop();
/// }
/// ```
pub fn spawn_cleanup_task<V>(
    engine: Weak<Mutex<CacheEngine<V>>>,
    interval: Duration,
) -> Option<CleanupHandle>
where
    V: Send + 'static,
{
    match Handle::try_current() {
        Ok(runtime) => Some(CleanupHandle::Task(
            runtime.spawn(run_task(engine, interval)),
        )),
        Err(_) => spawn_thread(engine, interval),
    }
}

async fn run_task<V: Send + 'static>(engine: Weak<Mutex<CacheEngine<V>>>, interval: Duration) {
    info!(
        "Starting TTL cleanup task with interval of {}ms",
        interval.as_millis()
    );

    loop {
        // Sleep for the configured interval
        tokio::time::sleep(interval).await;

        if !sweep(&engine) {
            break;
        }
    }
}

fn spawn_thread<V: Send + 'static>(
    engine: Weak<Mutex<CacheEngine<V>>>,
    interval: Duration,
) -> Option<CleanupHandle> {
    let (stop, stop_rx) = mpsc::channel::<()>();

    let spawned = thread::Builder::new()
        .name("cache-cleanup".to_string())
        .spawn(move || {
            info!(
                "Starting TTL cleanup thread with interval of {}ms",
                interval.as_millis()
            );

            // Any message or a dropped sender ends the loop
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                if !sweep(&engine) {
                    break;
                }
            }
        });

    match spawned {
        Ok(thread) => Some(CleanupHandle::Thread { stop, thread }),
        Err(err) => {
            warn!("Failed to spawn TTL cleanup thread: {}", err);
            None
        }
    }
}

/// Runs one sweep. Returns `false` once the cache is gone.
fn sweep<V>(engine: &Weak<Mutex<CacheEngine<V>>>) -> bool {
    let Some(engine) = engine.upgrade() else {
        debug!("Cache dropped, stopping TTL cleanup");
        return false;
    };

    // Acquire the lock and cleanup expired entries
    let removed = engine.lock().purge_expired();

    // Log cleanup statistics
    if removed > 0 {
        info!("TTL cleanup: removed {} expired entries", removed);
    } else {
        debug!("TTL cleanup: no expired entries found");
    }
    true
}
