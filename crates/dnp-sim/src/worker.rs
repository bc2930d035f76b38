//! Background worker threads for actuating devices
//!
//! Each slow device and jittering setpoint owns at most one worker. Workers
//! sleep on a condition variable between steps; stopping a worker clears the
//! running flag under the condvar's mutex, wakes it, and joins the thread, so
//! no stale worker can touch device state after `stop` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::error::SimError;

/// Cooperative stop flag shared between a worker and its owner
#[derive(Debug)]
pub struct StopSignal {
    running: AtomicBool,
    gate: Mutex<()>,
    wake: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            gate: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sleep for up to `timeout`
    ///
    /// Returns `true` if the full interval elapsed and the worker should keep
    /// going, `false` as soon as a stop was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut guard = self.gate.lock();
        if !self.is_running() {
            return false;
        }
        self.wake
            .wait_while_for(&mut guard, |_| self.is_running(), timeout);
        self.is_running()
    }

    fn stop(&self) {
        let _guard = self.gate.lock();
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_all();
    }
}

/// A named thread paired with its [`StopSignal`]
///
/// Dropping a worker stops and joins it.
#[derive(Debug)]
pub struct Worker {
    name: String,
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start `body` on a new thread named `name`
    pub fn spawn<F>(name: impl Into<String>, body: F) -> Result<Self, SimError>
    where
        F: FnOnce(&StopSignal) + Send + 'static,
    {
        let name = name.into();
        let signal = Arc::new(StopSignal::new());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(&thread_signal))
            .map_err(|source| SimError::Spawn {
                name: name.clone(),
                source,
            })?;

        debug!("Started worker {}", name);
        Ok(Self {
            name,
            signal,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread body has returned
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal the worker to stop and wait for it to exit
    pub fn stop(&mut self) {
        self.signal.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Worker {} panicked", self.name);
            } else {
                debug!("Stopped worker {}", self.name);
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}
