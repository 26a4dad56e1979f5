//! Single-reader serialization for one physical connection.
//!
//! The underlying driver permits only one open row reader per
//! connection, so at most one reader-bearing operation may be in flight
//! at a time. A per-connection permit is acquired before any
//! reader-producing call and held until the cursor is fully drained.
//! On top of the permit the gate keeps a readiness probe: drivers that
//! cannot introspect reader state surface it through `ping`, which
//! reports [`DriverError::ReaderOpen`] while a cursor is still open.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::driver::DriverError;

/// Mutual exclusion for reader-bearing operations on one connection.
pub(crate) struct ConnectionGate {
    permit: Mutex<()>,
    poll_interval: Duration,
}

impl ConnectionGate {
    /// `poll_interval` is the pause between readiness probes — a tuning
    /// knob, not a contract.
    pub(crate) fn new(poll_interval: Duration) -> Self {
        Self {
            permit: Mutex::new(()),
            poll_interval,
        }
    }

    /// Acquires the permit without probing.
    ///
    /// Used by teardown paths that only need in-flight work to drain.
    pub(crate) fn acquire(&self) -> GatePermit<'_> {
        let guard = self
            .permit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        GatePermit { _guard: guard }
    }

    /// Blocks until this operation may touch the connection.
    ///
    /// The probe runs on a fixed interval until it succeeds without
    /// reporting [`DriverError::ReaderOpen`]. Any other probe error is
    /// fatal and is returned immediately, never retried.
    pub(crate) fn admit<P>(&self, mut probe: P) -> Result<GatePermit<'_>, DriverError>
    where
        P: FnMut() -> Result<(), DriverError>,
    {
        let permit = self.acquire();
        loop {
            match probe() {
                Ok(()) => return Ok(permit),
                Err(DriverError::ReaderOpen) => {
                    tracing::trace!("reader still open, probing again");
                    std::thread::sleep(self.poll_interval);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Held for the duration of one admitted operation.
pub(crate) struct GatePermit<'a> {
    _guard: MutexGuard<'a, ()>,
}
