// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shutdown request flag and Ctrl+C handling.
//!
//! The process-wide flag is the only driver state written outside the
//! step loop. The signal handler stores `true` and nothing else; the
//! [`StepCoordinator`](crate::StepCoordinator) reads it once per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use simbridge_core::SimbridgeError;
use tracing::debug;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Read handle on a shutdown request flag.
///
/// [`ShutdownSignal::process`] observes the process-wide flag set by the
/// Ctrl+C handler. [`ShutdownSignal::manual`] owns an independent flag,
/// which lets tests request a shutdown without touching global state.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    flag: Flag,
}

#[derive(Debug, Clone)]
enum Flag {
    Process,
    Manual(Arc<AtomicBool>),
}

impl ShutdownSignal {
    /// The process-wide flag.
    pub fn process() -> Self {
        Self {
            flag: Flag::Process,
        }
    }

    /// A fresh, unset flag not connected to any signal.
    pub fn manual() -> Self {
        Self {
            flag: Flag::Manual(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Returns true once a shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        match &self.flag {
            Flag::Process => SHUTDOWN_REQUESTED.load(Ordering::SeqCst),
            Flag::Manual(flag) => flag.load(Ordering::SeqCst),
        }
    }

    /// Request a shutdown. The flag is never cleared.
    pub fn request(&self) {
        match &self.flag {
            Flag::Process => SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst),
            Flag::Manual(flag) => flag.store(true, Ordering::SeqCst),
        }
    }
}

/// Install the Ctrl+C (SIGINT/SIGTERM) handler and return the process flag.
///
/// Can only be installed once per process.
pub fn install_signal_handler() -> Result<ShutdownSignal, SimbridgeError> {
    ctrlc::set_handler(|| SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst)).map_err(|e| {
        SimbridgeError::Internal(format!("failed to install signal handler: {e}"))
    })?;
    debug!("shutdown signal handler installed");
    Ok(ShutdownSignal::process())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_signal_starts_unset() {
        assert!(!ShutdownSignal::manual().is_requested());
    }

    #[test]
    fn clones_share_the_flag() {
        let signal = ShutdownSignal::manual();
        let observer = signal.clone();
        signal.request();
        assert!(observer.is_requested());
        signal.request();
        assert!(observer.is_requested());
    }

    #[test]
    fn manual_signals_are_independent() {
        let a = ShutdownSignal::manual();
        let b = ShutdownSignal::manual();
        a.request();
        assert!(!b.is_requested());
    }
}
