//! Dependency coordinator.
//!
//! Requests every configured dependency in one synchronous pass and derives a
//! single "dependencies ready" signal from them. Only the completion of the
//! *last declared* dependency sets the signal: earlier entries get no-op
//! continuations. Fetch and execution order of the injected elements is up
//! to the host, so this is an ordering hint rather than a sequential load.
//! If the last dependency never completes, readiness never arrives, even when
//! every other dependency loaded.

use tracing::debug;

use crate::continuation::Continuation;
use crate::error::LoaderError;
use crate::gate::run_all;
use crate::loader::LoadRequest;
use crate::page::Page;
use crate::signal::Latch;

/// Callback run when dependencies become ready.
pub type Waiter = Box<dyn FnOnce()>;

/// One-shot initialization guard plus the readiness latch.
#[derive(Default)]
pub struct Coordinator {
    initialized: bool,
    readiness: Latch<Waiter>,
}

impl Coordinator {
    /// A coordinator that has not started yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the one-shot initialization. `false` if already claimed.
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.initialized, true)
    }

    /// Whether initialization has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether dependencies are ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.readiness.is_set()
    }

    /// Set readiness, returning the waiters to notify.
    #[must_use]
    pub fn mark_ready(&mut self) -> Vec<Waiter> {
        self.readiness.set()
    }

    /// Wait for readiness. Hands the waiter back if already ready.
    #[must_use]
    pub fn subscribe(&mut self, waiter: Waiter) -> Option<Waiter> {
        self.readiness.subscribe(waiter)
    }
}

impl Page {
    /// Request the configured dependencies. Runs at most once per page.
    ///
    /// An empty dependency list makes dependencies ready immediately, without
    /// any request.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingElement`] if the document has no
    /// `<head>` to inject into.
    pub fn initialize_dependencies(&self) -> Result<(), LoaderError> {
        let dependencies = {
            let mut state = self.state_mut();
            if !state.coordinator.begin() {
                return Ok(());
            }
            state.config.dependencies.clone()
        };

        let Some((last, rest)) = dependencies.split_last() else {
            debug!("no dependencies declared");
            self.mark_dependencies_ready();
            return Ok(());
        };

        for name in rest {
            self.load(&LoadRequest::remote(name), Continuation::noop())?;
        }
        let page = self.downgrade();
        self.load(
            &LoadRequest::remote(last),
            Continuation::new(move || {
                if let Some(page) = page.upgrade() {
                    page.mark_dependencies_ready();
                }
            }),
        )
    }

    /// Release the gate if it is waiting and dependencies are ready.
    ///
    /// Runs whenever the readiness signal fires while the gate waits; calling
    /// it at any other time is a harmless no-op.
    pub fn poll_dependencies(&self) {
        let released = {
            let mut state = self.state_mut();
            if !state.coordinator.is_ready() {
                return;
            }
            let Some(queue) = state.gate.release() else {
                return;
            };
            state.log_line("dependencies loaded, end waiting");
            queue
        };
        run_all(released, "dependency poll");
    }

    fn mark_dependencies_ready(&self) {
        let waiters = self.state_mut().coordinator.mark_ready();
        debug!(waiters = waiters.len(), "dependencies ready");
        for waiter in waiters {
            waiter();
        }
    }
}
