//! Ready gate.
//!
//! Callbacks submitted with [`Page::ready`] are queued until the document is
//! ready *and* the declared dependencies have loaded, then released exactly
//! once in submission order. After release, submissions run immediately.
//!
//! ```text
//! Idle ──DOM ready, deps ready──────────────▶ Released
//!   │                                            ▲
//!   └──DOM ready, deps pending──▶ Waiting ──deps ready──┘
//! ```
//!
//! The queue lives inside the `Idle`/`Waiting` states. Leaving them moves it
//! out, so a stray second release has nothing left to run.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::continuation::Continuation;
use crate::page::Page;

/// [§ 3.1.2 `Document.readyState`](https://html.spec.whatwg.org/multipage/dom.html#current-document-readiness)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentReadyState {
    /// "The Document is still loading."
    Loading,
    /// "The document has finished loading and the document has been parsed
    /// but sub-resources ... are still loading."
    Interactive,
    /// "The document and all sub-resources have finished loading."
    Complete,
}

/// Browser lifecycle signals the gate listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    /// `DOMContentLoaded` on the document.
    DomContentLoaded,
    /// `readystatechange` on the document.
    ReadyStateChange(DocumentReadyState),
    /// `load` on the window.
    WindowLoad,
}

impl LifecycleEvent {
    /// Whether this event means the document is ready. A `readystatechange`
    /// counts only when it reaches `complete`.
    #[must_use]
    pub const fn signals_dom_ready(self) -> bool {
        match self {
            Self::DomContentLoaded | Self::WindowLoad => true,
            Self::ReadyStateChange(state) => matches!(state, DocumentReadyState::Complete),
        }
    }
}

/// Observable phase of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GatePhase {
    /// No lifecycle signal yet.
    Idle,
    /// Document ready, dependencies still loading.
    Waiting,
    /// Terminal: callbacks run on submission.
    Released,
}

/// Result of the first DOM-ready signal.
#[derive(Debug)]
pub enum DomReady {
    /// The gate already saw a DOM-ready signal.
    Ignored,
    /// Dependencies were ready: run these, in order.
    Released(Vec<Continuation>),
    /// Dependencies were not ready: the gate is now waiting.
    Waiting,
}

#[derive(Debug)]
enum GateState {
    Idle(Vec<Continuation>),
    Waiting(Vec<Continuation>),
    Released,
}

/// The gate's state machine, independent of any page.
#[derive(Debug)]
pub struct ReadyGate {
    state: GateState,
}

impl ReadyGate {
    /// A new, idle gate with an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GateState::Idle(Vec::new()),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GatePhase {
        match self.state {
            GateState::Idle(_) => GatePhase::Idle,
            GateState::Waiting(_) => GatePhase::Waiting,
            GateState::Released => GatePhase::Released,
        }
    }

    /// Number of callbacks waiting for release.
    #[must_use]
    pub fn queued(&self) -> usize {
        match &self.state {
            GateState::Idle(queue) | GateState::Waiting(queue) => queue.len(),
            GateState::Released => 0,
        }
    }

    /// Queue a callback, or hand it back if the gate is released.
    #[must_use]
    pub fn submit(&mut self, continuation: Continuation) -> Option<Continuation> {
        match &mut self.state {
            GateState::Idle(queue) | GateState::Waiting(queue) => {
                queue.push(continuation);
                None
            }
            GateState::Released => Some(continuation),
        }
    }

    /// Handle a DOM-ready signal.
    pub fn dom_ready(&mut self, dependencies_ready: bool) -> DomReady {
        let GateState::Idle(queue) = &mut self.state else {
            return DomReady::Ignored;
        };
        let queue = std::mem::take(queue);
        if dependencies_ready {
            self.state = GateState::Released;
            DomReady::Released(queue)
        } else {
            self.state = GateState::Waiting(queue);
            DomReady::Waiting
        }
    }

    /// Leave `Waiting` for `Released`, returning the queue. `None` in any
    /// other phase.
    pub fn release(&mut self) -> Option<Vec<Continuation>> {
        let GateState::Waiting(queue) = &mut self.state else {
            return None;
        };
        let queue = std::mem::take(queue);
        self.state = GateState::Released;
        Some(queue)
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Run released callbacks in submission order.
pub(crate) fn run_all(queue: Vec<Continuation>, site: &'static str) {
    for continuation in queue {
        continuation.invoke(site);
    }
}

impl Page {
    /// Register a callback for when the document and all dependencies are
    /// ready. Runs synchronously if the gate has already released.
    pub fn ready(&self, continuation: Continuation) {
        let immediate = self.state_mut().gate.submit(continuation);
        if let Some(continuation) = immediate {
            continuation.invoke("ready");
        }
    }

    /// Deliver a browser lifecycle event to the gate's handler.
    ///
    /// The first DOM-ready event opens the gate immediately if dependencies
    /// are ready; otherwise the gate waits for the dependency readiness
    /// signal. Later events are no-ops.
    pub fn dispatch(&self, event: LifecycleEvent) {
        if !event.signals_dom_ready() {
            return;
        }

        let (released, notify_now) = {
            let mut state = self.state_mut();
            let dependencies_ready = state.coordinator.is_ready();
            match state.gate.dom_ready(dependencies_ready) {
                DomReady::Ignored => return,
                DomReady::Released(queue) => {
                    state.log_line("dependencies loaded, running callbacks");
                    (queue, None)
                }
                DomReady::Waiting => {
                    state.log_line("dependencies not loaded, waiting");
                    let page = self.downgrade();
                    let waiter: Box<dyn FnOnce()> = Box::new(move || {
                        if let Some(page) = page.upgrade() {
                            page.poll_dependencies();
                        }
                    });
                    (Vec::new(), state.coordinator.subscribe(waiter))
                }
            }
        };

        run_all(released, "ready gate");
        if let Some(waiter) = notify_now {
            waiter();
        }
    }
}
