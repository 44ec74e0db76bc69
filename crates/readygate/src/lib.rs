//! Dependency-aware resource loader for a browser document.
//!
//! # Scope
//!
//! This crate provides:
//! - **Configuration** - decoding the inline bootstrap attribute ([`Config`])
//! - **Resource Loading** - deduplicated `<script>`/`<link>` injection
//! - **Dependency Coordination** - a single "dependencies ready" signal
//! - **Ready Gate** - callbacks released once, after document and
//!   dependencies are both ready
//! - **Debug Reporting** - a timestamped log and an overlay panel
//!
//! # Model
//!
//! A [`Page`] owns the document ([`readygate_dom::DomTree`]), the parsed
//! configuration and all loader state. It runs on a single thread: the host
//! drives it by dispatching lifecycle events, signalling script completion and
//! advancing a virtual clock. Fetching is delegated to a [`Network`]
//! capability, which decides when (or whether) an injected script completes.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use readygate::{Continuation, LifecycleEvent, Page, ScriptSignal};
//!
//! let page = Page::from_attribute(Some("dep=jquery")).unwrap();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//! page.ready(Continuation::new(move || flag.set(true)));
//!
//! page.dispatch(LifecycleEvent::DomContentLoaded);
//! assert!(!fired.get());
//!
//! page.signal_script_url("http://repo.bfw.wiki/bfwrepo/js/jquery.js", ScriptSignal::Load)
//!     .unwrap();
//! assert!(fired.get());
//! ```
//!
//! # Not Yet Implemented
//!
//! - Load timeouts: a dependency that never completes keeps the gate waiting
//! - Cancelling an injected resource

pub mod config;
pub mod continuation;
pub mod coordinator;
pub mod error;
pub mod event_loop;
pub mod gate;
pub mod loader;
pub mod network;
pub mod page;
pub mod registry;
pub mod reporter;
pub mod resource;
pub mod signal;

pub use config::Config;
pub use continuation::Continuation;
pub use error::LoaderError;
pub use event_loop::Task;
pub use gate::{DocumentReadyState, GatePhase, LifecycleEvent};
pub use loader::{CompletionStrategy, LoadRequest, ScriptReadyState, ScriptSignal};
pub use network::{FetchOutcome, LatencyNetwork, ManualNetwork, Network};
pub use page::{Page, PageOptions, ReadinessFlags, WeakPage};
pub use registry::Registry;
pub use reporter::{LogBuffer, Reporter};
pub use resource::{ResourceKey, ResourceKind, Scope};
