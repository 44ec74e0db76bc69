//! Error type for host-facing loader operations.
//!
//! The loader itself never fails on malformed configuration or on a failing
//! continuation. These errors cover misuse by the host: signalling nodes
//! that do not exist, documents without a `<head>`, runaway task queues.

use std::time::Duration;

use readygate_dom::NodeId;
use thiserror::Error;

/// Errors returned by [`crate::Page`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
    /// The node id was never allocated by the page's document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// A script signal was delivered to something other than a `<script>`.
    #[error("node {0:?} is not a script element")]
    NotAScript(NodeId),

    /// No injected `<script>` carries this `src`.
    #[error("no script with src '{0}' has been injected")]
    UrlNotInjected(String),

    /// The document lacks an element the loader must append to.
    #[error("document has no <{0}> element")]
    MissingElement(&'static str),

    /// The task queue kept producing work past the configured limit.
    #[error("event loop exceeded {limit} task steps")]
    StepLimit {
        /// Configured maximum number of tasks per drive call.
        limit: usize,
    },

    /// The host asked to move the virtual clock backwards.
    #[error("cannot advance clock to {target:?}: already at {now:?}")]
    TimeTravel {
        /// Current virtual time.
        now: Duration,
        /// Requested virtual time.
        target: Duration,
    },
}
