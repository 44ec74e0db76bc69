//! Continuations: run-once callbacks supplied by page code.
//!
//! A continuation may fail by returning an error or by panicking. Either way
//! the failure stops at the invocation site: the loader keeps going and
//! nothing reaches the page's global error hook.
//!
//! Expected failures belong in [`Continuation::fallible`]. A panic is still
//! caught, but the process panic hook runs first and prints its message to
//! stderr unless the host has replaced the hook.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

type Callback = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// A zero-argument callback that runs at most once.
pub struct Continuation {
    callback: Callback,
}

impl Continuation {
    /// Wrap an infallible closure.
    #[must_use]
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Box::new(move || {
                f();
                Ok(())
            }),
        }
    }

    /// Wrap a closure whose error is discarded when it runs.
    #[must_use]
    pub fn fallible(f: impl FnOnce() -> anyhow::Result<()> + 'static) -> Self {
        Self {
            callback: Box::new(f),
        }
    }

    /// A continuation that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Run the callback, swallowing errors and panics.
    ///
    /// An `Err` is only traced. A panic is traced as well, but the panic hook
    /// has already reported it by then; the default hook writes to stderr.
    ///
    /// `site` names the caller for trace output only.
    pub fn invoke(self, site: &'static str) {
        match panic::catch_unwind(AssertUnwindSafe(self.callback)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => debug!(site, %error, "continuation failed; discarded"),
            Err(_) => debug!(site, "continuation panicked; discarded"),
        }
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation")
    }
}
