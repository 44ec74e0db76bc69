//! Script and stylesheet loaders.
//!
//! [§ 4.12.1 The script element](https://html.spec.whatwg.org/multipage/scripting.html#the-script-element)
//! [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
//!
//! Both loaders build a URL from a scope's base prefix, consult the
//! [`crate::Registry`] and append a new element to `<head>` on first request.
//! Only scripts report completion; stylesheets are fire-and-forget.

mod script;
mod stylesheet;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::resource::Scope;

pub(crate) use script::PendingScript;

/// A request made through the public loader entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    /// Script module name. Empty means "no script, just continue".
    pub module: String,
    /// `|`-delimited stylesheet modules loaded before the script.
    pub related_css: String,
    /// Serving scope for the script and its stylesheets.
    pub scope: Scope,
}

impl LoadRequest {
    /// A remote script with no stylesheets.
    #[must_use]
    pub fn remote(module: &str) -> Self {
        Self {
            module: module.to_string(),
            related_css: String::new(),
            scope: Scope::Remote,
        }
    }

    /// A local script with no stylesheets.
    #[must_use]
    pub fn local(module: &str) -> Self {
        Self {
            scope: Scope::Local,
            ..Self::remote(module)
        }
    }

    /// Attach `|`-delimited related stylesheets.
    #[must_use]
    pub fn with_css(mut self, related_css: &str) -> Self {
        related_css.clone_into(&mut self.related_css);
        self
    }

    /// Build a request from the positional `[module, related_css, scope]`
    /// form. Missing positions read as empty; a scope other than `"local"`
    /// is remote. Extra positions are ignored.
    #[must_use]
    pub fn from_params(params: &[&str]) -> Self {
        let param = |index: usize| params.get(index).copied().unwrap_or_default();
        Self {
            module: param(0).to_string(),
            related_css: param(1).to_string(),
            scope: Scope::from_param(param(2)),
        }
    }
}

/// [§ 4.12.1 `readyState`](https://html.spec.whatwg.org/multipage/scripting.html)
///
/// Legacy per-element ready states reported by environments without a
/// direct load event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScriptReadyState {
    /// Element created, fetch not started.
    Uninitialized,
    /// Fetch in progress.
    Loading,
    /// Fetched.
    Loaded,
    /// Parsed, not yet executed.
    Interactive,
    /// Executed.
    Complete,
}

/// A completion-related signal fired on a script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptSignal {
    /// The element's `load` event.
    Load,
    /// A `readystatechange` on the element.
    ReadyStateChange(ScriptReadyState),
}

/// How script completion is detected. Chosen once, at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStrategy {
    /// Direct `load` event.
    #[default]
    LoadEvent,
    /// Legacy polling of the element's ready state; `loaded` or `complete`
    /// counts as done.
    ReadyState,
}

impl CompletionStrategy {
    /// Whether `signal` means "this script is done" under this strategy.
    #[must_use]
    pub const fn accepts(self, signal: ScriptSignal) -> bool {
        match (self, signal) {
            (Self::LoadEvent, ScriptSignal::Load) => true,
            (
                Self::ReadyState,
                ScriptSignal::ReadyStateChange(ScriptReadyState::Loaded | ScriptReadyState::Complete),
            ) => true,
            _ => false,
        }
    }

    /// Signals an environment of this kind fires when a fetch succeeds.
    #[must_use]
    pub const fn completion_signals(self) -> &'static [ScriptSignal] {
        match self {
            Self::LoadEvent => &[ScriptSignal::Load],
            Self::ReadyState => &[
                ScriptSignal::ReadyStateChange(ScriptReadyState::Loading),
                ScriptSignal::ReadyStateChange(ScriptReadyState::Loaded),
                ScriptSignal::ReadyStateChange(ScriptReadyState::Complete),
            ],
        }
    }
}
