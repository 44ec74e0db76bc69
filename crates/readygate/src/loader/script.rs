//! Script loader.

use readygate_common::url::{SCRIPT_SUFFIX, resource_url, split_module_list};
use readygate_dom::NodeId;
use tracing::{debug, trace};

use super::{LoadRequest, ScriptSignal};
use crate::continuation::Continuation;
use crate::error::LoaderError;
use crate::event_loop::Task;
use crate::network::FetchOutcome;
use crate::page::{Page, PageState};
use crate::resource::ResourceKey;

/// A script element waiting for its completion signal.
///
/// Removing the entry is what "clears both handlers": once gone, later
/// signals on the same element find nothing to run.
#[derive(Debug)]
pub(crate) struct PendingScript {
    pub(crate) name: String,
    pub(crate) continuation: Continuation,
}

impl PageState {
    /// Steps 1-4 of a script load. Returns the continuation when it must run
    /// right away (empty module, or already requested); `None` once it is
    /// parked against a freshly injected element.
    pub(crate) fn load_script(
        &mut self,
        request: &LoadRequest,
        continuation: Continuation,
    ) -> Result<Option<Continuation>, LoaderError> {
        // STEP 1: Related stylesheets go first, also for a stylesheet-only
        // request with no script module.
        for css in split_module_list(&request.related_css) {
            self.load_stylesheet(css, request.scope)?;
        }

        // STEP 2: No module means nothing to wait for.
        if request.module.is_empty() {
            return Ok(Some(continuation));
        }

        let head = self.dom.head().ok_or(LoaderError::MissingElement("head"))?;

        // STEP 3: A repeated request resolves immediately instead of waiting
        // for a load that already happened (or is still in flight).
        if !self
            .registry
            .mark_requested(ResourceKey::script(request.scope, &request.module))
        {
            trace!(module = %request.module, scope = %request.scope, "script already requested");
            return Ok(Some(continuation));
        }

        // STEP 4: Inject.
        let src = resource_url(
            self.config.js_base(request.scope),
            &request.module,
            SCRIPT_SUFFIX,
        );
        let script = self.dom.create_element("script");
        let _ = self.dom.set_attribute(script, "type", "text/javascript");
        let _ = self.dom.set_attribute(script, "src", &src);
        self.dom.append_child(head, script);
        self.log_line(&format!("start downloading js {src}"));

        let _ = self.scripts.insert(
            script,
            PendingScript {
                name: request.module.clone(),
                continuation,
            },
        );

        match self.network.fetch(&src) {
            FetchOutcome::Complete(latency) => {
                for &signal in self.options.strategy.completion_signals() {
                    self.events.schedule(
                        latency,
                        Task::ScriptSignal {
                            node: script,
                            signal,
                        },
                    );
                }
            }
            FetchOutcome::Stalled => debug!(%src, "script fetch stalled"),
        }

        Ok(None)
    }

    /// Step 5: a signal arrived on `node`. Returns the continuation to run if
    /// this is the first qualifying signal for a pending script.
    fn complete_script(
        &mut self,
        node: NodeId,
        signal: ScriptSignal,
    ) -> Result<Option<Continuation>, LoaderError> {
        if self.dom.get(node).is_none() {
            return Err(LoaderError::UnknownNode(node));
        }
        if !self.dom.as_element(node).is_some_and(|e| e.is("script")) {
            return Err(LoaderError::NotAScript(node));
        }
        if !self.options.strategy.accepts(signal) {
            trace!(?node, %signal, "signal does not complete script");
            return Ok(None);
        }
        let Some(pending) = self.scripts.remove(&node) else {
            trace!(?node, %signal, "script already completed or not loader-owned");
            return Ok(None);
        };

        if self.reporter.show_errors() {
            self.log_line(&format!("loaded {}", pending.name));
        }
        Ok(Some(pending.continuation))
    }
}

impl Page {
    /// The loader entry point: load `request`'s stylesheets and script, then
    /// run `continuation` once the script has loaded.
    ///
    /// The continuation runs synchronously, before this returns, when the
    /// module name is empty or the script was already requested. Otherwise it
    /// runs on the script's first completion signal, or never if the script
    /// never completes.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingElement`] if the document has no
    /// `<head>` to inject into.
    pub fn load(&self, request: &LoadRequest, continuation: Continuation) -> Result<(), LoaderError> {
        let immediate = self.state_mut().load_script(request, continuation)?;
        if let Some(continuation) = immediate {
            continuation.invoke("load");
        }
        Ok(())
    }

    /// Deliver a completion-related signal to a script element.
    ///
    /// Signals that do not qualify under the page's
    /// [`crate::CompletionStrategy`], and every signal after the first
    /// qualifying one, are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownNode`] or [`LoaderError::NotAScript`] if
    /// `node` is not a script element of this page's document.
    pub fn signal_script(&self, node: NodeId, signal: ScriptSignal) -> Result<(), LoaderError> {
        let ready = self.state_mut().complete_script(node, signal)?;
        if let Some(continuation) = ready {
            continuation.invoke("script completion");
        }
        Ok(())
    }

    /// Deliver `signal` to every script element whose `src` is `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UrlNotInjected`] if no such element exists.
    pub fn signal_script_url(&self, url: &str, signal: ScriptSignal) -> Result<(), LoaderError> {
        let nodes: Vec<NodeId> = {
            let state = self.state();
            state
                .dom
                .elements_by_tag_name("script")
                .into_iter()
                .filter(|&node| state.dom.attribute(node, "src") == Some(url))
                .collect()
        };
        if nodes.is_empty() {
            return Err(LoaderError::UrlNotInjected(url.to_string()));
        }
        for node in nodes {
            self.signal_script(node, signal)?;
        }
        Ok(())
    }
}
