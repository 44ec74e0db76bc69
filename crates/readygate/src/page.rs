//! The page: one owned context for everything the loader touches.
//!
//! [`Page`] is a cheap, cloneable handle over the page's state. The state is
//! created once at bootstrap and lives as long as any handle does; there is
//! no teardown. All operations run on the caller's thread and borrow the
//! state only between suspension points: continuations and waiters always
//! run with no borrow held, so they may call back into the page.
//!
//! Continuations stored by the page must not keep a strong [`Page`] alive
//! if the page is meant to be dropped; capture a [`WeakPage`] instead.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use readygate_dom::{DomTree, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, MARKER_ATTRIBUTE};
use crate::continuation::Continuation;
use crate::coordinator::Coordinator;
use crate::error::LoaderError;
use crate::event_loop::{DEFAULT_STEP_LIMIT, EventLoop, Task};
use crate::gate::{GatePhase, ReadyGate};
use crate::loader::{CompletionStrategy, LoadRequest, PendingScript};
use crate::network::{ManualNetwork, Network};
use crate::registry::Registry;
use crate::reporter::{DEBUG_PANEL_ID, DEBUG_PANEL_STYLE, Reporter};
use crate::resource::{ResourceKey, Scope};

/// Default id of the marker element carrying the bootstrap attribute.
pub const DEFAULT_MARKER_ID: &str = "readygate";

/// Default delay, in milliseconds, before the debug panel is rendered.
pub const DEFAULT_DEBUG_PANEL_DELAY_MS: u64 = 5_000;

/// Host-side settings, fixed at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PageOptions {
    /// Id of the marker element whose `data` attribute is parsed.
    pub marker_id: String,
    /// How script completion is detected.
    pub strategy: CompletionStrategy,
    /// Delay, in milliseconds, before the debug panel is rendered.
    pub debug_panel_delay_ms: u64,
    /// Maximum tasks one drive of the event loop may run.
    pub step_limit: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            marker_id: DEFAULT_MARKER_ID.to_string(),
            strategy: CompletionStrategy::default(),
            debug_panel_delay_ms: DEFAULT_DEBUG_PANEL_DELAY_MS,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl PageOptions {
    /// Delay before the debug panel is rendered.
    #[must_use]
    pub const fn debug_panel_delay(&self) -> Duration {
        Duration::from_millis(self.debug_panel_delay_ms)
    }
}

/// Snapshot of the two readiness conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessFlags {
    /// A DOM-ready lifecycle event has been handled.
    pub dom_ready: bool,
    /// The last declared dependency has completed (or none were declared).
    pub dependencies_ready: bool,
}

impl ReadinessFlags {
    /// The gate is open iff both conditions hold.
    #[must_use]
    pub const fn is_open(self) -> bool {
        self.dom_ready && self.dependencies_ready
    }
}

/// Everything the loader owns for one page session.
pub(crate) struct PageState {
    pub(crate) dom: DomTree,
    pub(crate) config: Config,
    pub(crate) options: PageOptions,
    pub(crate) registry: Registry,
    pub(crate) reporter: Reporter,
    pub(crate) coordinator: Coordinator,
    pub(crate) gate: ReadyGate,
    pub(crate) scripts: HashMap<NodeId, PendingScript>,
    pub(crate) events: EventLoop,
    pub(crate) network: Box<dyn Network>,
}

impl PageState {
    /// Append a timestamped line to the page log and mirror it to tracing.
    pub(crate) fn log_line(&mut self, text: &str) {
        debug!(target: "readygate::log", "{text}");
        self.reporter.debug_show(text);
    }
}

/// Handle to a bootstrapped page.
#[derive(Clone)]
pub struct Page {
    inner: Rc<RefCell<PageState>>,
}

/// Non-owning handle, for continuations stored inside the page.
#[derive(Clone)]
pub struct WeakPage {
    inner: Weak<RefCell<PageState>>,
}

impl WeakPage {
    /// The page, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Page> {
        self.inner.upgrade().map(|inner| Page { inner })
    }
}

impl Page {
    /// Bootstrap the loader on `dom`.
    ///
    /// In order: parse the configuration from the marker element, request
    /// the dependencies, load the `loadcss` stylesheets, queue the `loadjs`
    /// scripts behind the ready gate and, in debug mode, schedule the debug
    /// panel. Lifecycle events are delivered afterwards with
    /// [`Page::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingElement`] if resources must be injected
    /// and the document has no `<head>`.
    pub fn bootstrap(
        dom: DomTree,
        options: PageOptions,
        network: impl Network + 'static,
    ) -> Result<Self, LoaderError> {
        let config = Config::from_document(&dom, &options.marker_id);
        debug!(
            dependencies = config.dependencies.len(),
            show_errors = config.show_errors,
            ignored = config.ignored.len(),
            "bootstrapping page"
        );

        let user_load_css = config.user_load_css.clone();
        let user_load_js = config.user_load_js.clone();
        let show_errors = config.show_errors;
        let panel_delay = options.debug_panel_delay();

        let page = Self {
            inner: Rc::new(RefCell::new(PageState {
                dom,
                reporter: Reporter::new(config.show_errors),
                config,
                events: EventLoop::new(options.step_limit),
                options,
                registry: Registry::new(),
                coordinator: Coordinator::new(),
                gate: ReadyGate::new(),
                scripts: HashMap::new(),
                network: Box::new(network),
            })),
        };

        page.initialize_dependencies()?;

        for name in &user_load_css {
            page.load_stylesheet(name, Scope::Local)?;
        }

        if !user_load_js.is_empty() {
            let weak = page.downgrade();
            page.ready(Continuation::fallible(move || {
                let Some(page) = weak.upgrade() else {
                    return Ok(());
                };
                for name in &user_load_js {
                    page.load(&LoadRequest::local(name), Continuation::noop())?;
                }
                Ok(())
            }));
        }

        if show_errors {
            page.schedule(panel_delay, Task::ShowDebugPanel);
        }

        Ok(page)
    }

    /// Bootstrap a blank page whose `<head>` holds the marker element with
    /// the given `data` attribute, using default options and a
    /// [`ManualNetwork`].
    ///
    /// # Errors
    ///
    /// See [`Page::bootstrap`].
    pub fn from_attribute(data: Option<&str>) -> Result<Self, LoaderError> {
        Self::from_attribute_with(data, PageOptions::default(), ManualNetwork::new())
    }

    /// Like [`Page::from_attribute`] with explicit options and network.
    ///
    /// # Errors
    ///
    /// See [`Page::bootstrap`].
    pub fn from_attribute_with(
        data: Option<&str>,
        options: PageOptions,
        network: impl Network + 'static,
    ) -> Result<Self, LoaderError> {
        let mut dom = DomTree::with_skeleton();
        let head = dom.head().ok_or(LoaderError::MissingElement("head"))?;
        let marker = dom.create_element("script");
        let _ = dom.set_attribute(marker, "id", &options.marker_id);
        if let Some(data) = data {
            let _ = dom.set_attribute(marker, MARKER_ATTRIBUTE, data);
        }
        dom.append_child(head, marker);
        Self::bootstrap(dom, options, network)
    }

    /// A non-owning handle to this page.
    #[must_use]
    pub fn downgrade(&self) -> WeakPage {
        WeakPage {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn state(&self) -> Ref<'_, PageState> {
        self.inner.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, PageState> {
        self.inner.borrow_mut()
    }

    /// The configuration parsed at bootstrap.
    #[must_use]
    pub fn config(&self) -> Config {
        self.state().config.clone()
    }

    /// The opaque `loadpara` value, passed through for page code.
    #[must_use]
    pub fn load_parameter(&self) -> Option<String> {
        self.state().config.load_parameter.clone()
    }

    /// Global error hook: log an uncaught script error in debug mode.
    ///
    /// Always returns `false`, leaving default error handling in place.
    #[must_use]
    pub fn report_error(&self, message: &str, line: u32) -> bool {
        self.state_mut().reporter.report_error(message, line)
    }

    /// Append a timestamped line to the page log.
    pub fn debug_show(&self, text: &str) {
        self.state_mut().log_line(text);
    }

    /// Current readiness conditions.
    #[must_use]
    pub fn readiness(&self) -> ReadinessFlags {
        let state = self.state();
        ReadinessFlags {
            dom_ready: state.gate.phase() != GatePhase::Idle,
            dependencies_ready: state.coordinator.is_ready(),
        }
    }

    /// Current phase of the ready gate.
    #[must_use]
    pub fn gate_phase(&self) -> GatePhase {
        self.state().gate.phase()
    }

    /// Callbacks still queued behind the gate.
    #[must_use]
    pub fn queued_callbacks(&self) -> usize {
        self.state().gate.queued()
    }

    /// Whether `key` has been requested.
    #[must_use]
    pub fn is_requested(&self, key: &ResourceKey) -> bool {
        self.state().registry.contains(key)
    }

    /// Number of distinct resources requested.
    #[must_use]
    pub fn requested_count(&self) -> usize {
        self.state().registry.len()
    }

    /// Scripts injected but not yet completed.
    #[must_use]
    pub fn pending_scripts(&self) -> usize {
        self.state().scripts.len()
    }

    /// Lines of the page log, oldest first.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.state().reporter.log().lines().to_vec()
    }

    /// The page log rendered as panel markup.
    #[must_use]
    pub fn render_log(&self) -> String {
        self.state().reporter.log().render()
    }

    /// Run `f` against a snapshot of the document.
    ///
    /// The page is not borrowed while `f` runs, so `f` may call back into
    /// it. Changes made that way are not visible through the snapshot.
    #[must_use]
    pub fn with_dom<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        let dom = self.state().dom.clone();
        f(&dom)
    }

    /// Serialized contents of `<head>` (empty if there is none).
    #[must_use]
    pub fn head_html(&self) -> String {
        self.with_dom(|dom| dom.head().map(|head| dom.inner_html(head)).unwrap_or_default())
    }

    /// `src` of every `<script>` that has one, in document order.
    #[must_use]
    pub fn script_sources(&self) -> Vec<String> {
        self.elements_attribute("script", "src")
    }

    /// `href` of every `<link>`, in document order.
    #[must_use]
    pub fn stylesheet_hrefs(&self) -> Vec<String> {
        self.elements_attribute("link", "href")
    }

    fn elements_attribute(&self, tag: &str, attribute: &str) -> Vec<String> {
        self.with_dom(|dom| {
            dom.elements_by_tag_name(tag)
                .into_iter()
                .filter_map(|node| dom.attribute(node, attribute).map(str::to_string))
                .collect()
        })
    }

    /// Render the debug panel: a fixed overlay in `<body>` holding a snapshot
    /// of the log as literal markup. Later log lines do not update it.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingElement`] if the document has no
    /// `<body>`.
    pub fn show_debug_panel(&self) -> Result<NodeId, LoaderError> {
        let mut state = self.state_mut();
        let body = state.dom.body().ok_or(LoaderError::MissingElement("body"))?;
        let markup = state.reporter.log().render();
        let panel = state.dom.create_element("div");
        let _ = state.dom.set_attribute(panel, "id", DEBUG_PANEL_ID);
        let _ = state.dom.set_attribute(panel, "style", DEBUG_PANEL_STYLE);
        state.dom.set_inner_html(panel, &markup);
        state.dom.append_child(body, panel);
        Ok(panel)
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state().events.now()
    }

    /// Tasks scheduled but not yet run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.state().events.pending()
    }

    /// Queue `task` to run `delay` from now.
    pub fn schedule(&self, delay: Duration, task: Task) {
        self.state_mut().events.schedule(delay, task);
    }

    /// Advance the virtual clock by `delta`, running every task that falls
    /// due on the way.
    ///
    /// # Errors
    ///
    /// Returns the first error of a task, or [`LoaderError::StepLimit`].
    pub fn advance_time(&self, delta: Duration) -> Result<(), LoaderError> {
        let target = self.now() + delta;
        self.drive(Some(target))?;
        self.state_mut().events.set_now(target);
        Ok(())
    }

    /// Advance the virtual clock to an absolute time.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::TimeTravel`] if `target` is in the past, or any
    /// error of [`Page::advance_time`].
    pub fn advance_to(&self, target: Duration) -> Result<(), LoaderError> {
        let now = self.now();
        if target < now {
            return Err(LoaderError::TimeTravel { now, target });
        }
        self.advance_time(target - now)
    }

    /// Run tasks, moving the clock as needed, until none remain.
    ///
    /// # Errors
    ///
    /// Returns the first error of a task, or [`LoaderError::StepLimit`].
    pub fn run_until_idle(&self) -> Result<(), LoaderError> {
        self.drive(None)
    }

    fn drive(&self, limit: Option<Duration>) -> Result<(), LoaderError> {
        let mut steps = 0usize;
        loop {
            let task = {
                let mut state = self.state_mut();
                let step_limit = state.events.step_limit();
                if steps >= step_limit && state.events.has_due(limit) {
                    return Err(LoaderError::StepLimit { limit: step_limit });
                }
                state.events.pop_due(limit)
            };
            let Some(task) = task else {
                return Ok(());
            };
            steps += 1;
            self.run_task(task)?;
        }
    }

    fn run_task(&self, task: Task) -> Result<(), LoaderError> {
        match task {
            Task::ScriptSignal { node, signal } => self.signal_script(node, signal),
            Task::Lifecycle(event) => {
                self.dispatch(event);
                Ok(())
            }
            Task::ScriptError { message, line } => {
                let _ = self.report_error(&message, line);
                Ok(())
            }
            Task::ShowDebugPanel => self.show_debug_panel().map(|_| ()),
        }
    }
}
