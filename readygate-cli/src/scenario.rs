//! Scripted page sessions.
//!
//! A scenario describes one page: its bootstrap attribute, how the simulated
//! network answers, and what the host does over time. Running it yields a
//! [`Report`] of what ended up in `<head>` and which callbacks fired when.
//!
//! ```json
//! {
//!   "data": "dep=jquery|app&jb=/js/&err=1",
//!   "network": { "default-latency-ms": 100, "stalled": ["/js/app.js"] },
//!   "events": [{ "at-ms": 50, "event": "dom-content-loaded" }],
//!   "ready": ["main"],
//!   "run-ms": 6000
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use readygate::reporter::DEBUG_PANEL_ID;
use readygate::{
    Config, Continuation, GatePhase, LatencyNetwork, LifecycleEvent, LoadRequest, Page,
    PageOptions, ReadinessFlags, Scope, Task,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A scripted page session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Scenario {
    /// Value of the marker element's `data` attribute. `None` omits it.
    pub data: Option<String>,
    /// Host-side page options.
    pub options: PageOptions,
    /// How injected scripts complete.
    pub network: NetworkPlan,
    /// Lifecycle events fired by the host.
    pub events: Vec<TimedEvent>,
    /// Loads requested by page code.
    pub loads: Vec<TimedLoad>,
    /// Labels of callbacks registered on the ready gate at bootstrap.
    pub ready: Vec<String>,
    /// Uncaught script errors delivered to the global hook.
    pub errors: Vec<TimedError>,
    /// Stop the clock here. Without it, run until no task remains.
    pub run_ms: Option<u64>,
}

/// Latencies and failures of the simulated network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkPlan {
    /// Latency of every script without an override.
    pub default_latency_ms: u64,
    /// Per-URL latency overrides.
    pub latency_ms: HashMap<String, u64>,
    /// URLs that never complete.
    pub stalled: Vec<String>,
}

impl Default for NetworkPlan {
    fn default() -> Self {
        Self {
            default_latency_ms: 100,
            latency_ms: HashMap::new(),
            stalled: Vec::new(),
        }
    }
}

impl NetworkPlan {
    fn build(&self) -> LatencyNetwork {
        let network = LatencyNetwork::new(Duration::from_millis(self.default_latency_ms));
        let network = self
            .latency_ms
            .iter()
            .fold(network, |network, (url, &ms)| {
                network.with_latency(url, Duration::from_millis(ms))
            });
        self.stalled
            .iter()
            .fold(network, |network, url| network.with_stalled(url))
    }
}

/// A lifecycle event at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimedEvent {
    /// When the event fires.
    pub at_ms: u64,
    /// The event.
    pub event: LifecycleEvent,
}

/// A call to the loader entry point at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimedLoad {
    /// When page code makes the call.
    pub at_ms: u64,
    /// Script module; empty for a stylesheet-only request.
    #[serde(default)]
    pub module: String,
    /// `|`-delimited related stylesheets.
    #[serde(default)]
    pub css: String,
    /// Serving scope.
    #[serde(default)]
    pub scope: Scope,
    /// Name recorded when the continuation runs. Defaults to the module.
    #[serde(default)]
    pub label: Option<String>,
}

/// An uncaught script error at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimedError {
    /// When the error is raised.
    pub at_ms: u64,
    /// Error message.
    pub message: String,
    /// Line number.
    #[serde(default)]
    pub line: u32,
}

/// A callback that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Fired {
    /// Label given in the scenario.
    pub label: String,
    /// Virtual time it ran at.
    pub at_ms: u64,
}

/// Outcome of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Report {
    /// Configuration parsed at bootstrap.
    pub config: Config,
    /// Serialized `<head>`.
    pub head: String,
    /// Injected script URLs, in document order.
    pub scripts: Vec<String>,
    /// Injected stylesheet URLs, in document order.
    pub stylesheets: Vec<String>,
    /// Callbacks in the order they ran.
    pub fired: Vec<Fired>,
    /// Readiness when the run stopped.
    pub readiness: ReadinessFlags,
    /// Gate phase when the run stopped.
    pub gate: GatePhase,
    /// Whether the debug panel was rendered.
    pub debug_panel: bool,
    /// Virtual time when the run stopped.
    pub elapsed_ms: u64,
    /// The page log.
    pub log: Vec<String>,
}

type FiredLog = Rc<RefCell<Vec<Fired>>>;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn recorder(page: &Page, fired: &FiredLog, label: String) -> Continuation {
    let page = page.downgrade();
    let fired = Rc::clone(fired);
    Continuation::new(move || {
        let at_ms = page.upgrade().map_or(0, |page| millis(page.now()));
        fired.borrow_mut().push(Fired { label, at_ms });
    })
}

impl Scenario {
    /// Read a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// scenario.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Run the session.
    ///
    /// Events and errors are queued on the page's clock up front. Loads are
    /// issued in time order after the clock reaches them, so a load sees
    /// every task due at or before its time.
    ///
    /// # Errors
    ///
    /// Returns any loader error, or an error if `run-ms` lies before the
    /// last scheduled load.
    pub fn run(&self) -> Result<Report> {
        let page = Page::from_attribute_with(
            self.data.as_deref(),
            self.options.clone(),
            self.network.build(),
        )
        .context("bootstrapping page")?;
        let fired: FiredLog = Rc::default();

        for label in &self.ready {
            page.ready(recorder(&page, &fired, label.clone()));
        }
        for event in &self.events {
            page.schedule(
                Duration::from_millis(event.at_ms),
                Task::Lifecycle(event.event),
            );
        }
        for error in &self.errors {
            page.schedule(
                Duration::from_millis(error.at_ms),
                Task::ScriptError {
                    message: error.message.clone(),
                    line: error.line,
                },
            );
        }

        let mut loads: Vec<&TimedLoad> = self.loads.iter().collect();
        loads.sort_by_key(|load| load.at_ms);
        for load in loads {
            page.advance_to(Duration::from_millis(load.at_ms))?;
            let request = LoadRequest {
                module: load.module.clone(),
                related_css: load.css.clone(),
                scope: load.scope,
            };
            let label = load.label.clone().unwrap_or_else(|| load.module.clone());
            debug!(module = %load.module, at_ms = load.at_ms, "scenario load");
            page.load(&request, recorder(&page, &fired, label))?;
        }

        match self.run_ms {
            Some(run_ms) => page.advance_to(Duration::from_millis(run_ms))?,
            None => page.run_until_idle()?,
        }

        let report = Report {
            config: page.config(),
            head: page.head_html(),
            scripts: page.script_sources(),
            stylesheets: page.stylesheet_hrefs(),
            fired: fired.borrow().clone(),
            readiness: page.readiness(),
            gate: page.gate_phase(),
            debug_panel: page.with_dom(|dom| dom.get_element_by_id(DEBUG_PANEL_ID).is_some()),
            elapsed_ms: millis(page.now()),
            log: page.log_lines(),
        };
        info!(
            fired = report.fired.len(),
            gate = %report.gate,
            elapsed_ms = report.elapsed_ms,
            "scenario finished"
        );
        Ok(report)
    }
}
