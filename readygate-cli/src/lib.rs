//! Library side of the `readygate` command-line tool.
//!
//! The binary is a thin wrapper; the scenario runner lives here so it can be
//! tested without spawning a process.

pub mod scenario;

pub use scenario::{Fired, NetworkPlan, Report, Scenario, TimedError, TimedEvent, TimedLoad};
