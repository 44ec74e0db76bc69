//! Loader warnings with colored terminal output.
//!
//! Provides deduplication so a host that re-reads the same configuration
//! does not see the same complaint twice. The loader itself stays silent on
//! malformed input; only the CLI surfaces these.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record a warning and report whether it is new.
///
/// Returns `true` the first time a `(component, message)` pair is seen.
/// A poisoned lock is recovered; the set only ever grows.
#[must_use]
pub fn note_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about a suspicious input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Config", "ignored entry 'foo' (no '=')");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if note_once(component, message) {
        eprintln!("{}", format!("[readygate {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call when bootstrapping a new page)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
