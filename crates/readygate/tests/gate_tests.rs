//! Tests for the ready gate and the dependency coordinator.

use std::cell::RefCell;
use std::rc::Rc;

use readygate::{
    Continuation, DocumentReadyState, GatePhase, LifecycleEvent, Page, ReadinessFlags,
    ScriptSignal,
};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn recording(log: &Log, label: &'static str) -> Continuation {
    let log = Rc::clone(log);
    Continuation::new(move || log.borrow_mut().push(label))
}

fn complete(page: &Page, name: &str) {
    page.signal_script_url(&format!("/js/{name}.js"), ScriptSignal::Load)
        .unwrap();
}

#[test]
fn test_no_dependencies_is_ready_without_requests() {
    let page = Page::from_attribute(None).unwrap();
    assert_eq!(
        page.readiness(),
        ReadinessFlags {
            dom_ready: false,
            dependencies_ready: true,
        }
    );
    assert_eq!(page.requested_count(), 0);
    assert!(page.script_sources().is_empty());
}

#[test]
fn test_empty_dep_value_is_immediately_ready() {
    let page = Page::from_attribute(Some("dep=")).unwrap();
    assert_eq!(page.config().dependencies, vec![""]);
    assert!(page.readiness().dependencies_ready);
    assert_eq!(page.requested_count(), 0);
}

#[test]
fn test_trailing_empty_dependency_is_immediately_ready() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a|")).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "ready"));

    assert_eq!(page.config().dependencies, vec!["a", ""]);
    assert_eq!(page.script_sources(), vec!["/js/a.js"]);
    assert!(page.readiness().dependencies_ready);

    page.dispatch(LifecycleEvent::DomContentLoaded);
    assert_eq!(*log.borrow(), vec!["ready"]);
    assert_eq!(page.pending_scripts(), 1);
}

#[test]
fn test_empty_middle_dependency_does_not_change_last() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a||b")).unwrap();
    assert_eq!(page.script_sources(), vec!["/js/a.js", "/js/b.js"]);
    assert!(!page.readiness().dependencies_ready);

    complete(&page, "b");
    assert!(page.readiness().dependencies_ready);
}

#[test]
fn test_dependencies_injected_in_declared_order() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a|b|c")).unwrap();
    assert_eq!(
        page.script_sources(),
        vec!["/js/a.js", "/js/b.js", "/js/c.js"]
    );
}

#[test]
fn test_only_last_dependency_sets_readiness() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a|b|c")).unwrap();

    complete(&page, "a");
    complete(&page, "b");
    assert!(!page.readiness().dependencies_ready);

    complete(&page, "c");
    assert!(page.readiness().dependencies_ready);
}

#[test]
fn test_last_dependency_alone_is_enough() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a|b|c")).unwrap();
    complete(&page, "c");
    assert!(page.readiness().dependencies_ready);
}

#[test]
fn test_initialize_runs_once() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a")).unwrap();
    page.initialize_dependencies().unwrap();
    assert_eq!(page.script_sources(), vec!["/js/a.js"]);
}

#[test]
fn test_dom_ready_first_then_dependencies() {
    let page = Page::from_attribute(Some("jb=/js/&dep=lib")).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "one"));
    page.ready(recording(&log, "two"));

    page.dispatch(LifecycleEvent::DomContentLoaded);
    assert_eq!(page.gate_phase(), GatePhase::Waiting);
    assert!(log.borrow().is_empty());

    // Submissions while waiting are queued, not run.
    page.ready(recording(&log, "three"));
    assert_eq!(page.queued_callbacks(), 3);

    complete(&page, "lib");
    assert_eq!(*log.borrow(), vec!["one", "two", "three"]);
    assert_eq!(page.gate_phase(), GatePhase::Released);
    assert!(page.readiness().is_open());
}

#[test]
fn test_dependencies_first_then_dom_ready() {
    let page = Page::from_attribute(Some("jb=/js/&dep=lib")).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "one"));
    page.ready(recording(&log, "two"));

    complete(&page, "lib");
    assert!(log.borrow().is_empty());
    assert_eq!(page.gate_phase(), GatePhase::Idle);

    page.dispatch(LifecycleEvent::WindowLoad);
    assert_eq!(*log.borrow(), vec!["one", "two"]);
}

#[test]
fn test_callbacks_run_exactly_once_across_all_signals() {
    let page = Page::from_attribute(Some("jb=/js/&dep=lib")).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "once"));

    page.dispatch(LifecycleEvent::DomContentLoaded);
    page.dispatch(LifecycleEvent::ReadyStateChange(DocumentReadyState::Complete));
    complete(&page, "lib");
    complete(&page, "lib");
    page.dispatch(LifecycleEvent::WindowLoad);
    page.poll_dependencies();

    assert_eq!(*log.borrow(), vec!["once"]);
}

#[test]
fn test_submission_after_release_runs_synchronously() {
    let page = Page::from_attribute(None).unwrap();
    page.dispatch(LifecycleEvent::DomContentLoaded);
    assert_eq!(page.gate_phase(), GatePhase::Released);

    let log: Log = Rc::default();
    page.ready(recording(&log, "now"));
    assert_eq!(*log.borrow(), vec!["now"]);
}

#[test]
fn test_interactive_ready_state_does_not_open_gate() {
    let page = Page::from_attribute(None).unwrap();
    page.dispatch(LifecycleEvent::ReadyStateChange(DocumentReadyState::Interactive));
    assert_eq!(page.gate_phase(), GatePhase::Idle);
    assert!(!page.readiness().dom_ready);

    page.dispatch(LifecycleEvent::ReadyStateChange(DocumentReadyState::Complete));
    assert_eq!(page.gate_phase(), GatePhase::Released);
}

#[test]
fn test_stalled_last_dependency_keeps_gate_waiting() {
    let page = Page::from_attribute(Some("jb=/js/&dep=a|b")).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "never"));
    page.dispatch(LifecycleEvent::DomContentLoaded);

    complete(&page, "a");
    page.poll_dependencies();

    assert_eq!(page.gate_phase(), GatePhase::Waiting);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_failing_ready_callback_does_not_block_others() {
    let page = Page::from_attribute(None).unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, "first"));
    page.ready(Continuation::new(|| panic!("broken callback")));
    page.ready(recording(&log, "third"));

    page.dispatch(LifecycleEvent::DomContentLoaded);
    assert_eq!(*log.borrow(), vec!["first", "third"]);
}

#[test]
fn test_callback_submitted_during_release_runs_immediately() {
    let page = Page::from_attribute(None).unwrap();
    let log: Log = Rc::default();
    let weak = page.downgrade();
    let nested_log = Rc::clone(&log);
    page.ready(Continuation::new(move || {
        nested_log.borrow_mut().push("outer");
        if let Some(page) = weak.upgrade() {
            page.ready(recording(&nested_log, "nested"));
        }
    }));
    page.ready(recording(&log, "second"));

    page.dispatch(LifecycleEvent::DomContentLoaded);
    assert_eq!(*log.borrow(), vec!["outer", "nested", "second"]);
}

#[test]
fn test_gate_log_lines() {
    let waiting = Page::from_attribute(Some("jb=/js/&dep=lib")).unwrap();
    waiting.dispatch(LifecycleEvent::DomContentLoaded);
    complete(&waiting, "lib");
    let lines = waiting.log_lines();
    assert!(lines[1].ends_with(": dependencies not loaded, waiting"));
    assert!(lines[2].ends_with(": dependencies loaded, end waiting"));

    let immediate = Page::from_attribute(None).unwrap();
    immediate.dispatch(LifecycleEvent::DomContentLoaded);
    assert!(immediate.log_lines()[0].ends_with(": dependencies loaded, running callbacks"));
}

#[test]
fn test_duplicate_last_dependency_resolves_early() {
    // The last entry repeats an earlier one, so its continuation runs
    // immediately on the registry hit.
    let page = Page::from_attribute(Some("jb=/js/&dep=a|b|a")).unwrap();
    assert!(page.readiness().dependencies_ready);
    assert_eq!(page.script_sources(), vec!["/js/a.js", "/js/b.js"]);
}
