//! Tests driving pages through the virtual clock with a simulated network.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use readygate::{
    CompletionStrategy, Continuation, GatePhase, LatencyNetwork, LifecycleEvent, LoadRequest,
    LoaderError, Page, PageOptions, ScriptSignal, Task,
};

type Log = Rc<RefCell<Vec<String>>>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn recording(log: &Log, page: &Page, label: &'static str) -> Continuation {
    let log = Rc::clone(log);
    let weak = page.downgrade();
    Continuation::new(move || {
        let at = weak.upgrade().map(|page| page.now()).unwrap_or_default();
        log.borrow_mut().push(format!("{label}@{}", at.as_millis()));
    })
}

#[test]
fn test_gate_opens_when_slowest_last_dependency_arrives() {
    let network = LatencyNetwork::new(ms(100)).with_latency("/js/b.js", ms(300));
    let page =
        Page::from_attribute_with(Some("jb=/js/&dep=a|b"), PageOptions::default(), network)
            .unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, &page, "ready"));
    page.schedule(ms(50), Task::Lifecycle(LifecycleEvent::DomContentLoaded));

    page.advance_time(ms(200)).unwrap();
    assert_eq!(page.gate_phase(), GatePhase::Waiting);
    assert!(log.borrow().is_empty());

    page.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec!["ready@300"]);
    assert_eq!(page.now(), ms(300));
    assert_eq!(page.pending_scripts(), 0);
}

#[test]
fn test_dependencies_loaded_before_dom_ready() {
    let page = Page::from_attribute_with(
        Some("jb=/js/&dep=a"),
        PageOptions::default(),
        LatencyNetwork::new(ms(10)),
    )
    .unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, &page, "ready"));
    page.schedule(ms(80), Task::Lifecycle(LifecycleEvent::WindowLoad));

    page.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec!["ready@80"]);
}

#[test]
fn test_stalled_last_dependency_never_releases() {
    let network = LatencyNetwork::new(ms(10)).with_stalled("/js/b.js");
    let page =
        Page::from_attribute_with(Some("jb=/js/&dep=a|b"), PageOptions::default(), network)
            .unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, &page, "ready"));
    page.schedule(ms(0), Task::Lifecycle(LifecycleEvent::DomContentLoaded));

    page.run_until_idle().unwrap();
    assert_eq!(page.pending_tasks(), 0);
    assert_eq!(page.pending_scripts(), 1);
    assert_eq!(page.gate_phase(), GatePhase::Waiting);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_ready_state_strategy_end_to_end() {
    let options = PageOptions {
        strategy: CompletionStrategy::ReadyState,
        ..PageOptions::default()
    };
    let page =
        Page::from_attribute_with(Some("jb=/js/&dep=a"), options, LatencyNetwork::new(ms(20)))
            .unwrap();
    let log: Log = Rc::default();
    page.ready(recording(&log, &page, "ready"));
    page.load(&LoadRequest::remote("extra"), recording(&log, &page, "extra"))
        .unwrap();
    page.schedule(ms(0), Task::Lifecycle(LifecycleEvent::DomContentLoaded));

    page.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec!["ready@20", "extra@20"]);
}

#[test]
fn test_script_loaded_by_ready_callback_completes_later() {
    let page = Page::from_attribute_with(
        Some("ujb=/u/"),
        PageOptions::default(),
        LatencyNetwork::new(ms(40)),
    )
    .unwrap();
    let log: Log = Rc::default();
    let weak = page.downgrade();
    let inner = recording(&log, &page, "widget");
    page.ready(Continuation::fallible(move || {
        if let Some(page) = weak.upgrade() {
            page.load(&LoadRequest::local("widget"), inner)?;
        }
        Ok(())
    }));
    page.schedule(ms(10), Task::Lifecycle(LifecycleEvent::DomContentLoaded));

    page.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec!["widget@50"]);
}

#[test]
fn test_advance_time_moves_clock_without_tasks() {
    let page = Page::from_attribute(None).unwrap();
    page.advance_time(ms(25)).unwrap();
    page.advance_to(ms(40)).unwrap();
    assert_eq!(page.now(), ms(40));
    assert_eq!(
        page.advance_to(ms(10)),
        Err(LoaderError::TimeTravel {
            now: ms(40),
            target: ms(10),
        })
    );
}

#[test]
fn test_step_limit_stops_runaway_queue() {
    let options = PageOptions {
        step_limit: 2,
        ..PageOptions::default()
    };
    let page = Page::from_attribute_with(None, options, LatencyNetwork::new(ms(1))).unwrap();
    for _ in 0..3 {
        page.schedule(ms(0), Task::Lifecycle(LifecycleEvent::WindowLoad));
    }

    assert_eq!(
        page.run_until_idle(),
        Err(LoaderError::StepLimit { limit: 2 })
    );
    assert_eq!(page.pending_tasks(), 1);
    // The limit applies per call.
    page.run_until_idle().unwrap();
}

#[test]
fn test_signal_task_for_removed_pending_entry_is_harmless() {
    let page = Page::from_attribute_with(
        Some("jb=/js/"),
        PageOptions::default(),
        LatencyNetwork::new(ms(5)),
    )
    .unwrap();
    let log: Log = Rc::default();
    page.load(&LoadRequest::remote("a"), recording(&log, &page, "a"))
        .unwrap();
    // The host delivers the signal early; the scheduled one finds nothing.
    page.signal_script_url("/js/a.js", ScriptSignal::Load)
        .unwrap();
    page.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec!["a@0"]);
}
