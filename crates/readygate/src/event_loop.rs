//! Virtual-clock task queue.
//!
//! [§ 8.1.7 Event loops](https://html.spec.whatwg.org/multipage/webappapis.html#event-loops)
//!
//! The page runs on a single thread with no real timers. Script completion
//! signals, lifecycle events, script errors and the debug panel are queued as
//! [`Task`]s with a due time on a virtual clock the host advances explicitly.
//! Tasks due at the same instant run in the order they were scheduled.

use std::time::Duration;

use readygate_dom::NodeId;

use crate::gate::LifecycleEvent;
use crate::loader::ScriptSignal;

/// Default cap on tasks run by one drive call.
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

/// Work the event loop can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Deliver a completion signal to an injected script element.
    ScriptSignal {
        /// The script element.
        node: NodeId,
        /// The signal to deliver.
        signal: ScriptSignal,
    },
    /// Fire a document/window lifecycle event.
    Lifecycle(LifecycleEvent),
    /// Report an uncaught script error through the global hook.
    ScriptError {
        /// Error message.
        message: String,
        /// Line number reported with the error.
        line: u32,
    },
    /// Render the debug panel from the current log.
    ShowDebugPanel,
}

#[derive(Debug)]
struct Scheduled {
    due_at: Duration,
    order: u64,
    task: Task,
}

/// Ordered queue of scheduled tasks plus the virtual clock.
#[derive(Debug)]
pub struct EventLoop {
    now: Duration,
    next_order: u64,
    queue: Vec<Scheduled>,
    step_limit: usize,
}

impl EventLoop {
    /// Create an empty loop at time zero.
    #[must_use]
    pub const fn new(step_limit: usize) -> Self {
        Self {
            now: Duration::ZERO,
            next_order: 0,
            queue: Vec::new(),
            step_limit,
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Maximum tasks per drive call.
    #[must_use]
    pub const fn step_limit(&self) -> usize {
        self.step_limit
    }

    /// Number of tasks not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: Task) {
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(Scheduled {
            due_at: self.now + delay,
            order,
            task,
        });
    }

    /// Remove the earliest task due at or before `limit` (any task when
    /// `limit` is `None`), moving the clock forward to its due time.
    pub fn pop_due(&mut self, limit: Option<Duration>) -> Option<Task> {
        let index = self.next_index(limit)?;
        let scheduled = self.queue.remove(index);
        if scheduled.due_at > self.now {
            self.now = scheduled.due_at;
        }
        Some(scheduled.task)
    }

    /// Whether a task is due at or before `limit` (any task when `None`).
    #[must_use]
    pub fn has_due(&self, limit: Option<Duration>) -> bool {
        self.next_index(limit).is_some()
    }

    fn next_index(&self, limit: Option<Duration>) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, scheduled)| limit.is_none_or(|limit| scheduled.due_at <= limit))
            .min_by_key(|(_, scheduled)| (scheduled.due_at, scheduled.order))
            .map(|(index, _)| index)
    }

    /// Move the clock forward to `target` without running anything.
    pub fn set_now(&mut self, target: Duration) {
        if target > self.now {
            self.now = target;
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_LIMIT)
    }
}
