//! Single-fire notification.
//!
//! A [`Latch`] starts unset, is set at most once, and hands back its waiters
//! at that moment. The caller runs them after releasing any borrows, which
//! keeps waiters free to call back into the page.

/// A one-way flag with waiters.
#[derive(Debug)]
pub struct Latch<W> {
    set: bool,
    waiters: Vec<W>,
}

impl<W> Latch<W> {
    /// Create an unset latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            set: false,
            waiters: Vec::new(),
        }
    }

    /// Whether the latch has been set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.set
    }

    /// Set the latch. Returns the waiters to notify; empty if the latch was
    /// already set.
    #[must_use]
    pub fn set(&mut self) -> Vec<W> {
        if self.set {
            return Vec::new();
        }
        self.set = true;
        std::mem::take(&mut self.waiters)
    }

    /// Register a waiter. If the latch is already set the waiter is handed
    /// back for the caller to run now.
    #[must_use]
    pub fn subscribe(&mut self, waiter: W) -> Option<W> {
        if self.set {
            Some(waiter)
        } else {
            self.waiters.push(waiter);
            None
        }
    }

    /// Number of waiters still pending.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}

impl<W> Default for Latch<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_waiters_once() {
        let mut latch = Latch::new();
        assert!(latch.subscribe(1).is_none());
        assert!(latch.subscribe(2).is_none());
        assert_eq!(latch.waiting(), 2);

        assert_eq!(latch.set(), vec![1, 2]);
        assert!(latch.is_set());
        assert!(latch.set().is_empty());
    }

    #[test]
    fn test_subscribe_after_set_hands_back() {
        let mut latch = Latch::new();
        let _ = latch.set();
        assert_eq!(latch.subscribe(7), Some(7));
        assert_eq!(latch.waiting(), 0);
    }
}
