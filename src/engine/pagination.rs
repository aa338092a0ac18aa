//! Stagnation detection for pagination loops.
//!
//! Both engines drive an unbounded "load more" loop and need a uniform rule
//! for when to stop: a cycle counts as stalled only when its progress signal
//! did not move AND no pagination control was successfully clicked. Any
//! progress resets the streak.

/// Tracks consecutive no-progress pagination cycles.
#[derive(Debug)]
pub struct StagnationTracker {
    limit: u32,
    stalled: u32,
    last_signal: u64,
}

impl StagnationTracker {
    /// `limit` is how many consecutive stalled cycles end the loop.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            stalled: 0,
            last_signal: 0,
        }
    }

    /// Record one cycle's outcome. `signal` is the engine's progress measure
    /// (link count, page height); `clicked` is whether a pagination control
    /// was actually activated this cycle. Returns true once the stall streak
    /// reaches the limit.
    pub fn observe(&mut self, signal: u64, clicked: bool) -> bool {
        if signal == self.last_signal && !clicked {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.last_signal = signal;
        self.stalled >= self.limit
    }

    #[must_use]
    pub fn stalled(&self) -> u32 {
        self.stalled
    }
}
