//! Nullable clock: deterministic ticks for testing.

use grantfund_types::Tick;
use std::cell::Cell;

/// A deterministic tick source for testing.
///
/// Ticks only advance when you tell them to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    /// Get the current tick.
    pub fn now(&self) -> Tick {
        Tick::new(self.current.get())
    }

    /// Advance by a number of ticks.
    pub fn advance(&self, ticks: u64) {
        self.current.set(self.current.get().saturating_add(ticks));
    }

    /// Set the clock to a specific tick.
    pub fn set(&self, tick: u64) {
        self.current.set(tick);
    }

    /// Jump to an absolute tick and return it.
    pub fn jump_to(&self, tick: Tick) -> Tick {
        self.current.set(tick.as_u64());
        tick
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}
