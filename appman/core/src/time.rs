//! Millisecond tick source

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

/// A monotonic millisecond counter that wraps at `u32::MAX`.
///
/// Implementations are read from the main loop and, for strict timers, from
/// the tick interrupt, so they must be `Sync`.
pub trait TickSource: Sync {
    /// Current tick value in milliseconds
    fn now_ms(&self) -> u32;
}

/// Millisecond counter advanced by the 1 ms tick interrupt.
///
/// The count is kept behind a critical section so that 32-bit reads from the
/// main loop never observe a half-written value on targets without native
/// atomic read-modify-write.
pub struct TickCounter {
    ms: Mutex<Cell<u32>>,
}

impl TickCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a counter starting at `ms`
    pub const fn starting_at(ms: u32) -> Self {
        Self {
            ms: Mutex::new(Cell::new(ms)),
        }
    }

    /// Advance by one tick (call from the tick interrupt)
    pub fn increment(&self) {
        self.advance(1);
    }

    /// Advance by `ms` ticks
    pub fn advance(&self, ms: u32) {
        critical_section::with(|cs| {
            let cell = self.ms.borrow(cs);
            cell.set(cell.get().wrapping_add(ms));
        });
    }

    /// Overwrite the current count
    pub fn set(&self, ms: u32) {
        critical_section::with(|cs| self.ms.borrow(cs).set(ms));
    }

    /// Read the current count
    pub fn get(&self) -> u32 {
        critical_section::with(|cs| self.ms.borrow(cs).get())
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for TickCounter {
    fn now_ms(&self) -> u32 {
        self.get()
    }
}

impl fmt::Debug for TickCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TickCounter({}ms)", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_advances_and_wraps() {
        let counter = TickCounter::starting_at(u32::MAX - 1);
        counter.increment();
        assert_eq!(counter.now_ms(), u32::MAX);
        counter.increment();
        assert_eq!(counter.now_ms(), 0);
        counter.advance(10);
        assert_eq!(counter.now_ms(), 10);
    }

    #[test]
    fn counter_set_overrides() {
        let counter = TickCounter::new();
        counter.set(1234);
        assert_eq!(counter.get(), 1234);
    }
}
