#![no_std]
#![forbid(unsafe_code)]

//! # Appman Memory Management
//!
//! Fixed-size message blocks and the per-application mailbox that carves a
//! caller-owned block array into a free chain and an inbox chain. Nothing
//! here allocates: the block count is fixed when the mailbox is built and
//! never grows or shrinks.

pub mod block;
pub mod mailbox;

pub use block::*;
pub use mailbox::*;

/// Snapshot of one mailbox's chains, taken by
/// [`Mailbox::stats`](crate::Mailbox::stats).
///
/// Blocks that are neither free nor queued are out for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    /// Length of the free chain
    pub free: usize,
    /// Length of the inbox
    pub queued: usize,
    /// Shortest the free chain has been since the mailbox was built
    pub min_free: usize,
}

impl PoolStats {
    /// Blocks off the free chain
    pub const fn in_use(&self) -> usize {
        self.capacity - self.free
    }

    pub const fn is_exhausted(&self) -> bool {
        self.free == 0
    }

    pub const fn is_idle(&self) -> bool {
        self.free == self.capacity
    }

    /// Peak usage as a percentage of capacity
    pub fn peak_utilization(&self) -> u8 {
        match self.capacity {
            0 => 0,
            capacity => ((capacity - self.min_free) * 100 / capacity) as u8,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PoolStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PoolStats{{ capacity: {}, free: {}, queued: {}, min_free: {} }}",
            self.capacity,
            self.free,
            self.queued,
            self.min_free
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_utilization() {
        let stats = PoolStats {
            capacity: 4,
            free: 3,
            queued: 1,
            min_free: 1,
        };
        assert_eq!(stats.in_use(), 1);
        assert_eq!(stats.peak_utilization(), 75);
        assert!(!stats.is_idle());
        assert!(!stats.is_exhausted());
    }
}
