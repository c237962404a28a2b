#![no_std]
#![forbid(unsafe_code)]

//! # Appman Timers
//!
//! Software timers run in one of two disciplines, chosen per timer:
//!
//! - [`TimerMode::Strict`]: counted down by the 1 ms tick interrupt through
//!   [`TimerService::tick`]; the handler runs in interrupt context.
//! - [`TimerMode::Sequential`]: compared against an absolute deadline on
//!   every main-loop pass through [`TimerService::poll`]; the handler runs in
//!   main-loop context.
//!
//! The countdown/deadline of a timer is the only state shared between the
//! interrupt and the main loop; every write to it happens inside a critical
//! section.

use core::fmt;

pub mod service;

pub use service::*;

/// Evaluation discipline of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Decremented once per tick interrupt
    Strict,
    /// Deadline checked once per driving call
    Sequential,
}

/// Lifecycle state of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Created, never started
    Idle,
    /// Counting down
    Running,
    /// Stopped, countdown kept as it was
    Stopped,
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Strict => write!(f, "Strict"),
            TimerMode::Sequential => write!(f, "Sequential"),
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerState::Idle => write!(f, "Idle"),
            TimerState::Running => write!(f, "Running"),
            TimerState::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerMode::Strict => defmt::write!(fmt, "Strict"),
            TimerMode::Sequential => defmt::write!(fmt, "Sequential"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TimerState::Idle => defmt::write!(fmt, "Idle"),
            TimerState::Running => defmt::write!(fmt, "Running"),
            TimerState::Stopped => defmt::write!(fmt, "Stopped"),
        }
    }
}

/// Handle of a created timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u16);

impl TimerId {
    /// Position of the timer in its service
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TimerId({})", self.0);
    }
}

/// Timeout callback.
///
/// The implementor carries whatever context the callback needs. Strict
/// timers call it from the tick interrupt, hence the `Sync` bound; it must
/// return quickly and must not send messages.
pub trait TimerHandler: Sync {
    /// Called each time the timer expires
    fn on_timeout(&self, timer: TimerId);
}

impl<F> TimerHandler for F
where
    F: Fn(TimerId) + Sync,
{
    fn on_timeout(&self, timer: TimerId) {
        self(timer)
    }
}

/// Creation parameters of a timer
#[derive(Clone, Copy)]
pub struct TimerConfig<'a> {
    pub handler: Option<&'a dyn TimerHandler>,
    pub mode: TimerMode,
    pub state: TimerState,
    pub interval_ms: u32,
}

impl<'a> TimerConfig<'a> {
    /// Idle timer with the given mode and interval and no handler yet
    pub const fn new(mode: TimerMode, interval_ms: u32) -> Self {
        Self {
            handler: None,
            mode,
            state: TimerState::Idle,
            interval_ms,
        }
    }

    /// Strict timer with the given interval
    pub const fn strict(interval_ms: u32) -> Self {
        Self::new(TimerMode::Strict, interval_ms)
    }

    /// Sequential timer with the given interval
    pub const fn sequential(interval_ms: u32) -> Self {
        Self::new(TimerMode::Sequential, interval_ms)
    }

    /// Sets the timeout handler
    pub fn handler(mut self, handler: &'a dyn TimerHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Start the timer as soon as it is created
    pub fn running(mut self) -> Self {
        self.state = TimerState::Running;
        self
    }
}

impl<'a> fmt::Debug for TimerConfig<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("handler", &self.handler.is_some())
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("interval_ms", &self.interval_ms)
            .finish()
    }
}

/// Main-loop side of a timer service, as driven by the scheduler.
pub trait TimerPoll {
    /// Evaluate every sequential timer once
    fn poll(&self);
}

impl<'a, const N: usize> TimerPoll for TimerService<'a, N> {
    fn poll(&self) {
        TimerService::poll(self)
    }
}
