#![no_std]
#![forbid(unsafe_code)]

//! # Appman Kernel
//!
//! Cooperative application manager. A fixed set of applications is
//! registered once; a single driving call, [`Manager::process`], then
//! advances the round-robin scheduler by one application, drains one inbox
//! and sweeps the sequential timers.
//!
//! The scheduler runs in two global phases. During [`Phase::Bringup`] each
//! application's `init` runs once, in registration order; after the first
//! full rotation the manager switches for good to [`Phase::Run`] and calls
//! `run` on every application once per rotation.
//!
//! Everything in this crate belongs to the main loop. Message sending and
//! scheduling must never be invoked from interrupt context; only the timer
//! service's [`tick`](appman_timer::TimerService::tick) is interrupt-safe.

pub mod app;
pub mod config;
pub mod post;
pub mod registry;
pub mod scheduler;

pub use appman_core::*;
pub use appman_mem::{Mailbox, MessageBlock, PoolStats};
pub use appman_timer::{
    TimerConfig, TimerHandler, TimerId, TimerMode, TimerPoll, TimerService, TimerState,
};

pub use app::*;
pub use config::*;
pub use post::PostSlot;
pub use registry::*;
pub use scheduler::*;

/// Default number of applications a manager can hold
pub const DEFAULT_MAX_APPS: usize = 8;
