//! # Appman POSIX Port
//!
//! Host stand-in for the 1 ms SysTick interrupt. A dedicated thread plays
//! the interrupt: it advances a [`TickCounter`] and runs the strict-timer
//! entry point once per period, while the main thread runs the manager loop.
//!
//! Critical sections come from the `critical-section` crate's `std`
//! implementation, which this crate enables for every host build.

pub mod time;

pub use time::*;

pub use appman_core::TickCounter;
