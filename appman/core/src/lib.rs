#![no_std]
#![forbid(unsafe_code)]

//! # Appman Core
//!
//! Core types shared by every layer of the application manager: application
//! ids, message kinds, the message view handed to message handlers, the
//! status codes returned by every fallible operation and the millisecond
//! tick source the timer service runs on.

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod ids;
pub mod message;
pub mod time;

pub use ids::*;
pub use message::*;
pub use time::*;

/// Appman version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status code reported for a successful call.
pub const STATUS_SUCCESS: u8 = 0x00;

/// Result type used throughout appman
pub type AmResult<T> = Result<T, AmError>;

/// Failure statuses of appman operations.
///
/// Each variant maps onto the numeric status code reported over diagnostics
/// (see [`AmError::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmError {
    /// No registered application carries the requested id
    AppNotFound,
    /// The application was registered without a message pool
    PoolNotConfigured,
    /// The handle does not name a created timer
    TimerNotCreated,
    /// The recipient's free chain is empty
    NoMsgPool,
    /// The message pool cannot be carved into blocks
    PoolInvalidSize,
    /// Unspecified failure
    Generic,
    /// A required argument is absent or out of range
    InvalidParam,
    /// A fixed-capacity registry has no room left
    RegistryFull,
}

impl AmError {
    /// Numeric status code of this failure.
    pub const fn code(self) -> u8 {
        match self {
            AmError::AppNotFound => 0x10,
            AmError::PoolNotConfigured => 0x11,
            AmError::TimerNotCreated => 0x20,
            AmError::NoMsgPool => 0x31,
            AmError::PoolInvalidSize => 0x32,
            AmError::Generic => 0x40,
            AmError::InvalidParam => 0x41,
            AmError::RegistryFull => 0x42,
        }
    }

    /// Status code of an arbitrary result, `STATUS_SUCCESS` for `Ok`.
    pub fn status_of<T>(result: &AmResult<T>) -> u8 {
        match result {
            Ok(_) => STATUS_SUCCESS,
            Err(err) => err.code(),
        }
    }
}

impl fmt::Display for AmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmError::AppNotFound => write!(f, "Application not found"),
            AmError::PoolNotConfigured => write!(f, "Message pool not configured"),
            AmError::TimerNotCreated => write!(f, "Timer not created"),
            AmError::NoMsgPool => write!(f, "No free message block"),
            AmError::PoolInvalidSize => write!(f, "Invalid message pool size"),
            AmError::Generic => write!(f, "Generic appman error"),
            AmError::InvalidParam => write!(f, "Invalid parameter"),
            AmError::RegistryFull => write!(f, "Registry is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AmError {}

#[cfg(feature = "defmt")]
impl defmt::Format for AmError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            AmError::AppNotFound => defmt::write!(fmt, "AppNotFound"),
            AmError::PoolNotConfigured => defmt::write!(fmt, "PoolNotConfigured"),
            AmError::TimerNotCreated => defmt::write!(fmt, "TimerNotCreated"),
            AmError::NoMsgPool => defmt::write!(fmt, "NoMsgPool"),
            AmError::PoolInvalidSize => defmt::write!(fmt, "PoolInvalidSize"),
            AmError::Generic => defmt::write!(fmt, "Generic"),
            AmError::InvalidParam => defmt::write!(fmt, "InvalidParam"),
            AmError::RegistryFull => defmt::write!(fmt, "RegistryFull"),
        }
    }
}
