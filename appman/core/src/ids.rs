//! Application ids and message kinds

use core::fmt;

/// Identifier of a registered application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppId(pub u8);

impl AppId {
    /// Reserved destination that addresses every registered application
    pub const ALL: AppId = AppId(99);

    /// Create an application id from a raw value
    pub const fn new(id: u8) -> Self {
        AppId(id)
    }

    /// Get the raw id value
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if this is the broadcast destination
    pub const fn is_broadcast(self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_broadcast() {
            write!(f, "AppId(ALL)")
        } else {
            write!(f, "AppId({})", self.0)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AppId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "AppId({})", self.0);
    }
}

/// Tag identifying what a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MsgKind(pub u16);

impl MsgKind {
    /// Create a message kind from a raw value
    pub const fn new(kind: u16) -> Self {
        MsgKind(kind)
    }

    /// Get the raw kind value
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MsgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MsgKind({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MsgKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "MsgKind({})", self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_id_is_reserved() {
        assert!(AppId::ALL.is_broadcast());
        assert!(!AppId::new(0).is_broadcast());
        assert_eq!(AppId::ALL.raw(), 99);
    }
}
