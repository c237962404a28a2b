//! Message view passed between applications

use crate::{AppId, MsgKind};

/// A message addressed to one application or to [`AppId::ALL`].
///
/// The payload is borrowed, never copied: it must stay alive for `'a`, which
/// covers the whole time the message waits in the recipient's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    /// Destination application
    pub dest: AppId,
    /// What the payload carries
    pub kind: MsgKind,
    /// Borrowed payload bytes
    pub payload: &'a [u8],
}

impl<'a> Message<'a> {
    /// Create a new message
    pub const fn new(dest: AppId, kind: MsgKind, payload: &'a [u8]) -> Self {
        Self {
            dest,
            kind,
            payload,
        }
    }

    /// Payload length in bytes
    pub const fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is absent
    pub const fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(feature = "defmt")]
impl<'a> defmt::Format for Message<'a> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Message{{ dest: {}, kind: {}, len: {} }}",
            self.dest,
            self.kind,
            self.payload.len()
        );
    }
}
