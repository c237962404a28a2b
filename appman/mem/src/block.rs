//! Message blocks

use appman_core::{AppId, Message, MsgKind};

/// Index of a block inside its mailbox array
pub type BlockIndex = u16;

/// One slot of a message pool.
///
/// A block is always linked into exactly one of its mailbox's two chains,
/// except while its message is being handed to the recipient.
#[derive(Debug, Clone, Copy)]
pub struct MessageBlock<'a> {
    pub(crate) kind: MsgKind,
    pub(crate) payload: &'a [u8],
    pub(crate) next: Option<BlockIndex>,
}

impl<'a> MessageBlock<'a> {
    /// Unused block, for initialising pool arrays
    pub const EMPTY: Self = Self {
        kind: MsgKind(0),
        payload: &[],
        next: None,
    };

    /// Kind of the last message stored in this block
    pub fn kind(&self) -> MsgKind {
        self.kind
    }

    /// Payload of the last message stored in this block
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

impl<'a> Default for MessageBlock<'a> {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A message taken off an inbox, awaiting delivery.
///
/// Its block is out of both chains until the parcel is handed back with
/// [`Mailbox::release`](crate::Mailbox::release).
#[must_use = "a parcel must be released or its block is lost"]
#[derive(Debug)]
pub struct Parcel<'a> {
    pub(crate) origin: *const MessageBlock<'a>,
    pub(crate) index: BlockIndex,
    pub(crate) kind: MsgKind,
    pub(crate) payload: &'a [u8],
}

impl<'a> Parcel<'a> {
    /// Block index this parcel occupies
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Message kind
    pub fn kind(&self) -> MsgKind {
        self.kind
    }

    /// Borrowed payload
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Message view as seen by the recipient `dest`
    pub fn message(&self, dest: AppId) -> Message<'a> {
        Message::new(dest, self.kind, self.payload)
    }
}
