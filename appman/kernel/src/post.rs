//! Message routing between application mailboxes

use appman_core::{AmError, AmResult, AppId, Message};
use appman_mem::{Mailbox, PoolStats};

/// Mailbox of one registered application, index-parallel to the registry.
#[derive(Debug)]
pub struct PostSlot<'a> {
    id: AppId,
    name: &'static str,
    mailbox: Option<Mailbox<'a>>,
}

impl<'a> PostSlot<'a> {
    pub(crate) fn new(id: AppId, name: &'static str, mailbox: Option<Mailbox<'a>>) -> Self {
        Self { id, name, mailbox }
    }

    /// Owner of the mailbox
    pub fn id(&self) -> AppId {
        self.id
    }

    /// Owner's name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The mailbox, if the owner registered a valid pool
    pub fn mailbox(&self) -> Option<&Mailbox<'a>> {
        self.mailbox.as_ref()
    }

    pub(crate) fn mailbox_mut(&mut self) -> Option<&mut Mailbox<'a>> {
        self.mailbox.as_mut()
    }

    /// Statistics of the owner's pool
    pub fn stats(&self) -> Option<PoolStats> {
        self.mailbox.as_ref().map(Mailbox::stats)
    }

    fn deliver(&mut self, msg: &Message<'a>) -> AmResult<()> {
        let Some(mailbox) = self.mailbox.as_mut() else {
            log::error!("There is no available MSG POOL for {}", self.name);
            return Err(AmError::NoMsgPool);
        };
        match mailbox.post(msg.kind, msg.payload) {
            Ok(index) => {
                log::trace!("{} queued {} in block {}", self.name, msg.kind, index);
                Ok(())
            }
            Err(err) => {
                log::error!("{} message pool exhausted, {} dropped", self.name, msg.kind);
                Err(err)
            }
        }
    }
}

/// First slot registered under `id`
pub(crate) fn find<'s, 'a>(slots: &'s [PostSlot<'a>], id: AppId) -> AmResult<&'s PostSlot<'a>> {
    slots
        .iter()
        .find(|slot| slot.id == id)
        .ok_or(AmError::AppNotFound)
}

/// Queue `msg` in the recipient's inbox, or in every inbox for a broadcast.
///
/// A broadcast attempts every application in registration order and reports
/// the status of the last attempt.
pub(crate) fn route<'a>(slots: &mut [PostSlot<'a>], msg: Message<'a>) -> AmResult<()> {
    if msg.is_empty() {
        log::debug!("Message {} to {} has no payload", msg.kind, msg.dest);
        return Err(AmError::InvalidParam);
    }

    if msg.dest.is_broadcast() {
        return slots
            .iter_mut()
            .fold(Err(AmError::Generic), |_, slot| slot.deliver(&msg));
    }

    match slots.iter_mut().find(|slot| slot.id == msg.dest) {
        Some(slot) => slot.deliver(&msg),
        None => {
            log::error!("No application with {}", msg.dest);
            Err(AmError::AppNotFound)
        }
    }
}
