//! Application lifecycle and the context handed to every callback

use appman_core::{AmError, AmResult, AppId, Message};

use crate::post::{self, PostSlot};

/// A cooperative application.
///
/// Every callback runs to completion on the main loop and must neither block
/// nor panic: the whole system's forward progress depends on it returning.
pub trait Application<'a> {
    /// One-time bring-up, called during the first rotation
    fn init(&mut self, ctx: &mut Context<'_, 'a>);

    /// Per-rotation step, called once per rotation after bring-up
    fn run(&mut self, ctx: &mut Context<'_, 'a>);

    /// Tear-down, called by [`Manager::shutdown`](crate::Manager::shutdown)
    fn deinit(&mut self, ctx: &mut Context<'_, 'a>);

    /// Delivery of one inbox message
    fn on_message(&mut self, msg: &Message<'a>, ctx: &mut Context<'_, 'a>);
}

/// What a running callback may do with the rest of the system.
pub struct Context<'c, 'a> {
    app: AppId,
    post: &'c mut [PostSlot<'a>],
}

impl<'c, 'a> Context<'c, 'a> {
    pub(crate) fn new(app: AppId, post: &'c mut [PostSlot<'a>]) -> Self {
        Self { app, post }
    }

    /// Id of the application being called
    pub fn app_id(&self) -> AppId {
        self.app
    }

    /// Send a message to one application or, with [`AppId::ALL`], to all.
    ///
    /// The payload is passed by reference and must stay untouched until the
    /// recipient has handled it.
    pub fn send(&mut self, msg: Message<'a>) -> AmResult<()> {
        post::route(self.post, msg)
    }

    /// Free blocks left in an application's pool
    pub fn free_blocks(&self, id: AppId) -> AmResult<usize> {
        post::find(self.post, id)?
            .mailbox()
            .map(|mailbox| mailbox.free_len())
            .ok_or(AmError::PoolNotConfigured)
    }
}
