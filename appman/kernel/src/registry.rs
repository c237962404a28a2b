//! Registration table of applications and their mailboxes

use core::fmt;

use appman_core::{AmError, AmResult, AppId, Message};
use appman_mem::{Mailbox, MessageBlock};
use heapless::Vec;

use crate::post::PostSlot;
use crate::{Application, Context};

/// Registration request for one application.
pub struct AppDescriptor<'a> {
    pub id: AppId,
    pub name: &'static str,
    pub app: Option<&'a mut dyn Application<'a>>,
    pub pool: Option<&'a mut [MessageBlock<'a>]>,
}

impl<'a> AppDescriptor<'a> {
    /// Empty descriptor for `id`
    pub fn new(id: AppId) -> Self {
        Self {
            id,
            name: "",
            app: None,
            pool: None,
        }
    }

    /// Sets the display name
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sets the lifecycle implementation
    pub fn app(mut self, app: &'a mut dyn Application<'a>) -> Self {
        self.app = Some(app);
        self
    }

    /// Sets the message pool storage; its length is the pool size
    pub fn pool(mut self, blocks: &'a mut [MessageBlock<'a>]) -> Self {
        self.pool = Some(blocks);
        self
    }
}

impl<'a> fmt::Debug for AppDescriptor<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("app", &self.app.is_some())
            .field("pool", &self.pool.as_ref().map(|blocks| blocks.len()))
            .finish()
    }
}

struct AppEntry<'a> {
    app: &'a mut dyn Application<'a>,
}

/// Applications in registration order, with their mailboxes kept in a
/// parallel table so a running application can post to any of them.
pub struct Registry<'a, const N: usize> {
    entries: Vec<AppEntry<'a>, N>,
    post: Vec<PostSlot<'a>, N>,
}

impl<'a, const N: usize> Registry<'a, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Add an application and set up its mailbox.
    ///
    /// The application is registered even if its pool is missing or
    /// unusable; it then runs normally but cannot receive messages, and the
    /// pool error is returned.
    pub fn register(&mut self, desc: AppDescriptor<'a>) -> AmResult<()> {
        let AppDescriptor { id, name, app, pool } = desc;

        let Some(app) = app else {
            log::error!("Application {} has no lifecycle", id);
            return Err(AmError::InvalidParam);
        };
        if name.is_empty() || id.is_broadcast() {
            log::error!("Invalid registration for {}", id);
            return Err(AmError::InvalidParam);
        }
        if self.entries.is_full() {
            log::error!("Registry full, {} rejected", name);
            return Err(AmError::RegistryFull);
        }

        let (mailbox, status) = match pool {
            None => (None, Err(AmError::PoolNotConfigured)),
            Some(blocks) => match Mailbox::new(blocks) {
                Ok(mailbox) => (Some(mailbox), Ok(())),
                Err(err) => (None, Err(err)),
            },
        };
        if let Err(err) = status {
            log::error!("{} message pool error: {}", name, err);
        }

        // Both tables share the capacity checked above
        if self.entries.push(AppEntry { app }).is_err()
            || self.post.push(PostSlot::new(id, name, mailbox)).is_err()
        {
            return Err(AmError::RegistryFull);
        }
        log::info!("{} app created; id:{}", name, id);
        status
    }

    /// Number of registered applications
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no application is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if no more applications fit
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Mailbox table in registration order
    pub fn slots(&self) -> &[PostSlot<'a>] {
        &self.post
    }

    /// First mailbox registered under `id`
    pub fn slot(&self, id: AppId) -> AmResult<&PostSlot<'a>> {
        crate::post::find(&self.post, id)
    }

    /// Queue a message. See [`Context::send`].
    pub fn send(&mut self, msg: Message<'a>) -> AmResult<()> {
        crate::post::route(&mut self.post, msg)
    }

    /// Id of the application at `index`
    pub fn id_at(&self, index: usize) -> Option<AppId> {
        self.post.get(index).map(PostSlot::id)
    }

    /// Run `f` on the application at `index` with a context for it
    pub fn with_app<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn Application<'a>, &mut Context<'_, 'a>) -> R,
    ) -> Option<R> {
        let entry = self.entries.get_mut(index)?;
        let id = self.post.get(index)?.id();
        let mut ctx = Context::new(id, &mut self.post);
        Some(f(&mut *entry.app, &mut ctx))
    }

    /// Hand every queued message of the application at `index` to its
    /// `on_message`, oldest first, returning each block to the free chain
    /// after the handler returns. Returns the number delivered.
    pub fn drain(&mut self, index: usize) -> usize {
        let Some(entry) = self.entries.get_mut(index) else {
            return 0;
        };
        let Some(id) = self.post.get(index).map(PostSlot::id) else {
            return 0;
        };

        let mut delivered = 0;
        while let Some(parcel) = self.post[index]
            .mailbox_mut()
            .and_then(|mailbox| mailbox.take())
        {
            let msg = parcel.message(id);
            {
                let mut ctx = Context::new(id, &mut self.post);
                entry.app.on_message(&msg, &mut ctx);
            }
            if let Some(mailbox) = self.post[index].mailbox_mut() {
                if let Err(err) = mailbox.release(parcel) {
                    log::error!("Block release failed: {}", err);
                }
            }
            delivered += 1;
        }
        delivered
    }
}

impl<'a, const N: usize> Default for Registry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
