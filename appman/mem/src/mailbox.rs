//! Per-application message pool and inbox
//!
//! A [`Mailbox`] threads a caller-supplied block array into two singly linked
//! chains that share the same storage:
//!
//! - the **free chain**, holding blocks available to senders, and
//! - the **inbox**, holding messages waiting for delivery in FIFO order.
//!
//! Links are array indices instead of pointers. Popping is O(1) from the
//! head of either chain; appending goes to the tail, so both message delivery
//! and block reuse are first-in first-out.

use appman_core::{AmError, AmResult, MsgKind};

use crate::{BlockIndex, MessageBlock, Parcel, PoolStats};

/// Head/tail pair of one chain
#[derive(Debug, Clone, Copy, Default)]
struct Chain {
    head: Option<BlockIndex>,
    tail: Option<BlockIndex>,
    len: usize,
}

impl Chain {
    fn push_back(&mut self, blocks: &mut [MessageBlock<'_>], index: BlockIndex) {
        blocks[usize::from(index)].next = None;
        match self.tail {
            Some(tail) => blocks[usize::from(tail)].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    fn pop_front(&mut self, blocks: &mut [MessageBlock<'_>]) -> Option<BlockIndex> {
        let head = self.head?;
        let block = &mut blocks[usize::from(head)];
        self.head = block.next.take();
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(head)
    }
}

/// Message pool and inbox of one application.
#[derive(Debug)]
pub struct Mailbox<'a> {
    blocks: &'a mut [MessageBlock<'a>],
    free: Chain,
    inbox: Chain,
    min_free: usize,
}

impl<'a> Mailbox<'a> {
    /// Thread the whole block array into the free chain, in array order.
    ///
    /// Fails with [`AmError::PoolInvalidSize`] when the array is empty or
    /// holds more blocks than a [`BlockIndex`] can address.
    pub fn new(blocks: &'a mut [MessageBlock<'a>]) -> AmResult<Self> {
        let count = blocks.len();
        if count == 0 || count > usize::from(BlockIndex::MAX) + 1 {
            return Err(AmError::PoolInvalidSize);
        }

        let mut free = Chain::default();
        for index in 0..count {
            // count was bounded above, so every index fits
            free.push_back(blocks, index as BlockIndex);
        }

        Ok(Self {
            blocks,
            free,
            inbox: Chain::default(),
            min_free: count,
        })
    }

    /// Queue a message: take the oldest free block, fill it in and append
    /// it to the inbox.
    ///
    /// Fails with [`AmError::NoMsgPool`] when no block is free; nothing is
    /// queued in that case.
    pub fn post(&mut self, kind: MsgKind, payload: &'a [u8]) -> AmResult<BlockIndex> {
        let index = self
            .free
            .pop_front(self.blocks)
            .ok_or(AmError::NoMsgPool)?;
        self.min_free = self.min_free.min(self.free.len);

        let block = &mut self.blocks[usize::from(index)];
        block.kind = kind;
        block.payload = payload;
        self.inbox.push_back(self.blocks, index);
        Ok(index)
    }

    /// Take the oldest queued message off the inbox.
    pub fn take(&mut self) -> Option<Parcel<'a>> {
        let index = self.inbox.pop_front(self.blocks)?;
        let block = &self.blocks[usize::from(index)];
        Some(Parcel {
            origin: self.blocks.as_ptr(),
            index,
            kind: block.kind,
            payload: block.payload,
        })
    }

    /// Return a delivered parcel's block to the tail of the free chain.
    ///
    /// Fails with [`AmError::InvalidParam`] for a parcel taken from another
    /// mailbox; this mailbox is left unchanged and the parcel is dropped.
    pub fn release(&mut self, parcel: Parcel<'a>) -> AmResult<()> {
        if !core::ptr::eq(parcel.origin, self.blocks.as_ptr())
            || usize::from(parcel.index) >= self.blocks.len()
        {
            log::error!("Released block {} does not belong to this pool", parcel.index);
            return Err(AmError::InvalidParam);
        }
        self.free.push_back(self.blocks, parcel.index);
        Ok(())
    }

    /// Blocks available to senders
    pub fn free_len(&self) -> usize {
        self.free.len
    }

    /// Messages waiting for delivery
    pub fn pending(&self) -> usize {
        self.inbox.len
    }

    /// Total number of blocks
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }

    /// Check if no block is free
    pub fn is_exhausted(&self) -> bool {
        self.free.head.is_none()
    }

    /// Current chain lengths and the free chain's low-water mark
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.blocks.len(),
            free: self.free.len,
            queued: self.inbox.len,
            min_free: self.min_free,
        }
    }

    /// Block the next post will use, if any
    pub fn next_free(&self) -> Option<BlockIndex> {
        self.free.head
    }
}
