//! Mailbox tests for appman-mem

use appman_core::{AmError, AppId, MsgKind};
use appman_mem::{Mailbox, MessageBlock, PoolStats};

static PAYLOAD: [u8; 3] = [0x12, 0x34, 0x56];

fn conserved(mailbox: &Mailbox<'_>) -> bool {
    mailbox.free_len() + mailbox.pending() == mailbox.capacity()
}

#[test]
fn test_conservation_across_traffic() {
    let mut blocks = [MessageBlock::EMPTY; 5];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    for round in 0..20u16 {
        for _ in 0..(round % 4) {
            let _ = mailbox.post(MsgKind(round), &PAYLOAD);
            assert!(conserved(&mailbox));
        }
        while let Some(parcel) = mailbox.take() {
            assert!(mailbox.free_len() + mailbox.pending() == mailbox.capacity() - 1);
            mailbox.release(parcel).unwrap();
            assert!(conserved(&mailbox));
        }
    }
    assert_eq!(mailbox.free_len(), 5);
}

#[test]
fn test_freed_blocks_reused_oldest_first() {
    let mut blocks = [MessageBlock::EMPTY; 3];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    // Occupy blocks 0 and 1; free chain is now [2]
    assert_eq!(mailbox.post(MsgKind(1), &PAYLOAD), Ok(0));
    assert_eq!(mailbox.post(MsgKind(2), &PAYLOAD), Ok(1));

    // Deliver both: they are appended behind block 2
    let first = mailbox.take().unwrap();
    mailbox.release(first).unwrap();
    let second = mailbox.take().unwrap();
    mailbox.release(second).unwrap();

    // Free chain is [2, 0, 1], not [1, 0, 2]
    assert_eq!(mailbox.post(MsgKind(3), &PAYLOAD), Ok(2));
    assert_eq!(mailbox.post(MsgKind(4), &PAYLOAD), Ok(0));
    assert_eq!(mailbox.post(MsgKind(5), &PAYLOAD), Ok(1));
}

#[test]
fn test_fill_to_capacity_then_exhausted() {
    let mut blocks = [MessageBlock::EMPTY; 4];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    for kind in 0..4 {
        mailbox.post(MsgKind(kind), &PAYLOAD).unwrap();
    }
    assert!(mailbox.is_exhausted());
    assert_eq!(mailbox.post(MsgKind(9), &PAYLOAD), Err(AmError::NoMsgPool));
    assert_eq!(mailbox.pending(), 4);
}

#[test]
fn test_parcel_message_view() {
    let mut blocks = [MessageBlock::EMPTY; 2];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    mailbox.post(MsgKind(7), &PAYLOAD).unwrap();
    let parcel = mailbox.take().unwrap();
    let msg = parcel.message(AppId::new(3));
    assert_eq!(msg.dest, AppId::new(3));
    assert_eq!(msg.kind, MsgKind(7));
    assert_eq!(msg.len(), 3);
    assert_eq!(msg.payload, &PAYLOAD);
    mailbox.release(parcel).unwrap();
}

#[test]
fn test_stats_track_low_water_mark() {
    let mut blocks = [MessageBlock::EMPTY; 4];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    mailbox.post(MsgKind(1), &PAYLOAD).unwrap();
    mailbox.post(MsgKind(1), &PAYLOAD).unwrap();
    mailbox.post(MsgKind(1), &PAYLOAD).unwrap();
    while let Some(parcel) = mailbox.take() {
        mailbox.release(parcel).unwrap();
    }

    let stats = mailbox.stats();
    assert_eq!(
        stats,
        PoolStats {
            capacity: 4,
            free: 4,
            queued: 0,
            min_free: 1,
        }
    );
    assert!(stats.is_idle());
    assert_eq!(stats.peak_utilization(), 75);
}

#[test]
fn test_stats_follow_chains() {
    let mut blocks = [MessageBlock::EMPTY; 3];
    let mut mailbox = Mailbox::new(&mut blocks).unwrap();

    mailbox.post(MsgKind(1), &PAYLOAD).unwrap();
    mailbox.post(MsgKind(2), &PAYLOAD).unwrap();
    let parcel = mailbox.take().unwrap();

    // One block queued, one out for delivery
    let stats = mailbox.stats();
    assert_eq!((stats.free, stats.queued, stats.in_use()), (1, 1, 2));

    mailbox.release(parcel).unwrap();
    assert_eq!(mailbox.stats().free, 2);
    assert_eq!(mailbox.stats().min_free, 1);
}

#[test]
fn test_release_rejects_parcel_from_other_mailbox() {
    let mut blocks_a = [MessageBlock::EMPTY; 2];
    let mut blocks_b = [MessageBlock::EMPTY; 2];
    let mut a = Mailbox::new(&mut blocks_a).unwrap();
    let mut b = Mailbox::new(&mut blocks_b).unwrap();

    a.post(MsgKind(1), &PAYLOAD).unwrap();
    a.post(MsgKind(2), &PAYLOAD).unwrap();
    let foreign = a.take().unwrap();

    assert_eq!(b.release(foreign), Err(AmError::InvalidParam));
    assert_eq!(b.free_len(), 2);
    assert!(conserved(&b));

    // b still hands out exactly its own two blocks
    assert_eq!(b.post(MsgKind(3), &PAYLOAD), Ok(0));
    assert_eq!(b.post(MsgKind(4), &PAYLOAD), Ok(1));
    assert_eq!(b.post(MsgKind(5), &PAYLOAD), Err(AmError::NoMsgPool));
    assert!(conserved(&b));

    // a is untouched apart from the parcel that was taken
    assert_eq!(a.free_len() + a.pending(), a.capacity() - 1);
    let own = a.take().unwrap();
    assert_eq!(a.release(own), Ok(()));
    assert_eq!(a.free_len(), 1);
}
