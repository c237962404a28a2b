//! Message and id tests for appman-core

use appman_core::{AmError, AppId, Message, MsgKind, TickCounter, TickSource};

static SPEED: [u8; 2] = [0x00, 0x50];

#[test]
fn test_message_len_follows_payload() {
    let msg = Message::new(AppId::new(1), MsgKind::new(1), &SPEED);
    assert_eq!(msg.len(), 2);
    assert!(!msg.is_empty());
    assert_eq!(msg.payload, &[0x00, 0x50]);
}

#[test]
fn test_empty_payload_is_absent() {
    let msg = Message::new(AppId::ALL, MsgKind::new(0), &[]);
    assert!(msg.is_empty());
}

#[test]
fn test_kind_equality() {
    assert_eq!(MsgKind::new(5), MsgKind(5));
    assert_ne!(MsgKind::new(5), MsgKind::new(6));
}

#[test]
fn test_tick_source_object() {
    let counter = TickCounter::new();
    let source: &dyn TickSource = &counter;
    counter.advance(7);
    assert_eq!(source.now_ms(), 7);
}

#[test]
fn test_error_display() {
    assert_eq!(AmError::NoMsgPool.to_string(), "No free message block");
    assert_eq!(AmError::AppNotFound.to_string(), "Application not found");
}
