//! Tests for the recent message cache.

use warden_core::{ActorId, ChannelId, MemberInfo, MessageId};
use warden_social::{CachedMessage, RecentMessages};

fn message(content: &str) -> CachedMessage {
    CachedMessage::new(
        ChannelId::new(10),
        MemberInfo::new(ActorId::new(7), "author", false),
        content,
    )
}

#[test]
fn test_oldest_message_is_evicted_first() {
    let recent = RecentMessages::new(2);
    recent.insert(MessageId::new(1), message("one"));
    recent.insert(MessageId::new(2), message("two"));
    recent.insert(MessageId::new(3), message("three"));

    assert_eq!(recent.len(), 2);
    assert!(recent.get(MessageId::new(1)).is_none());
    assert_eq!(
        recent.get(MessageId::new(3)).map(|m| m.content().clone()),
        Some("three".to_string())
    );
}

#[test]
fn test_reinsert_replaces_without_growing() {
    let recent = RecentMessages::new(2);
    recent.insert(MessageId::new(1), message("draft"));
    recent.insert(MessageId::new(1), message("edited"));

    assert_eq!(recent.len(), 1);
    assert_eq!(
        recent.get(MessageId::new(1)).map(|m| m.content().clone()),
        Some("edited".to_string())
    );
}

#[test]
fn test_remove_returns_cached_author() {
    let recent = RecentMessages::new(4);
    recent.insert(MessageId::new(5), message("bye"));

    let removed = recent.remove(MessageId::new(5)).expect("cached");
    assert_eq!(*removed.author().id(), ActorId::new(7));
    assert!(recent.is_empty());
    assert!(recent.remove(MessageId::new(5)).is_none());
}

#[test]
fn test_zero_capacity_caches_nothing() {
    let recent = RecentMessages::new(0);
    recent.insert(MessageId::new(1), message("ignored"));
    assert!(recent.is_empty());
}
