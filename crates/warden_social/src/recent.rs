//! Bounded cache of recently posted messages.

use derive_getters::Getters;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use warden_core::{ChannelId, MemberInfo, MessageId};

/// What the gateway no longer tells us once a message is gone.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CachedMessage {
    channel: ChannelId,
    author: MemberInfo,
    content: String,
}

impl CachedMessage {
    /// Describe a cached message.
    pub fn new(channel: ChannelId, author: MemberInfo, content: impl Into<String>) -> Self {
        Self {
            channel,
            author,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    messages: HashMap<MessageId, CachedMessage>,
    order: VecDeque<MessageId>,
}

/// Remembers the newest `capacity` messages, evicting the oldest first.
#[derive(Debug)]
pub struct RecentMessages {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RecentMessages {
    /// Cache holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Remember a message, replacing an earlier version with the same id.
    pub fn insert(&self, id: MessageId, message: CachedMessage) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.messages.insert(id, message).is_none() {
            inner.order.push_back(id);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.messages.remove(&oldest);
            }
        }
    }

    /// Cached copy of a message.
    pub fn get(&self, id: MessageId) -> Option<CachedMessage> {
        self.inner.lock().messages.get(&id).cloned()
    }

    /// Forget a message and return what was cached.
    pub fn remove(&self, id: MessageId) -> Option<CachedMessage> {
        let mut inner = self.inner.lock();
        let removed = inner.messages.remove(&id)?;
        inner.order.retain(|m| *m != id);
        Some(removed)
    }

    /// Number of cached messages.
    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
