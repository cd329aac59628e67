//! Conversation transcripts and their in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::chat::ChatMessage;

/// Default conversation timeout (30 minutes).
pub const DEFAULT_CONVERSATION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single chat conversation.
///
/// Conversations hold the rendered transcript plus the request bookkeeping
/// the widget needs: the sequence numbers handed to submits and the one of
/// the last delivered reply, which together drive stale-reply discarding.
/// The typing indicator itself is a single static page node raised by htmx
/// while a request is in flight; no server state backs it.
#[derive(Debug)]
pub struct Conversation {
    inner: Arc<ConversationInner>,
}

#[derive(Debug)]
struct ConversationInner {
    /// Unique conversation identifier.
    id: String,
    /// Transcript messages, oldest first.
    messages: RwLock<Vec<ChatMessage>>,
    /// Conversation creation time.
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    /// Last activity time.
    last_activity: RwLock<DateTime<Utc>>,
    /// Sequence number handed to the most recent request.
    next_seq: AtomicU64,
    /// Highest sequence number whose reply reached the transcript.
    delivered_seq: AtomicU64,
}

impl Clone for Conversation {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Conversation {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(ConversationInner {
                id,
                messages: RwLock::new(Vec::new()),
                created_at: now,
                last_activity: RwLock::new(now),
                next_seq: AtomicU64::new(0),
                delivered_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Get the conversation ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Append a message to the transcript.
    pub fn push(&self, message: ChatMessage) {
        let mut guard = self.inner.messages.write().unwrap();
        guard.push(message);
        drop(guard);
        self.touch();
    }

    /// Get a copy of the transcript.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.messages.read().unwrap().clone()
    }

    /// Number of messages in the transcript.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner.messages.read().unwrap().len()
    }

    /// Allocate the sequence number for a new bot request.
    pub fn begin_request(&self) -> u64 {
        self.touch();
        self.inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Register the completion of the request identified by `seq`.
    ///
    /// Returns `false` when a reply for a later request already reached the
    /// transcript, in which case this reply must be discarded.
    pub fn finish_request(&self, seq: u64) -> bool {
        self.touch();
        let mut current = self.inner.delivered_seq.load(Ordering::SeqCst);
        loop {
            if seq <= current {
                return false;
            }
            match self.inner.delivered_seq.compare_exchange(
                current,
                seq,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Update the last activity timestamp.
    fn touch(&self) {
        let mut guard = self.inner.last_activity.write().unwrap();
        *guard = Utc::now();
    }

    /// Check if the conversation has been inactive longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self.inner.last_activity.read().unwrap();
        let now = Utc::now();
        if let Ok(duration) = (now - last).to_std() {
            duration > timeout
        } else {
            // Negative duration means clock skew or "last" is in future.
            false
        }
    }
}

/// Thread-safe store for conversations.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    inner: Arc<ConversationStoreInner>,
}

#[derive(Debug)]
struct ConversationStoreInner {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create a new store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ConversationStoreInner {
                conversations: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new conversation and return it.
    #[must_use]
    pub fn create(&self) -> Conversation {
        let id = Uuid::new_v4().to_string();
        self.create_with_id(id)
    }

    /// Create a new conversation with a specific ID.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Conversation {
        let id = id.into();
        let conversation = Conversation::new(id.clone());
        let mut guard = self.inner.conversations.write().unwrap();
        guard.insert(id, conversation.clone());
        conversation
    }

    /// Get a conversation by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        let guard = self.inner.conversations.read().unwrap();
        guard.get(id).cloned()
    }

    /// Get a conversation by ID, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Conversation {
        {
            let guard = self.inner.conversations.read().unwrap();
            if let Some(conversation) = guard.get(id) {
                return conversation.clone();
            }
        }
        self.create_with_id(id)
    }

    /// Number of live conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.conversations.read().unwrap().len()
    }

    /// Check if there are no conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove conversations inactive longer than the timeout.
    ///
    /// Returns the number of conversations removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.conversations.write().unwrap();
        let before = guard.len();
        guard.retain(|_, conversation| !conversation.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;

    #[test]
    fn transcript_lifecycle() {
        let conversation = Conversation::new("test-123".to_string());

        assert_eq!(conversation.id(), "test-123");
        assert_eq!(conversation.message_count(), 0);

        conversation.push(ChatMessage::user("Bonjour", "9:05"));
        conversation.push(ChatMessage::bot("Bonjour !", "9:05"));
        assert_eq!(conversation.message_count(), 2);

        let messages = conversation.messages();
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Bot);
    }

    #[test]
    fn request_sequencing_discards_stale_replies() {
        let conversation = Conversation::new("seq".to_string());

        let first = conversation.begin_request();
        let second = conversation.begin_request();

        // The later request's reply lands first; the earlier one is stale.
        assert!(conversation.finish_request(second));
        assert!(!conversation.finish_request(first));
    }

    #[test]
    fn store_lifecycle() {
        let store = ConversationStore::new();
        assert!(store.is_empty());

        let conversation = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(conversation.id()).unwrap();
        assert_eq!(retrieved.id(), conversation.id());

        let same = store.get_or_create(conversation.id());
        assert_eq!(store.len(), 1);
        assert_eq!(same.id(), conversation.id());

        let _other = store.get_or_create("fresh-id");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn cleanup_removes_only_expired() {
        let store = ConversationStore::new();
        let _active = store.create();

        let removed = store.cleanup_expired_with_timeout(Duration::from_secs(3600));
        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);

        std::thread::sleep(Duration::from_millis(5));
        let removed = store.cleanup_expired_with_timeout(Duration::from_secs(0));
        assert_eq!(removed, 1);
        assert!(store.is_empty());
    }
}
