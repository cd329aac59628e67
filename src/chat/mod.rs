//! Chat widget and bot transport abstractions.
//!
//! The widget in [`widget`] owns the submit flow described by the chat page:
//! it renders the user's message into the conversation transcript, issues one
//! request through a [`ChatResponder`], and turns the outcome into a bot
//! bubble. The responder seam lets the same widget run against the built-in
//! intent engine, a remote chat API, or a test fake.
//!
//! # Components
//!
//! - [`ChatWidget`]: the submit flow, with stale-reply discarding
//! - [`RemoteResponder`]: HTTP responder for an external `/api/chat` backend

pub mod remote;
pub mod widget;

pub use remote::RemoteResponder;
pub use widget::{ChatWidget, Exchange};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bot bubble text when the backend answers without a usable `response` field.
pub const FALLBACK_REPLY: &str = "Désolé, je n'ai pas de réponse pour le moment.";

/// Bot bubble text when the request fails outright.
pub const FAILURE_REPLY: &str = "Désolé, une erreur est survenue. Veuillez réessayer plus tard.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the visitor.
    User,
    /// Message produced by the bot backend.
    Bot,
}

/// A single rendered chat message.
///
/// `clock` is the short `H:MM` label shown inside the bubble; it is captured
/// when the user submits, and the bot reply reuses the label of the submit
/// that produced it. `sent_at` is the full timestamp used by the history API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub sender: Sender,
    /// Raw message text (escaped at render time, not here).
    pub text: String,
    /// Short clock label, e.g. `9:05` or `14:30`.
    pub clock: String,
    /// Full timestamp.
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message stamped now.
    #[must_use]
    pub fn user(text: impl Into<String>, clock: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            clock: clock.into(),
            sent_at: Utc::now(),
        }
    }

    /// Create a bot message stamped now.
    #[must_use]
    pub fn bot(text: impl Into<String>, clock: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            clock: clock.into(),
            sent_at: Utc::now(),
        }
    }

    /// Whether the message came from the visitor.
    #[must_use]
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Payload produced by a chat backend.
///
/// `response` mirrors the `/api/chat` wire field; `None` (or an empty string)
/// makes the widget fall back to [`FALLBACK_REPLY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotReply {
    /// Bot answer text, if the backend produced one.
    pub response: Option<String>,
}

impl BotReply {
    /// Wrap an answer text.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            response: Some(s.into()),
        }
    }
}

/// Errors raised by chat backends.
///
/// Every variant is absorbed into the fixed failure bubble; none of them is
/// surfaced to the visitor beyond that message.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Status(u16),

    /// The backend answered with a body that is not the expected shape.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// A chat backend.
///
/// Implementations answer one message within an identified conversation.
/// The conversation id lets stateful backends keep per-conversation dialog
/// state; stateless backends may ignore it.
#[async_trait::async_trait]
pub trait ChatResponder: Send + Sync {
    /// Produce a reply to `message`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be reached or answers with
    /// an unusable payload.
    async fn respond(&self, conversation_id: &str, message: &str) -> Result<BotReply, ChatError>;
}
