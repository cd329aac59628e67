//! Chat submit flow.

use std::sync::Arc;

use chrono::Local;

use crate::chat::{BotReply, ChatMessage, ChatResponder, FAILURE_REPLY, FALLBACK_REPLY};
use crate::markup::clock_label;
use crate::session::Conversation;

/// Outcome of one submit.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The visitor bubble appended to the transcript.
    pub user: ChatMessage,
    /// The bot bubble produced for this submit.
    pub reply: ChatMessage,
    /// Whether `reply` reached the transcript. `false` means a reply to a
    /// later submit was delivered first and this one was discarded as stale.
    pub delivered: bool,
}

/// The chat widget: one conversation plus an injected bot backend.
///
/// `submit` performs the whole flow of the chat form: trim the input and
/// no-op when empty, append the user bubble stamped with the current clock
/// label, issue exactly one backend request, and turn the outcome into a bot
/// bubble. Backend failures become the fixed failure text; a missing or empty
/// `response` field becomes the fixed fallback text. Nothing serializes
/// overlapping submits; replies arriving out of order are discarded via the
/// conversation's sequence counter.
#[derive(Clone)]
pub struct ChatWidget {
    conversation: Conversation,
    responder: Arc<dyn ChatResponder>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("conversation", &self.conversation.id())
            .finish()
    }
}

impl ChatWidget {
    /// Attach a widget to a conversation.
    #[must_use]
    pub fn new(conversation: Conversation, responder: Arc<dyn ChatResponder>) -> Self {
        Self {
            conversation,
            responder,
        }
    }

    /// The conversation this widget renders into.
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Handle one submit of the chat form.
    ///
    /// Returns `None` without side effects when the trimmed input is empty.
    pub async fn submit(&self, raw: &str) -> Option<Exchange> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let clock = clock_label(&Local::now());
        let user = ChatMessage::user(text, clock.clone());
        self.conversation.push(user.clone());

        let seq = self.conversation.begin_request();
        let result = self
            .responder
            .respond(self.conversation.id(), text)
            .await;

        let reply_text = match result {
            Ok(BotReply { response }) => response
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            Err(error) => {
                tracing::error!(
                    conversation_id = %self.conversation.id(),
                    error = %error,
                    "chat request failed"
                );
                FAILURE_REPLY.to_string()
            }
        };

        // The reply bubble reuses the clock label captured at submit time.
        let reply = ChatMessage::bot(reply_text, clock);
        let delivered = self.conversation.finish_request(seq);
        if delivered {
            self.conversation.push(reply.clone());
        } else {
            tracing::debug!(
                conversation_id = %self.conversation.id(),
                seq,
                "discarding stale chat reply"
            );
        }

        Some(Exchange {
            user,
            reply,
            delivered,
        })
    }
}
