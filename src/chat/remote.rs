//! HTTP chat backend.

use serde_json::json;

use crate::chat::{BotReply, ChatError, ChatResponder};

/// Responder that forwards messages to an external chat API.
///
/// Issues `POST {base}/api/chat` with body `{"message": <text>}` and reads
/// `{"response": <text>}` back. No retry, no timeout beyond the client's
/// defaults.
#[derive(Debug, Clone)]
pub struct RemoteResponder {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteResponder {
    /// Create a responder for the chat API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    /// Full endpoint URL this responder posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatResponder for RemoteResponder {
    async fn respond(&self, _conversation_id: &str, message: &str) -> Result<BotReply, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let reply = response
            .json::<BotReply>()
            .await
            .map_err(|e| ChatError::Malformed(e.to_string()))?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_rooted_at_base_url() {
        assert_eq!(
            RemoteResponder::new("http://bot.internal:8000").endpoint(),
            "http://bot.internal:8000/api/chat"
        );
        assert_eq!(
            RemoteResponder::new("http://bot.internal:8000/").endpoint(),
            "http://bot.internal:8000/api/chat"
        );
    }
}
