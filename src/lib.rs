//! Santé maternelle et infantile chatbot
//!
//! A small web application around a French-language maternal and infant
//! health chatbot: an htmx-driven chat page backed by an intent-matching
//! engine, plus a registration form with live field validation.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server rendering pages and htmx fragments
//! - **Chat**: an explicit widget component with an injected bot backend
//! - **Bot**: TF-IDF intent matching over a JSON corpus, with date follow-ups
//! - **Validation**: pure field validators shared by form POST and live probes
//!
//! # Modules
//!
//! - [`bot`]: built-in intent engine and calendar replies
//! - [`chat`]: chat widget, message types, backend trait
//! - [`markup`]: HTML pages and fragments
//! - [`register`]: registration records
//! - [`session`]: conversation transcripts and store
//! - [`validate`]: registration field rules

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod bot;
pub mod chat;
pub mod config;
pub mod markup;
pub mod register;
pub mod server;
pub mod session;
pub mod validate;

use std::sync::Arc;

use crate::chat::ChatResponder;
use crate::register::RegistrationStore;
use crate::session::ConversationStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conversation store backing the chat pages and the history API.
    pub conversations: ConversationStore,
    /// Registrants recorded by the registration form.
    pub registrations: RegistrationStore,
    /// Chat backend answering visitor messages.
    pub responder: Arc<dyn ChatResponder>,
}

impl AppState {
    /// Create fresh state around a chat backend.
    #[must_use]
    pub fn new(responder: Arc<dyn ChatResponder>) -> Self {
        Self {
            conversations: ConversationStore::new(),
            registrations: RegistrationStore::new(),
            responder,
        }
    }
}
