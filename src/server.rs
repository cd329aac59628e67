//! HTTP surface: pages, JSON API, and htmx fragment endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::chat::{ChatResponder, ChatWidget};
use crate::config::AppConfig;
use crate::markup::{self, RegisterFormView};
use crate::register::RegisterForm;
use crate::session::DEFAULT_CONVERSATION_TIMEOUT;
use crate::validate::{validate_name, validate_phone};

/// How often expired conversations are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/api/chat", post(api_chat))
        .route("/api/history", get(api_history))
        // HTMX fragments
        .route("/chat/send", post(chat_send))
        .route("/register/validate", post(register_validate))
        // HTML pages and form posts
        .route("/", get(register_page_handler))
        .route("/register", post(register_submit))
        .route("/home", get(chat_page_handler))
        .route("/healthz", get(healthz))
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with the provided configuration and chat backend.
pub async fn start_server(
    config: Arc<AppConfig>,
    responder: Arc<dyn ChatResponder>,
) -> anyhow::Result<()> {
    let state = AppState::new(responder);

    // Sweep inactive conversations in the background.
    let conversations = state.conversations.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            tick.tick().await;
            let removed =
                conversations.cleanup_expired_with_timeout(DEFAULT_CONVERSATION_TIMEOUT);
            if removed > 0 {
                tracing::debug!(removed, "expired conversations removed");
            }
        }
    });

    let app = build_router(state);
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %address,
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Registration page.
async fn register_page_handler() -> impl IntoResponse {
    Html(markup::register_page(&RegisterFormView::default()))
}

/// Chat page. Each page load opens a fresh conversation whose id is embedded
/// in the form.
async fn chat_page_handler(State(state): State<AppState>) -> impl IntoResponse {
    let conversation = state.conversations.create();
    Html(markup::chat_page(conversation.id()))
}

/// Liveness probe.
async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat API
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// User message content.
    message: Option<String>,
    /// Optional conversation ID (creates a new one if not provided).
    #[serde(default)]
    conversation_id: Option<String>,
}

/// Response from the chat API.
#[derive(Debug, Serialize)]
struct ChatApiResponse {
    /// Bot answer.
    response: String,
    /// Conversation ID for follow-up messages.
    conversation_id: String,
}

/// Error body for rejected chat requests.
#[derive(Debug, Serialize)]
struct ApiError {
    error: &'static str,
}

/// POST /api/chat - answer one message.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatApiResponse>, (StatusCode, Json<ApiError>)> {
    let Some(message) = req.message else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Message non fourni",
            }),
        ));
    };

    if message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Message vide",
            }),
        ));
    }

    tracing::info!(
        message_length = message.len(),
        conversation_id = ?req.conversation_id,
        "Received chat request"
    );

    let conversation = match req.conversation_id.as_deref() {
        Some(id) if !id.is_empty() => state.conversations.get_or_create(id),
        _ => state.conversations.create(),
    };

    let widget = ChatWidget::new(conversation.clone(), Arc::clone(&state.responder));
    let Some(exchange) = widget.submit(&message).await else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "Message vide",
            }),
        ));
    };

    Ok(Json(ChatApiResponse {
        response: exchange.reply.text,
        conversation_id: conversation.id().to_string(),
    }))
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
struct HistoryQuery {
    /// Conversation ID.
    conversation_id: String,
}

/// Message DTO for history responses.
#[derive(Debug, Serialize)]
struct MessageDto {
    content: String,
    timestamp: String,
    clock: String,
    is_from_user: bool,
}

/// GET /api/history - transcript of one conversation.
async fn api_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    match state.conversations.get(&query.conversation_id) {
        Some(conversation) => {
            let messages = conversation
                .messages()
                .iter()
                .map(|m| MessageDto {
                    content: m.text.clone(),
                    timestamp: m.sent_at.to_rfc3339(),
                    clock: m.clock.clone(),
                    is_from_user: m.is_from_user(),
                })
                .collect();
            Ok(Json(messages))
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTMX Fragments
// ─────────────────────────────────────────────────────────────────────────────

/// Form body of the chat page's submit.
#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

/// POST /chat/send - run one submit and return the appended bubbles.
async fn chat_send(State(state): State<AppState>, Form(form): Form<SendForm>) -> Response {
    let conversation = match form.conversation_id.as_deref() {
        Some(id) if !id.is_empty() => state.conversations.get_or_create(id),
        _ => state.conversations.create(),
    };

    let widget = ChatWidget::new(conversation, Arc::clone(&state.responder));
    let Some(exchange) = widget.submit(&form.message).await else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let mut fragment = markup::user_bubble(&exchange.user);
    fragment.push('\n');
    fragment.push_str(&markup::bot_bubble(&exchange.reply));
    Html(fragment).into_response()
}

/// Form body of a live-validation probe.
///
/// Probes always name the field they validate; any other form fields that
/// ride along in the body are ignored.
#[derive(Debug, Deserialize)]
struct ValidateForm {
    /// Which field to validate: `name` or `phone`.
    #[serde(default)]
    field: String,
    /// Current value of that field.
    #[serde(default)]
    value: String,
}

/// POST /register/validate - re-render one field-error element.
async fn register_validate(Form(form): Form<ValidateForm>) -> Result<Html<String>, StatusCode> {
    match form.field.as_str() {
        "name" => Ok(Html(markup::field_error(validate_name(&form.value).err()))),
        "phone" => Ok(Html(markup::field_error(validate_phone(&form.value).err()))),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// POST /register - validate and record a registration.
///
/// Invalid input re-renders the form with inline errors and focus on the
/// first invalid field; success redirects to the chat page.
async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let mut view = RegisterFormView {
        name_value: &form.name,
        phone_value: &form.phone,
        name_error: validate_name(&form.name).err(),
        phone_error: validate_phone(&form.phone).err(),
    };

    if !view.is_valid() {
        return Html(markup::register_page(&view)).into_response();
    }

    match state.registrations.register(&form.name, &form.phone) {
        Ok(registrant) => {
            info!(
                name: "registration.created",
                phone = %registrant.phone,
                "Registrant recorded"
            );
            Redirect::to("/home").into_response()
        }
        Err(message) => {
            view.phone_error = Some(message);
            Html(markup::register_page(&view)).into_response()
        }
    }
}
