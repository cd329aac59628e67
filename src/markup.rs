//! HTML rendering.
//!
//! Pages and fragments are plain strings assembled with `format!`, so every
//! piece the chat widget or the registration form produces can be asserted on
//! in tests without a browser. All user- and bot-supplied text goes through
//! [`escape_html`] before it is spliced into markup.

use chrono::Timelike;

use crate::chat::ChatMessage;

/// DOM id of the typing-indicator node on the chat page.
pub const TYPING_ID: &str = "bot-typing";

/// Escape the HTML-sensitive characters `& < > " '`.
///
/// `&` is replaced first so already-escaped entities are not double-mangled
/// the other way around.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Short bubble clock label: 24-hour hour without leading zero, zero-padded
/// minutes.
#[must_use]
pub fn clock_label<T: Timelike>(time: &T) -> String {
    format!("{}:{:02}", time.hour(), time.minute())
}

/// Right-aligned visitor bubble.
#[must_use]
pub fn user_bubble(message: &ChatMessage) -> String {
    format!(
        r#"<div class="d-flex justify-content-end mb-4">
  <div class="msg_container_send">{text}<span class="msg_time_send">{clock}</span></div>
  <div class="img_cont_msg"><span class="user_img_msg">Vous</span></div>
</div>"#,
        text = escape_html(&message.text),
        clock = escape_html(&message.clock),
    )
}

/// Left-aligned bot bubble.
#[must_use]
pub fn bot_bubble(message: &ChatMessage) -> String {
    format!(
        r#"<div class="d-flex justify-content-start mb-4">
  <div class="img_cont_msg"><span class="user_img_msg">Bot</span></div>
  <div class="msg_container">{text}<span class="msg_time">{clock}</span></div>
</div>"#,
        text = escape_html(&message.text),
        clock = escape_html(&message.clock),
    )
}

/// The single typing-indicator node.
///
/// It lives in the page permanently with the `htmx-indicator` class; htmx
/// raises it while a `/chat/send` request is in flight, which keeps exactly
/// one indicator between submit and response.
#[must_use]
pub fn typing_indicator() -> String {
    format!(
        r#"<div id="{TYPING_ID}" class="htmx-indicator d-flex justify-content-start mb-4">
  <div class="img_cont_msg"><span class="user_img_msg">Bot</span></div>
  <div class="msg_container"><em>Le bot réfléchit...</em></div>
</div>"#
    )
}

/// Field-error element rendered under a registration input.
#[must_use]
pub fn field_error(message: Option<&str>) -> String {
    match message {
        Some(text) => format!(
            r#"<div class="field-error">{}</div>"#,
            escape_html(text)
        ),
        None => r#"<div class="field-error"></div>"#.to_string(),
    }
}

/// Generate the HTML shell for a page.
fn page_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>

    <!-- HTMX (local) -->
    <script src="/static/vendor/htmx.min.js"></script>

    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <main id="app" class="container">
{content}
    </main>
</body>
</html>"#
    )
}

/// Chat page.
///
/// The form posts to the fragment endpoint; returned bubbles are appended to
/// `#messageFormeight`, the indicator is raised while the request is in
/// flight, and the container is scrolled to its bottom after every append.
#[must_use]
pub fn chat_page(conversation_id: &str) -> String {
    let content = format!(
        r#"<div class="chat-card">
  <div id="messageFormeight" class="chat-body"></div>
  {indicator}
  <form id="messageArea"
        hx-post="/chat/send"
        hx-target="#messageFormeight"
        hx-swap="beforeend"
        hx-indicator="#{TYPING_ID}"
        hx-on::after-request="this.reset(); var b = document.getElementById('messageFormeight'); b.scrollTop = b.scrollHeight;">
    <input type="hidden" name="conversation_id" value="{id}">
    <input type="text" id="text" name="message" placeholder="Écrivez votre message..." autocomplete="off">
    <button type="submit">Envoyer</button>
  </form>
</div>"#,
        indicator = typing_indicator(),
        id = escape_html(conversation_id),
    );
    page_shell("Santé maternelle et infantile chatbot", &content)
}

/// View state for the registration form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterFormView<'a> {
    /// Submitted name value, re-rendered on failure.
    pub name_value: &'a str,
    /// Submitted phone value, re-rendered on failure.
    pub phone_value: &'a str,
    /// Latest name validation error, if any.
    pub name_error: Option<&'a str>,
    /// Latest phone validation error, if any.
    pub phone_error: Option<&'a str>,
}

impl RegisterFormView<'_> {
    /// Whether both fields passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.name_error.is_none() && self.phone_error.is_none()
    }
}

/// Registration page.
///
/// Each input carries an htmx trigger for live validation and is followed by
/// its field-error element. Both inputs share the form, so every probe names
/// its own field explicitly (`field` + `value`) and scopes the form's fields
/// out of the request. On a failed submit the first invalid field (name
/// before phone) receives `autofocus`.
#[must_use]
pub fn register_page(view: &RegisterFormView<'_>) -> String {
    let name_focus = if view.name_error.is_some() {
        " autofocus"
    } else {
        ""
    };
    let phone_focus = if view.name_error.is_none() && view.phone_error.is_some() {
        " autofocus"
    } else {
        ""
    };
    let content = format!(
        r#"<h1>Inscription au chatbot</h1>
<form action="/register" method="post" novalidate>
  <label for="name">Nom</label>
  <input type="text" id="name" name="name" value="{name_value}" class="{name_class}"
         hx-post="/register/validate" hx-trigger="input changed delay:300ms"
         hx-vals='js:{{field: "name", value: this.value}}' hx-params="not name,phone"
         hx-target="next .field-error" hx-swap="outerHTML"{name_focus}>
  {name_error}
  <label for="phone">Téléphone</label>
  <input type="text" id="phone" name="phone" value="{phone_value}" class="{phone_class}"
         placeholder="+226 5614 1234"
         hx-post="/register/validate" hx-trigger="input changed delay:300ms"
         hx-vals='js:{{field: "phone", value: this.value}}' hx-params="not name,phone"
         hx-target="next .field-error" hx-swap="outerHTML"{phone_focus}>
  {phone_error}
  <button type="submit">S&#039;inscrire</button>
</form>"#,
        name_value = escape_html(view.name_value),
        phone_value = escape_html(view.phone_value),
        name_class = if view.name_error.is_some() { "invalid" } else { "" },
        phone_class = if view.phone_error.is_some() { "invalid" } else { "" },
        name_error = field_error(view.name_error),
        phone_error = field_error(view.phone_error),
    );
    page_shell("Inscription au chatbot", &content)
}
