//! Server entry point.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sante_chat::bot::IntentEngine;
use sante_chat::chat::{ChatResponder, RemoteResponder};
use sante_chat::config::AppConfig;
use sante_chat::server::start_server;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(config) => Arc::new(config),
        Err(error) => {
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };

    let responder: Arc<dyn ChatResponder> = match &config.chat.remote_url {
        Some(url) => {
            let remote = RemoteResponder::new(url);
            info!(
                name: "chat.backend.remote",
                endpoint = %remote.endpoint(),
                "Forwarding chat messages to a remote backend"
            );
            Arc::new(remote)
        }
        None => {
            let engine = match IntentEngine::load_from_file(
                &config.bot.corpus_path,
                config.bot.score_threshold,
            ) {
                Ok(engine) => engine,
                Err(error) => {
                    eprintln!("Corpus error: {error}");
                    std::process::exit(1);
                }
            };
            info!(
                name: "chat.backend.builtin",
                corpus = %config.bot.corpus_path,
                intents = engine.intent_count(),
                "Intent engine loaded"
            );
            Arc::new(engine)
        }
    };

    start_server(config, responder).await
}
