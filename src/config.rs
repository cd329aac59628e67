//! Application configuration.
//!
//! Layered the usual way: built-in defaults, then an optional config file,
//! then `SANTE_`-prefixed environment variables (`SANTE_SERVER__PORT=8000`),
//! then CLI flags. Flags also accept their own environment fallbacks via
//! clap, so `PORT=8000 sante-chat` and `sante-chat --port 8000` agree.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::bot::engine::DEFAULT_SCORE_THRESHOLD;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Host address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Intent corpus path
    #[arg(long, env = "CORPUS_PATH")]
    pub corpus: Option<String>,

    /// Base URL of a remote chat API (replaces the built-in engine)
    #[arg(long, env = "CHAT_REMOTE_URL")]
    pub remote_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub bot: BotConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub corpus_path: String,
    pub score_threshold: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatConfig {
    /// When set, chat requests are forwarded here instead of the built-in
    /// intent engine.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("bot.corpus_path", "corpus.json")?
            .set_default("bot.score_threshold", DEFAULT_SCORE_THRESHOLD)?;

        // Config file: explicit path, or ./config.{yaml,toml,...} if present.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // Environment variables, e.g. SANTE_BOT__CORPUS_PATH.
        builder = builder.add_source(
            Environment::with_prefix("SANTE")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their clap env fallbacks) win over everything.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(corpus) = cli.corpus {
            builder = builder.set_override("bot.corpus_path", corpus)?;
        }
        if let Some(url) = cli.remote_url {
            builder = builder.set_override("chat.remote_url", url)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
