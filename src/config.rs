use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::conversation::WELCOME_MESSAGE;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind the browser UI to
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the chat backend
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Use the non-streaming endpoint instead of the event stream
    #[arg(long)]
    pub no_stream: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub chat_path: String,
    /// Request timeout of the non-streaming path, in milliseconds.
    pub timeout_ms: u64,
    pub streaming: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    pub welcome_message: String,
}

impl ApiConfig {
    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.chat_path.trim_start_matches('/')
        ))
    }
}

impl ServerConfig {
    /// `host:port` pair to bind to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
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
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("api.base_url", "http://localhost:5010")?
            .set_default("api.chat_path", "/api/chat")?
            .set_default("api.timeout_ms", 30_000)?
            .set_default("api.streaming", true)?
            .set_default("ui.title", "Chat with Local LLM")?
            .set_default("ui.welcome_message", WELCOME_MESSAGE)?;

        // An explicit file must exist; ./config.* is picked up when present.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. CHAT_API__BASE_URL=http://10.0.0.2:5010
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Flags (and their env fallbacks) win over everything else.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(base_url) = cli.api_base_url {
            builder = builder.set_override("api.base_url", base_url)?;
        }
        if cli.no_stream {
            builder = builder.set_override("api.streaming", false)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.api
            .chat_url()
            .map_err(|e| config::ConfigError::Message(format!("invalid api.base_url: {e}")))?;
        Ok(cfg)
    }
}
