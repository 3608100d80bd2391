use anyhow::Result;
use clap::Parser;
use narrator_core::config::SpeechConfig;
use narrator_server::config;
use narrator_server::proxy::ProxyContext;
use narrator_server::server::Server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Speech synthesis proxy for the portfolio dialog", long_about = None)]
struct Args {
    /// Address to listen on (overrides NARRATOR_BIND)
    #[arg(long)]
    bind: Option<String>,
}

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = config::ServerConfig::from_env();
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }

    init_logging(&cfg.log_level);

    let speech = SpeechConfig::from_env();
    if speech.api_key.is_none() {
        tracing::warn!(
            event = "missing_api_key",
            "ELEVENLABS_API_KEY is not set; synthesis requests will fail with 500"
        );
    }

    tracing::info!(event = "server_start", config = ?cfg, speech = ?speech);

    let ctx = ProxyContext::from_config(&speech)?;
    Server::run(cfg, ctx).await
}
