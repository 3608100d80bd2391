use super::args::*;
use narrator_core::cache::{file_name, AudioCache};
use narrator_core::config::SpeechConfig;
use narrator_core::errors::SpeechError;
use narrator_core::fingerprint;
use narrator_core::providers::speech::{ElevenLabsClient, SpeechSynthesizer};

pub mod achievements;
pub mod generate;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const ITEMS_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Generate(args) => generate::run(args).await,
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::Lookup(args) => cmd_lookup(args),
        Command::Voices(args) => cmd_voices(args).await,
        Command::Achievements(args) => achievements::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.script.exists() {
        eprintln!("note: {} already exists", args.script.display());
        return Ok(exit_codes::OK);
    }
    ensure_parent_dir(&args.script)?;
    narrator_core::config::write_sample_script(&args.script)?;
    eprintln!("created {}", args.script.display());
    Ok(exit_codes::OK)
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<i32> {
    for text in &args.texts {
        println!("{}\t{}", fingerprint(text), file_name(text));
    }
    Ok(exit_codes::OK)
}

fn cmd_lookup(args: LookupArgs) -> anyhow::Result<i32> {
    let cache = AudioCache::new(&args.dir);
    match cache.lookup(&args.text) {
        Some(p) => {
            println!("{}", p.display());
            Ok(exit_codes::OK)
        }
        None => {
            eprintln!("not cached: {}", cache.path_for(&args.text).display());
            Ok(exit_codes::ITEMS_FAILED)
        }
    }
}

async fn cmd_voices(args: VoicesArgs) -> anyhow::Result<i32> {
    let client = match build_client(&args.speech) {
        Ok(c) => c,
        Err(SpeechError::MissingApiKey) => {
            eprintln!("config error: {}", SpeechError::MissingApiKey);
            return Ok(exit_codes::CONFIG_ERROR);
        }
        Err(e) => return Err(e.into()),
    };
    let voices = client.list_voices().await?;
    println!("{}", serde_json::to_string_pretty(&voices)?);
    Ok(exit_codes::OK)
}

pub(crate) fn speech_config(args: &SpeechArgs) -> SpeechConfig {
    let mut cfg = SpeechConfig::from_env();
    if let Some(key) = args.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        cfg = cfg.with_api_key(key);
    }
    if let Some(url) = &args.base_url {
        cfg = cfg.with_base_url(url.as_str());
    }
    cfg
}

pub(crate) fn build_client(args: &SpeechArgs) -> Result<ElevenLabsClient, SpeechError> {
    ElevenLabsClient::new(&speech_config(args))
}

pub(crate) fn ensure_parent_dir(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
