use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "narrator",
    version,
    about = "Pre-generate and inspect text-addressed dialog audio"
)]
pub struct Cli {
    /// more log output (-v info, -vv debug); NARRATOR_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Init(InitArgs),
    Generate(GenerateArgs),
    Fingerprint(FingerprintArgs),
    Lookup(LookupArgs),
    Voices(VoicesArgs),
    Achievements(AchievementsArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "dialogs.yaml")]
    pub script: PathBuf,
}

#[derive(Parser, Clone)]
pub struct GenerateArgs {
    #[arg(long, default_value = "dialogs.yaml")]
    pub script: PathBuf,

    /// output directory for dialog_<fingerprint>.mp3 files
    #[arg(long, default_value = "public/audio/dialog")]
    pub out: PathBuf,

    /// write placeholder audio instead of calling the speech API
    #[arg(long)]
    pub placeholder: bool,

    /// regenerate files that already exist
    #[arg(long)]
    pub force: bool,

    /// report what would be generated without writing or calling anything
    #[arg(long)]
    pub dry_run: bool,

    /// pause between speech API calls
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// write the per-item report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub speech: SpeechArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SpeechArgs {
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ELEVENLABS_BASE_URL")]
    pub base_url: Option<String>,
}

#[derive(Parser, Clone)]
pub struct FingerprintArgs {
    /// dialog texts to fingerprint
    #[arg(required = true)]
    pub texts: Vec<String>,
}

#[derive(Parser, Clone)]
pub struct LookupArgs {
    #[arg(long, default_value = "public/audio/dialog")]
    pub dir: PathBuf,

    pub text: String,
}

#[derive(Parser, Clone)]
pub struct VoicesArgs {
    #[command(flatten)]
    pub speech: SpeechArgs,
}

#[derive(Parser)]
pub struct AchievementsArgs {
    #[arg(long, default_value = ".narrator/achievements.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub cmd: AchievementsSub,
}

#[derive(Subcommand)]
pub enum AchievementsSub {
    /// Show every flag and whether it is unlocked
    List,
    /// Unlock a flag (e.g. met_narrator)
    Unlock { name: String },
    /// Clear all flags
    Reset,
}
