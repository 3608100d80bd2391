use crate::errors::{ConfigError, SpeechError};
use crate::model::DialogScript;
use std::path::Path;
use std::time::Duration;

pub const SUPPORTED_SCRIPT_VERSION: u32 = 1;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

pub fn load_script(path: &Path) -> Result<DialogScript, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read script {}: {}", path.display(), e)))?;
    parse_script(&raw).map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
}

pub fn parse_script(raw: &str) -> Result<DialogScript, ConfigError> {
    let script: DialogScript = serde_yaml::from_str(raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if script.version != SUPPORTED_SCRIPT_VERSION {
        return Err(ConfigError(format!(
            "unsupported script version {} (supported: {})",
            script.version, SUPPORTED_SCRIPT_VERSION
        )));
    }

    if script.dialogs.is_empty() {
        return Err(ConfigError("script has no dialogs".into()));
    }

    Ok(script)
}

pub fn write_sample_script(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_SCRIPT)
        .map_err(|e| ConfigError(format!("failed to write {}: {}", path.display(), e)))
}

const SAMPLE_SCRIPT: &str = r#"version: 1
voice:
  voice_id: "21m00Tcm4TlvDq8ikWAM"
  model_id: "eleven_multilingual_v2"
  voice_settings:
    stability: 0.5
    similarity_boost: 0.75
    style: 0.0
    use_speaker_boost: true
    speed: 1.0
dialogs:
  - id: intro
    character: narrator
    text: "Hey there! I'm the narrator."
  - id: pause
    text: "..."
  - id: welcome
    character: narrator
    text: "Welcome to my portfolio!"
  - id: thanks
    character: narrator
    text: "Thanks for stopping by!"
"#;

/// Connection settings for the speech collaborator, read once at startup.
#[derive(Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SpeechConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = get("ELEVENLABS_API_KEY") {
            if !v.trim().is_empty() {
                cfg.api_key = Some(v);
            }
        }
        if let Some(v) = get("ELEVENLABS_BASE_URL") {
            if !v.trim().is_empty() {
                cfg.base_url = v.trim_end_matches('/').to_string();
            }
        }
        if let Some(v) = get("ELEVENLABS_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                cfg.timeout = Duration::from_secs(n);
            }
        }
        cfg
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn require_api_key(&self) -> Result<&str, SpeechError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SpeechError::MissingApiKey)
    }
}
