use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
pub const AUDIO_MIME: &str = "audio/mpeg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogScript {
    pub version: u32,
    #[serde(default)]
    pub voice: VoiceProfile,
    pub dialogs: Vec<DialogEntry>,
}

impl DialogScript {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.dialogs.iter().map(|d| d.text.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            voice_settings: VoiceSettings::default(),
        }
    }
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// Voice parameters sent with every synthesis request.
///
/// Missing fields deserialize to their defaults, so a partial object from a
/// caller is merged over the defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
    pub speed: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: &VoiceProfile) -> Self {
        Self {
            text: text.into(),
            voice_id: voice.voice_id.clone(),
            model_id: voice.model_id.clone(),
            voice_settings: voice.voice_settings.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioResponse {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub provider: String,
}
