//! Request handling for the synthesis proxy.
//!
//! Transport-agnostic: [`handle`] maps a [`ProxyRequest`] to a
//! [`ProxyResponse`]; `server` owns the sockets.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use narrator_core::config::SpeechConfig;
use narrator_core::errors::SpeechError;
use narrator_core::model::{SynthesisRequest, VoiceProfile, VoiceSettings, AUDIO_MIME};
use narrator_core::providers::speech::{ElevenLabsClient, SpeechSynthesizer};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const ACTION_TTS: &str = "text-to-speech";
pub const ACTION_VOICES: &str = "voices";

const ELLIPSIS: &str = "...";
const PAUSE_TAG: &str = r#"<break time="0.5s" />"#;

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct ProxyContext {
    /// `None` when no API key is configured; requests then fail with a 500.
    pub synth: Option<Arc<dyn SpeechSynthesizer>>,
    pub voice: VoiceProfile,
}

impl ProxyContext {
    pub fn from_config(cfg: &SpeechConfig) -> anyhow::Result<Self> {
        let synth: Option<Arc<dyn SpeechSynthesizer>> = match ElevenLabsClient::new(cfg) {
            Ok(c) => Some(Arc::new(c)),
            Err(SpeechError::MissingApiKey) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            synth,
            voice: VoiceProfile::default(),
        })
    }

    pub fn with_synth(synth: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synth: Some(synth),
            voice: VoiceProfile::default(),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            synth: None,
            voice: VoiceProfile::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: String,
    /// Request target: path plus optional query string.
    pub target: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ProxyResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TtsBody {
    text: Option<String>,
    voice_id: Option<String>,
    model_id: Option<String>,
    voice_settings: Option<VoiceSettings>,
}

/// Action selector: `?action=` wins, else the last path segment.
pub fn action_of(target: &str) -> String {
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (target, None),
    };

    if let Some(q) = query {
        for pair in q.split('&') {
            if let Some(v) = pair.strip_prefix("action=") {
                return v.to_string();
            }
        }
    }

    path.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Text beginning with an ellipsis is spoken after a short pause.
pub fn shape_text(text: &str) -> String {
    if !text.starts_with(ELLIPSIS) {
        return text.to_string();
    }
    let rest = text.trim_start_matches('.').trim_start();
    if rest.is_empty() {
        PAUSE_TAG.to_string()
    } else {
        format!("{} {}", PAUSE_TAG, rest)
    }
}

pub async fn handle(ctx: &ProxyContext, req: &ProxyRequest) -> ProxyResponse {
    match req.method.as_str() {
        "OPTIONS" => return ProxyResponse::no_content(),
        "POST" => {}
        _ => return ProxyResponse::error(405, "Method not allowed"),
    }

    let action = action_of(&req.target);
    if action != ACTION_TTS && action != ACTION_VOICES {
        return ProxyResponse::error(400, format!("Unknown action: {}", action));
    }

    let Some(synth) = ctx.synth.as_deref() else {
        tracing::error!(event = "missing_api_key", action = %action);
        return ProxyResponse::error(500, "API key not configured");
    };

    if action == ACTION_VOICES {
        return match synth.list_voices().await {
            Ok(v) => ProxyResponse::json(200, v),
            Err(e) => speech_error(e),
        };
    }

    let body: TtsBody = if req.body.iter().all(u8::is_ascii_whitespace) {
        TtsBody::default()
    } else {
        match serde_json::from_slice(&req.body) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(event = "json_parse_error", error = %e);
                return ProxyResponse::error(400, "Invalid JSON body");
            }
        }
    };

    let text = match body.text.as_deref() {
        Some(t) if !t.trim().is_empty() => t,
        _ => return ProxyResponse::error(400, "Text is required"),
    };

    let request = SynthesisRequest {
        text: shape_text(text),
        voice_id: body.voice_id.unwrap_or_else(|| ctx.voice.voice_id.clone()),
        model_id: body.model_id.unwrap_or_else(|| ctx.voice.model_id.clone()),
        voice_settings: body
            .voice_settings
            .unwrap_or_else(|| ctx.voice.voice_settings.clone()),
    };

    match synth.synthesize(&request).await {
        Ok(audio) => {
            let mime = audio
                .content_type
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| m.starts_with("audio/"))
                .unwrap_or(AUDIO_MIME);
            ProxyResponse::json(
                200,
                json!({
                    "success": true,
                    "audioPath": format!("data:{};base64,{}", mime, STANDARD.encode(&audio.bytes)),
                    "cached": false,
                    "message": "Audio generated successfully",
                }),
            )
        }
        Err(e) => speech_error(e),
    }
}

fn speech_error(e: SpeechError) -> ProxyResponse {
    let status = e.http_status();
    match e {
        SpeechError::Upstream { status, body } => {
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            ProxyResponse::json(
                status,
                json!({
                    "error": "ElevenLabs API error",
                    "status": status,
                    "details": details,
                }),
            )
        }
        SpeechError::MissingApiKey => ProxyResponse::error(500, "API key not configured"),
        other => {
            tracing::error!(event = "upstream_unreachable", error = %other);
            ProxyResponse::json(
                status,
                json!({ "error": "Speech service unavailable", "message": other.to_string() }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_from_query_or_path() {
        assert_eq!(action_of("/api/elevenlabs?action=voices"), "voices");
        assert_eq!(action_of("/api/elevenlabs/text-to-speech"), "text-to-speech");
        assert_eq!(action_of("/api/elevenlabs/voices/?x=1"), "voices");
        assert_eq!(action_of("/"), "");
    }

    #[test]
    fn ellipsis_gets_pause() {
        assert_eq!(shape_text("Hello"), "Hello");
        assert_eq!(shape_text("...well, hi"), r#"<break time="0.5s" /> well, hi"#);
        assert_eq!(shape_text("..."), r#"<break time="0.5s" />"#);
        assert_eq!(shape_text("Wait..."), "Wait...");
    }
}
