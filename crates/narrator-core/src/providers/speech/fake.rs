use super::SpeechSynthesizer;
use crate::errors::SpeechError;
use crate::model::{AudioResponse, SynthesisRequest, AUDIO_MIME};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Offline synthesizer: returns a marker payload per text and records every call.
#[derive(Clone, Default)]
pub struct FakeSynthesizer {
    calls: Arc<Mutex<Vec<String>>>,
    failing: Arc<HashSet<String>>,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts in `failing` answer with an upstream 500 instead of audio.
    pub fn failing_on<I, S>(failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            calls: Arc::default(),
            failing: Arc::new(failing.into_iter().map(Into::into).collect()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn payload_for(text: &str) -> Vec<u8> {
        format!("FAKE-AUDIO:{}", text).into_bytes()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResponse, SpeechError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.text.clone());
        }

        if self.failing.contains(&request.text) {
            return Err(SpeechError::Upstream {
                status: 500,
                body: "fake failure".into(),
            });
        }

        Ok(AudioResponse {
            bytes: Self::payload_for(&request.text),
            content_type: AUDIO_MIME.to_string(),
            provider: self.provider_name().to_string(),
        })
    }

    async fn list_voices(&self) -> Result<serde_json::Value, SpeechError> {
        Ok(serde_json::json!({
            "voices": [{ "voice_id": crate::model::DEFAULT_VOICE_ID, "name": "Fake" }]
        }))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
