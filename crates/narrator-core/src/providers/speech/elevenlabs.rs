use super::SpeechSynthesizer;
use crate::config::SpeechConfig;
use crate::errors::SpeechError;
use crate::model::{AudioResponse, SynthesisRequest, VoiceSettings, AUDIO_MIME};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Serialize;

const USER_AGENT_VALUE: &str = concat!("narrator/", env!("CARGO_PKG_VERSION"));

/// Request body for `POST /v1/text-to-speech/{voice_id}`.
#[derive(Serialize)]
struct TtsBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ElevenLabsClient {
    /// Builds a client from validated config. Fails fast when no API key is set.
    pub fn new(cfg: &SpeechConfig) -> Result<Self, SpeechError> {
        let api_key = cfg.require_api_key()?.to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| SpeechError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "speech API returned error");
        Err(SpeechError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResponse, SpeechError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, request.voice_id);

        let body = TtsBody {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: &request.voice_settings,
        };

        tracing::debug!(url = %url, chars = request.text.chars().count(), "requesting speech");

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, AUDIO_MIME)
            .json(&body)
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(AUDIO_MIME)
            .to_string();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse {
                message: format!("failed to read audio body: {}", e),
            })?;

        if bytes.is_empty() {
            return Err(SpeechError::InvalidResponse {
                message: "speech API returned an empty body".into(),
            });
        }

        Ok(AudioResponse {
            bytes: bytes.to_vec(),
            content_type,
            provider: self.provider_name().to_string(),
        })
    }

    async fn list_voices(&self) -> Result<serde_json::Value, SpeechError> {
        let url = format!("{}/v1/voices", self.base_url);
        tracing::debug!(url = %url, "listing voices");

        let resp = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        resp.json().await.map_err(|e| SpeechError::InvalidResponse {
            message: format!("failed to parse voices response: {}", e),
        })
    }

    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }
}
