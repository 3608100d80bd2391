use crate::errors::SpeechError;
use crate::model::{AudioResponse, SynthesisRequest};
use async_trait::async_trait;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioResponse, SpeechError>;

    /// Voices available to the configured account, as returned by the collaborator.
    async fn list_voices(&self) -> Result<serde_json::Value, SpeechError>;

    fn provider_name(&self) -> &'static str;
}

pub mod elevenlabs;
pub mod fake;

pub use elevenlabs::ElevenLabsClient;
pub use fake::FakeSynthesizer;
