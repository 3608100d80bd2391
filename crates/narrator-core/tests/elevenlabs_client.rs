//! ElevenLabsClient against a wiremock stand-in for the speech API.

use narrator_core::config::SpeechConfig;
use narrator_core::errors::SpeechError;
use narrator_core::model::{SynthesisRequest, VoiceProfile, VoiceSettings};
use narrator_core::providers::speech::{ElevenLabsClient, SpeechSynthesizer};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ElevenLabsClient {
    let cfg = SpeechConfig::default()
        .with_api_key("test-key")
        .with_base_url(server.uri());
    ElevenLabsClient::new(&cfg).expect("client")
}

#[tokio::test]
async fn test_synthesize_posts_text_and_voice_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"))
        .and(header("xi-api-key", "test-key"))
        .and(header("accept", "audio/mpeg"))
        .and(body_partial_json(json!({
            "text": "Hmm.",
            "model_id": "eleven_multilingual_v2",
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
                "style": 0.0,
                "use_speaker_boost": true,
                "speed": 1.0
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(b"ID3audio".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = SynthesisRequest::new("Hmm.", &VoiceProfile::default());
    let audio = client.synthesize(&req).await.expect("synthesize");

    assert_eq!(audio.bytes, b"ID3audio");
    assert_eq!(audio.content_type, "audio/mpeg");
    assert_eq!(audio.provider, "elevenlabs");
}

#[tokio::test]
async fn test_custom_voice_settings_are_sent_exactly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "voice_settings": {
                "stability": 0.9,
                "similarity_boost": 0.3,
                "style": 0.1,
                "use_speaker_boost": false,
                "speed": 1.1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let voice = VoiceProfile {
        voice_settings: VoiceSettings {
            stability: 0.9,
            similarity_boost: 0.3,
            style: 0.1,
            use_speaker_boost: false,
            speed: 1.1,
        },
        ..VoiceProfile::default()
    };
    let req = SynthesisRequest::new("Hmm.", &voice);
    client_for(&server).synthesize(&req).await.expect("synthesize");
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"detail":{"status":"invalid_api_key"}}"#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = SynthesisRequest::new("hello", &VoiceProfile::default());
    let err = client.synthesize(&req).await.unwrap_err();

    match err {
        SpeechError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid_api_key"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_audio_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = SynthesisRequest::new("hello", &VoiceProfile::default());
    let err = client.synthesize(&req).await.unwrap_err();
    assert!(matches!(err, SpeechError::InvalidResponse { .. }));
    assert_eq!(err.http_status(), 502);
}

#[tokio::test]
async fn test_list_voices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .and(header("xi-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voices": [{"voice_id": "abc", "name": "Rachel"}]
        })))
        .mount(&server)
        .await;

    let voices = client_for(&server).list_voices().await.expect("voices");
    assert_eq!(voices["voices"][0]["name"], "Rachel");
}

#[test]
fn test_missing_api_key_fails_fast() {
    let err = ElevenLabsClient::new(&SpeechConfig::default())
        .err()
        .expect("must fail without key");
    assert!(matches!(err, SpeechError::MissingApiKey));
}
