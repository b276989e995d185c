//! Deepgram speech client: speech-to-text (`/v1/listen`) and text-to-speech (`/v1/speak`).

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::DeepgramSettings;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Deepgram error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No speech detected in the audio")]
    EmptyTranscript,

    #[error("Audio payload is empty")]
    EmptyAudio,

    #[error("Text to synthesize is empty")]
    EmptyText,
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Clone)]
pub struct DeepgramClient {
    client: Client,
    api_key: String,
    base_url: String,
    stt_model: String,
    tts_model: String,
}

impl DeepgramClient {
    pub fn new(settings: &DeepgramSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            stt_model: settings.stt_model.clone(),
            tts_model: settings.tts_model.clone(),
        }
    }

    /// Transcribes recorded audio. `mime` is forwarded as the content type (e.g. `audio/wav`).
    pub async fn transcribe(&self, audio: &[u8], mime: &str) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let response = self
            .client
            .post(format!("{}/v1/listen", self.base_url))
            .query(&[("model", self.stt_model.as_str()), ("smart_format", "true")])
            .header(header::AUTHORIZATION, format!("Token {}", self.api_key))
            .header(header::CONTENT_TYPE, mime)
            .body(audio.to_vec())
            .send()
            .await?;

        let body: ListenResponse = check_status(response).await?.json().await?;

        let transcript = body
            .results
            .channels
            .into_iter()
            .next()
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript.trim().to_string())
            .unwrap_or_default();

        if transcript.is_empty() {
            return Err(SpeechError::EmptyTranscript);
        }

        debug!("Transcribed {} bytes into {} chars", audio.len(), transcript.len());
        Ok(transcript)
    }

    /// Synthesizes speech and returns MP3 bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let response = self
            .client
            .post(format!("{}/v1/speak", self.base_url))
            .query(&[("model", self.tts_model.as_str())])
            .header(header::AUTHORIZATION, format!("Token {}", self.api_key))
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let audio = check_status(response).await?.bytes().await?;
        debug!("Synthesized {} chars into {} bytes of audio", text.len(), audio.len());
        Ok(audio)
    }
}

async fn check_status(response: Response) -> Result<Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SpeechError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProviders, MockReply};
    use serde_json::json;

    #[tokio::test]
    async fn test_transcribe_returns_first_alternative() {
        let mock = MockProviders::start().await;
        mock.push_transcript("  I led the migration to Rust.  ");

        let text = mock
            .deepgram_client()
            .transcribe(b"RIFF....WAVE", "audio/wav")
            .await
            .unwrap();
        assert_eq!(text, "I led the migration to Rust.");

        let request = &mock.requests_to("/v1/listen")[0];
        assert_eq!(request.authorization.as_deref(), Some("Token dg-test"));
        assert_eq!(request.content_type.as_deref(), Some("audio/wav"));
        assert_eq!(request.query_param("model").as_deref(), Some("nova-2"));
        assert_eq!(request.query_param("smart_format").as_deref(), Some("true"));
        assert_eq!(request.body, b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn test_empty_transcript_is_an_error() {
        let mock = MockProviders::start().await;
        mock.push_transcript("");

        let err = mock
            .deepgram_client()
            .transcribe(b"silence", "audio/wav")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::EmptyTranscript));
    }

    #[tokio::test]
    async fn test_empty_audio_is_rejected_without_request() {
        let mock = MockProviders::start().await;
        let err = mock
            .deepgram_client()
            .transcribe(&[], "audio/wav")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::EmptyAudio));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mock = MockProviders::start().await;
        mock.push(
            "/v1/listen",
            MockReply::Json {
                status: 401,
                body: json!({"err_code": "INVALID_AUTH"}),
            },
        );

        let err = mock
            .deepgram_client()
            .transcribe(b"audio", "audio/webm")
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let mock = MockProviders::start().await;
        mock.push_speech(b"ID3-mp3-bytes");

        let audio = mock
            .deepgram_client()
            .synthesize("Tell me about yourself.")
            .await
            .unwrap();
        assert_eq!(&audio[..], b"ID3-mp3-bytes");

        let request = &mock.requests_to("/v1/speak")[0];
        assert_eq!(
            request.query_param("model").as_deref(),
            Some("aura-asteria-en")
        );
        assert_eq!(request.json()["text"], "Tell me about yourself.");
    }
}
