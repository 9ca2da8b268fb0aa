use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{error::Error, SpeechSynthesizer};

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

pub struct ElevenLabsClient {
    client: Client,
    api_key: Option<SecretString>,
    model_id: String,
    base_url: String,
}

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsClient {
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Multi-minute speech can take minutes to render
    pub const READ_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(api_key: Option<SecretString>) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(Self::CONNECT_TIMEOUT)
            .read_timeout(Self::READ_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model_id: "eleven_multilingual_v2".into(),
            base_url: DEFAULT_ELEVENLABS_API_URL.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    #[tracing::instrument(skip(self, text), fields(input_len = text.len()))]
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, Error> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingConfig("ELEVENLABS_API_KEY"))?;

        let body = ElevenLabsRequest {
            text,
            model_id: &self.model_id,
        };

        let resp = self
            .client
            .post(format!("{}/text-to-speech/{voice}", self.base_url))
            .header("xi-api-key", api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "ElevenLabs request failed"))?;

        if !resp.status().is_success() {
            let err = Error::from_response(resp).await;
            tracing::error!(error = %err, "ElevenLabs API error");
            return Err(err);
        }

        let audio = resp.bytes().await?;
        if audio.is_empty() {
            return Err(Error::UnexpectedResponse("ElevenLabs returned no audio".into()));
        }

        tracing::debug!(bytes = audio.len(), "ElevenLabs synthesis complete");

        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ElevenLabsClient {
        ElevenLabsClient::new(Some(SecretString::from("xi-key")))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/text-to-speech/voice-1"))
            .and(header("xi-api-key", "xi-key"))
            .and(body_partial_json(json!({
                "text": "Two Thoughts from Seneca.",
                "model_id": "eleven_multilingual_v2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = test_client(&server.uri())
            .synthesize("Two Thoughts from Seneca.", "voice-1")
            .await
            .unwrap();
        assert_eq!(audio, b"ID3audio");
    }

    #[tokio::test]
    async fn test_rate_limit_is_a_retryable_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .synthesize("hello", "voice-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 429, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_audio_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).synthesize("hello", "voice-1").await;
        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ElevenLabsClient::new(None).unwrap().with_base_url(server.uri());
        let result = client.synthesize("hello", "voice-1").await;
        assert!(matches!(result, Err(Error::MissingConfig("ELEVENLABS_API_KEY"))));
    }
}
