use super::types::*;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_NLP_URL: &str = "http://localhost:8000";

/// Lemmatizer backend requested when none is given
const DEFAULT_LEMMATIZER: &str = "spacy";

#[derive(Debug, Clone)]
pub struct NlpClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Honor HTTP(S)_PROXY environment variables
    pub use_proxy: bool,
}

impl Default for NlpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NLP_URL.to_string(),
            timeout: Duration::from_secs(30),
            use_proxy: true,
        }
    }
}

/// Client for the remote NLP microservice.
///
/// Every call degrades to `None`, an empty collection or `false` when the
/// service is unreachable or answers with an error; failures are logged.
pub struct NlpClient {
    http: Client,
    base_url: String,
}

impl NlpClient {
    pub fn new(config: NlpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().timeout(config.timeout);
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::new(NlpClientConfig {
            base_url: base_url.into(),
            ..NlpClientConfig::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Service health, or None when it cannot be reached
    pub async fn health(&self) -> Option<HealthStatus> {
        self.get_json("/health").await
    }

    pub async fn is_available(&self) -> bool {
        self.health().await.is_some_and(|h| h.status == "ok")
    }

    /// Parsers the service can run itself
    pub async fn available_parsers(&self) -> Vec<RemoteParserInfo> {
        self.get_json::<ParsersResponse>("/parse/available")
            .await
            .map(|r| r.parsers)
            .unwrap_or_default()
    }

    /// Parse text with a service-side parser (e.g. "mecab", "jieba")
    pub async fn parse(&self, text: &str, parser: &str) -> Option<RemoteParseResult> {
        self.post_json("/parse/", &ParseRequest { text, parser }).await
    }

    /// Lemma of one word; None if unresolved or on failure
    pub async fn lemmatize(&self, word: &str, language: &str) -> Option<String> {
        let request = LemmatizeRequest {
            word,
            language,
            lemmatizer: DEFAULT_LEMMATIZER,
        };
        self.post_json::<_, LemmaResponse>("/lemmatize/", &request)
            .await
            .and_then(|r| r.lemma)
    }

    /// Lemmas for many words.
    ///
    /// On success every requested word appears exactly once (unresolved words
    /// map to None). On failure the map is empty.
    pub async fn lemmatize_batch(
        &self,
        words: &[String],
        language: &str,
    ) -> HashMap<String, Option<String>> {
        if words.is_empty() {
            return HashMap::new();
        }

        let request = BatchLemmatizeRequest {
            words,
            language,
            lemmatizer: DEFAULT_LEMMATIZER,
        };
        let Some(response) = self
            .post_json::<_, BatchLemmaResponse>("/lemmatize/batch", &request)
            .await
        else {
            return HashMap::new();
        };

        words
            .iter()
            .map(|word| (word.clone(), response.results.get(word).cloned().flatten()))
            .collect()
    }

    pub async fn available_lemmatizers(&self) -> Vec<LemmatizerInfo> {
        self.get_json::<LemmatizersResponse>("/lemmatize/available")
            .await
            .map(|r| r.lemmatizers)
            .unwrap_or_default()
    }

    /// Installed and downloadable voices
    pub async fn voices(&self) -> Vec<VoiceInfo> {
        self.get_json::<VoicesResponse>("/tts/voices")
            .await
            .map(|r| r.voices)
            .unwrap_or_default()
    }

    pub async fn installed_voices(&self) -> Vec<VoiceInfo> {
        self.get_json::<VoicesResponse>("/tts/voices/installed")
            .await
            .map(|r| r.voices)
            .unwrap_or_default()
    }

    /// Synthesize speech; returns WAV bytes
    pub async fn speak(&self, text: &str, voice_id: &str) -> Option<Vec<u8>> {
        let response = self
            .send(
                self.http
                    .post(self.url("/tts/speak"))
                    .json(&SpeakRequest { text, voice_id }),
                "/tts/speak",
            )
            .await?;
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(error = %e, "failed to read synthesized audio");
                None
            }
        }
    }

    pub async fn download_voice(&self, voice_id: &str) -> bool {
        self.post_json::<_, SuccessResponse>("/tts/voices/download", &DownloadRequest { voice_id })
            .await
            .is_some_and(|r| r.success)
    }

    pub async fn delete_voice(&self, voice_id: &str) -> bool {
        if !is_valid_voice_id(voice_id) {
            warn!(%voice_id, "refusing to delete voice with invalid id");
            return false;
        }
        let path = format!("/tts/voices/{}", voice_id);
        let Some(response) = self.send(self.http.delete(self.url(&path)), &path).await else {
            return false;
        };
        decode::<SuccessResponse>(response, &path)
            .await
            .is_some_and(|r| r.success)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let response = self.send(self.http.get(self.url(path)), path).await?;
        decode(response, path).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Option<T> {
        let response = self
            .send(self.http.post(self.url(path)).json(body), path)
            .await?;
        decode(response, path).await
    }

    /// Send a request; None on transport errors and non-2xx statuses
    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Option<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%path, error = %e, "NLP service request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%path, status = status.as_u16(), %body, "NLP service returned an error");
            return None;
        }

        debug!(%path, status = status.as_u16(), "NLP service responded");
        Some(response)
    }
}

/// Voice ids end up in a URL path: `en_US-lessac-medium`
fn is_valid_voice_id(voice_id: &str) -> bool {
    !voice_id.is_empty()
        && !voice_id.starts_with('.')
        && voice_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Option<T> {
    match response.json::<T>().await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%path, error = %e, "NLP service returned an unexpected body");
            None
        }
    }
}
