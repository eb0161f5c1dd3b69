//! Generation backend payloads and the HTTP adapter.
//!
//! The pipeline only depends on backends through [`Generator`]; the concrete
//! adapter speaks the Ollama-compatible `/api/generate` contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::GENERATION_TIMEOUT;

pub mod quiz;

#[derive(Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    pub response: Option<String>,
}

/// The single contract the command pipeline holds against a text-generation
/// backend.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Ollama-compatible backend: non-streaming `POST {base_url}/api/generate`.
#[derive(Clone)]
pub struct OllamaBackend {
    base_url: String,
    model: String,
    http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Generator for OllamaBackend {
    async fn generate(
        &self,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .timeout(GENERATION_TIMEOUT)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(format!("generation backend returned {}", response.status()).into());
        }

        let body: GenerateResponse = response.json().await?;
        match body.response {
            Some(text) if !text.is_empty() => Ok(text),
            Some(_) => Ok("(no response)".to_string()),
            None => Err("generation response missing 'response' field".into()),
        }
    }
}

/// Summarize with the preferred backend, falling back to the secondary; both
/// failing propagates the second error.
pub async fn summarize(
    primary: &dyn Generator,
    fallback: &dyn Generator,
    text: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let prompt = format!("Summarize concisely in 3-5 bullet points:\n\n{text}");
    match primary.generate(&prompt).await {
        Ok(summary) => Ok(summary),
        Err(err) => {
            debug!("primary summary backend failed: {err}");
            fallback.generate(&prompt).await
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Scripted backend for pipeline tests: yields the queued replies in
    /// order, then errors.
    pub struct ScriptedBackend {
        replies: std::sync::Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(replies),
            }
        }

        pub fn always(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string()), Ok(reply.to_string())])
        }

        pub fn failing(message: &str) -> Self {
            Self::new(vec![Err(message.to_string()), Err(message.to_string())])
        }
    }

    #[async_trait]
    impl Generator for ScriptedBackend {
        async fn generate(
            &self,
            _prompt: &str,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err("backend exhausted".into());
            }
            replies.remove(0).map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedBackend;
    use super::*;

    #[tokio::test]
    async fn summarize_prefers_the_primary_backend() {
        let primary = ScriptedBackend::always("- short");
        let fallback = ScriptedBackend::failing("unreachable");
        let summary = summarize(&primary, &fallback, "long text").await.unwrap();
        assert_eq!(summary, "- short");
    }

    #[tokio::test]
    async fn summarize_falls_back_when_the_primary_fails() {
        let primary = ScriptedBackend::failing("connection refused");
        let fallback = ScriptedBackend::always("- rescued");
        let summary = summarize(&primary, &fallback, "long text").await.unwrap();
        assert_eq!(summary, "- rescued");
    }

    #[tokio::test]
    async fn summarize_surfaces_the_error_when_both_fail() {
        let primary = ScriptedBackend::failing("down");
        let fallback = ScriptedBackend::failing("also down");
        let err = summarize(&primary, &fallback, "text").await.unwrap_err();
        assert_eq!(err.to_string(), "also down");
    }
}
