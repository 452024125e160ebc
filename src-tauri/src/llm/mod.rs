pub mod claude;
pub mod gemini;
pub mod openai;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::future::Future;

/// Binary payload sent alongside a prompt (e.g. an uploaded PDF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// A single-turn request to a hosted model.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub attachment: Option<Attachment>,
}

impl GenerateRequest {
    pub fn text(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Anything that can turn a [`GenerateRequest`] into a text reply.
pub trait HostedModel: Send + Sync {
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Unified LLM provider enum — dispatches to Gemini, OpenAI-compatible or Claude backends.
#[derive(Debug, Clone)]
pub enum Provider {
    Gemini(gemini::GeminiConfig),
    OpenAi(openai::OpenAiConfig),
    Claude(claude::ClaudeConfig),
}

impl Provider {
    pub fn gemini(api_key: String) -> Self {
        Provider::Gemini(gemini::GeminiConfig {
            api_key,
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn openai(api_key: String) -> Self {
        Provider::OpenAi(openai::OpenAiConfig {
            api_key,
            base_url: openai::DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn claude(api_key: String) -> Self {
        Provider::Claude(claude::ClaudeConfig {
            api_key,
            base_url: claude::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different endpoint (proxies, local servers, tests).
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match self {
            Provider::Gemini(config) => Provider::Gemini(gemini::GeminiConfig { base_url, ..config }),
            Provider::OpenAi(config) => Provider::OpenAi(openai::OpenAiConfig { base_url, ..config }),
            Provider::Claude(config) => Provider::Claude(claude::ClaudeConfig { base_url, ..config }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(_) => "gemini",
            Provider::OpenAi(_) => "openai",
            Provider::Claude(_) => "claude",
        }
    }
}

impl HostedModel for Provider {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        match self {
            Provider::Gemini(config) => gemini::generate(config, request).await,
            Provider::OpenAi(config) => openai::generate(config, request).await,
            Provider::Claude(config) => claude::generate(config, request).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("API key not configured for {0}")]
    MissingApiKey(&'static str),
}

/// Read a non-success response into [`LlmError::Api`].
async fn api_error(resp: reqwest::Response) -> LlmError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    LlmError::Api { status, message }
}

/// Treat whitespace-only replies as failures so callers never store empty text.
pub(crate) fn non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_base64() {
        let attachment = Attachment {
            file_name: "a.pdf".into(),
            media_type: "application/pdf".into(),
            data: b"%PDF-1.4".to_vec(),
        };
        assert_eq!(attachment.to_base64(), "JVBERi0xLjQ=");
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let provider = Provider::openai("k".into()).with_base_url("http://localhost:11434/v1/");
        match provider {
            Provider::OpenAi(config) => {
                assert_eq!(config.base_url, "http://localhost:11434/v1");
                assert_eq!(config.api_key, "k");
            }
            other => panic!("unexpected provider {}", other.name()),
        }
    }

    #[test]
    fn test_non_empty() {
        assert!(matches!(non_empty("  \n".into()), Err(LlmError::EmptyResponse)));
        assert_eq!(non_empty("ok".into()).unwrap(), "ok");
    }
}
