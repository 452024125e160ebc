use super::{api_error, non_empty, GenerateRequest, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    InlineData { inline_data: GeminiBlob },
    Text { text: String },
}

#[derive(Serialize)]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason", alias = "finish_reason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiTextPart>,
}

#[derive(Deserialize)]
struct GeminiTextPart {
    text: Option<String>,
}

fn build_request(request: &GenerateRequest) -> GeminiRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(attachment) = &request.attachment {
        parts.push(GeminiPart::InlineData {
            inline_data: GeminiBlob {
                mime_type: attachment.media_type.clone(),
                data: attachment.to_base64(),
            },
        });
    }
    parts.push(GeminiPart::Text {
        text: request.prompt.clone(),
    });

    GeminiRequest {
        contents: vec![GeminiContent { role: "user", parts }],
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(data: GeminiResponse) -> Result<String, LlmError> {
    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("response has no candidates".into()))?;
    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        tracing::warn!("gemini reply truncated at the output token limit");
    }
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    non_empty(text)
}

pub async fn generate(config: &GeminiConfig, request: &GenerateRequest) -> Result<String, LlmError> {
    if config.api_key.is_empty() {
        return Err(LlmError::MissingApiKey("gemini"));
    }

    let client = Client::new();
    let body = build_request(request);

    let resp = client
        .post(format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url, request.model
        ))
        .header("Content-Type", "application/json")
        .header("x-goog-api-key", &config.api_key)
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    let data: GeminiResponse = resp
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    response_text(data)
}
