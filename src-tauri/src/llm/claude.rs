use super::{api_error, non_empty, GenerateRequest, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const MAX_TOKENS: u32 = 4096;
/// Extracted documents can be long; give them a larger output budget.
const DOCUMENT_MAX_TOKENS: u32 = 16384;

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: Vec<ClaudeBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeBlock {
    Document { source: ClaudeSource },
    Text { text: String },
}

#[derive(Serialize)]
struct ClaudeSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    text: Option<String>,
}

fn build_request(request: &GenerateRequest) -> ClaudeRequest {
    let mut content = Vec::with_capacity(2);
    if let Some(attachment) = &request.attachment {
        content.push(ClaudeBlock::Document {
            source: ClaudeSource {
                kind: "base64",
                media_type: attachment.media_type.clone(),
                data: attachment.to_base64(),
            },
        });
    }
    content.push(ClaudeBlock::Text {
        text: request.prompt.clone(),
    });

    ClaudeRequest {
        model: request.model.clone(),
        max_tokens: if request.attachment.is_some() {
            DOCUMENT_MAX_TOKENS
        } else {
            MAX_TOKENS
        },
        messages: vec![ClaudeMessage {
            role: "user",
            content,
        }],
    }
}

pub async fn generate(config: &ClaudeConfig, request: &GenerateRequest) -> Result<String, LlmError> {
    if config.api_key.is_empty() {
        return Err(LlmError::MissingApiKey("claude"));
    }

    let client = Client::new();
    let body = build_request(request);

    let resp = client
        .post(format!("{}/v1/messages", config.base_url))
        .header("Content-Type", "application/json")
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    let data: ClaudeResponse = resp
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    if data.stop_reason.as_deref() == Some("max_tokens") {
        tracing::warn!(model = %request.model, "claude reply truncated at max_tokens");
    }
    let text: String = data.content.into_iter().filter_map(|c| c.text).collect();

    non_empty(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Attachment;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_document_block_precedes_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "claude-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "All the text."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClaudeConfig {
            api_key: "claude-key".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("claude-sonnet-4-20250514", "Extract".into())
            .with_attachment(Attachment {
                file_name: "scan.pdf".into(),
                media_type: "application/pdf".into(),
                data: b"%PDF".to_vec(),
            });
        assert_eq!(generate(&config, &request).await.unwrap(), "All the text.");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let blocks = &body["messages"][0]["content"];
        assert_eq!(blocks[0]["type"], "document");
        assert_eq!(blocks[0]["source"]["type"], "base64");
        assert_eq!(blocks[0]["source"]["media_type"], "application/pdf");
        assert_eq!(blocks[1]["type"], "text");
        assert_eq!(body["max_tokens"], DOCUMENT_MAX_TOKENS);
    }

    #[test]
    fn test_text_requests_keep_default_budget() {
        let request = GenerateRequest::text("claude-sonnet-4-20250514", "hi".into());
        assert_eq!(build_request(&request).max_tokens, MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_truncated_reply_is_still_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Partial"}],
                "stop_reason": "max_tokens"
            })))
            .mount(&server)
            .await;

        let config = ClaudeConfig {
            api_key: "claude-key".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("claude-sonnet-4-20250514", "hi".into());
        assert_eq!(generate(&config, &request).await.unwrap(), "Partial");
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = ClaudeConfig {
            api_key: "claude-key".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("claude-sonnet-4-20250514", "hi".into());
        let err = generate(&config, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: 500 - overloaded");
    }
}
