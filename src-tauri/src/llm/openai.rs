use super::{api_error, non_empty, GenerateRequest, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiPart {
    File { file: OpenAiFile },
    Text { text: String },
}

#[derive(Serialize)]
struct OpenAiFile {
    filename: String,
    file_data: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn build_request(request: &GenerateRequest) -> OpenAiRequest {
    let content = match &request.attachment {
        None => OpenAiContent::Text(request.prompt.clone()),
        Some(attachment) => OpenAiContent::Parts(vec![
            OpenAiPart::File {
                file: OpenAiFile {
                    filename: attachment.file_name.clone(),
                    file_data: format!(
                        "data:{};base64,{}",
                        attachment.media_type,
                        attachment.to_base64()
                    ),
                },
            },
            OpenAiPart::Text {
                text: request.prompt.clone(),
            },
        ]),
    };

    OpenAiRequest {
        model: request.model.clone(),
        messages: vec![OpenAiMessage {
            role: "user",
            content,
        }],
    }
}

pub async fn generate(config: &OpenAiConfig, request: &GenerateRequest) -> Result<String, LlmError> {
    let client = Client::new();
    let body = build_request(request);

    let mut req = client
        .post(format!("{}/chat/completions", config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    // Local OpenAI-compatible servers (Ollama, llama.cpp) run without a key.
    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }

    let resp = req.send().await?;

    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    let data: OpenAiResponse = resp
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    let choice = data.choices.into_iter().next();
    if choice.as_ref().and_then(|c| c.finish_reason.as_deref()) == Some("length") {
        tracing::warn!(model = %request.model, "openai reply truncated at the token limit");
    }
    let content = choice.and_then(|c| c.message.content).unwrap_or_default();

    non_empty(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Attachment;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        }))
    }

    #[tokio::test]
    async fn test_text_request_uses_plain_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(reply("November 14"))
            .mount(&server)
            .await;

        let config = OpenAiConfig {
            api_key: "sk-test".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("gpt-4o-mini", "When?".into());
        assert_eq!(generate(&config, &request).await.unwrap(), "November 14");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["content"], "When?");
    }

    #[tokio::test]
    async fn test_attachment_is_sent_as_data_url_file_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(reply("extracted"))
            .mount(&server)
            .await;

        let config = OpenAiConfig {
            api_key: String::new(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("gpt-4o-mini", "Extract".into()).with_attachment(
            Attachment {
                file_name: "notes.pdf".into(),
                media_type: "application/pdf".into(),
                data: b"%PDF".to_vec(),
            },
        );
        generate(&config, &request).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let parts = &body["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "file");
        assert_eq!(parts[0]["file"]["filename"], "notes.pdf");
        assert_eq!(
            parts[0]["file"]["file_data"],
            "data:application/pdf;base64,JVBERg=="
        );
        assert_eq!(parts[1]["type"], "text");
        assert_eq!(parts[1]["text"], "Extract");
    }

    #[tokio::test]
    async fn test_length_cut_reply_is_still_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Partial"}, "finish_reason": "length"}]
            })))
            .mount(&server)
            .await;

        let config = OpenAiConfig {
            api_key: "k".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("gpt-4o-mini", "hi".into());
        assert_eq!(generate(&config, &request).await.unwrap(), "Partial");
    }

    #[tokio::test]
    async fn test_null_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let config = OpenAiConfig {
            api_key: "k".into(),
            base_url: server.uri(),
        };
        let request = GenerateRequest::text("gpt-4o-mini", "hi".into());
        let err = generate(&config, &request).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }
}
