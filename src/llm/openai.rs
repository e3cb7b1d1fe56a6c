//! OpenAI Chat Completions API 调用（非流式）

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::format::build_chat_endpoint;
use super::types::{ChatMessage, ChatOptions, LlmError};

/// 请求载荷
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// 响应体
#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// 调用 Chat Completions API，返回 assistant 角色的响应片段（按序，去首尾空白）
pub async fn chat_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &str,
    options: &ChatOptions,
) -> Result<Vec<String>, LlmError> {
    let endpoint = build_chat_endpoint(base_url);

    let payload = ChatCompletionRequest {
        model,
        messages,
        temperature: options.temperature,
        top_p: options.top_p,
        max_tokens: options.max_tokens,
    };

    debug!("Chat completion request: endpoint={}, model={}", endpoint, model);

    let response = client
        .post(&endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_text = response.text().await.unwrap_or_default();
        let preview: String = error_text.chars().take(500).collect();
        error!("Chat completion error: status={}, body={}", status_code, preview);
        return Err(LlmError::ApiError {
            status: status_code,
            message: error_text,
        });
    }

    let text = response.text().await?;
    let body: ChatCompletionResponse = serde_json::from_str(&text)?;

    let fragments = body
        .choices
        .iter()
        .filter(|choice| choice.message.role == "assistant")
        .filter_map(|choice| choice.message.content.as_deref())
        .map(|content| content.trim().to_string())
        .collect();

    Ok(fragments)
}
