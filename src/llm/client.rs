//! 限流 LLM 客户端
//!
//! 每次调度先向限流器申请请求槽位和 token 预算，再发起远程调用；
//! 瞬态错误按指数退避重试，重试的每次实际调用都重新申请预算。

use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use super::format::build_chat_endpoint;
use super::openai::chat_openai;
use super::rate_limit::{estimate_request_tokens, RateLimiter};
use super::types::{ChatMessage, ChatOptions, LlmError, RetryConfig};
use crate::utils::request_logger::{RequestLogEntry, RequestLogger};

/// 限流 LLM 客户端
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
    retry: RetryConfig,
    request_log: RequestLogger,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        max_requests_per_minute: u32,
        max_tokens_per_minute: u32,
        retry: RetryConfig,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::ConfigError("API Key is required".to_string()));
        }

        // 构建 HTTP 客户端
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            limiter: RateLimiter::new(max_requests_per_minute, max_tokens_per_minute),
            retry,
            request_log: RequestLogger::new(None),
        })
    }

    /// 发起一次聊天调用，返回 assistant 响应片段序列
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        options: &ChatOptions,
    ) -> Result<Vec<String>, LlmError> {
        let estimated_tokens = estimate_request_tokens(&messages);
        let request_id = RequestLogger::generate_request_id();
        let started = std::time::Instant::now();

        let mut attempt = 0u32;
        let result = loop {
            self.limiter.acquire(estimated_tokens).await;

            match chat_openai(
                &self.client,
                &self.api_key,
                &self.base_url,
                &messages,
                model,
                options,
            )
            .await
            {
                Ok(fragments) => break Ok(fragments),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff_delay(attempt);
                    warn!(
                        "[{}] Transient LLM error (attempt {}/{}), retrying in {:?}: {}",
                        request_id, attempt, self.retry.max_retries, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break Err(e),
            }
        };

        let status = if result.is_ok() { "success" } else { "error" };
        let entry = RequestLogEntry {
            request_id: request_id.clone(),
            timestamp: Utc::now(),
            endpoint: build_chat_endpoint(&self.base_url),
            model: model.to_string(),
            messages_count: messages.len(),
            estimated_tokens,
            api_key_masked: RequestLogger::mask_api_key(&self.api_key),
            status: status.to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            retries: attempt,
            fragment_count: result.as_ref().ok().map(|f| f.len()),
            error_message: result.as_ref().err().map(|e| e.to_string()),
        };
        self.request_log.record(&entry);

        match &result {
            Ok(fragments) => info!(
                "[{}] Chat completion finished: {} fragment(s) in {}ms",
                request_id,
                fragments.len(),
                entry.duration_ms
            ),
            Err(e) => warn!("[{}] Chat completion failed: {}", request_id, e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 10,
        }
    }

    async fn mount_status(server: &wiremock::MockServer, status: u16, body: &str) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/chat/completions"))
            .respond_with(wiremock::ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn request_count(server: &wiremock::MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let result = LlmClient::new("", "https://api.openai.com", 20, 40000, test_retry());
        assert!(matches!(result, Err(LlmError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_retries_transient_error_until_exhausted() {
        let server = wiremock::MockServer::start().await;
        mount_status(&server, 500, "boom").await;

        let client =
            LlmClient::new("test-key", server.uri(), 1000, 1_000_000, test_retry()).unwrap();

        let err = client
            .chat(vec![ChatMessage::user("hi")], "gpt-4o", &ChatOptions::default())
            .await
            .unwrap_err();

        // 首次调用 + 2 次重试
        assert_eq!(request_count(&server).await, 3);
        assert!(matches!(err, LlmError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_does_not_retry_client_error() {
        let server = wiremock::MockServer::start().await;
        mount_status(&server, 401, "bad key").await;

        let client =
            LlmClient::new("test-key", server.uri(), 1000, 1_000_000, test_retry()).unwrap();

        let err = client
            .chat(vec![ChatMessage::user("hi")], "gpt-4o", &ChatOptions::default())
            .await
            .unwrap_err();

        assert_eq!(request_count(&server).await, 1);
        assert!(matches!(err, LlmError::ApiError { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_successful_chat_returns_fragments() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/chat/completions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "documented"}}
                ]
            })))
            .mount(&server)
            .await;

        let client =
            LlmClient::new("test-key", server.uri(), 1000, 1_000_000, test_retry()).unwrap();

        let fragments = client
            .chat(vec![ChatMessage::user("hi")], "gpt-4o", &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(fragments, vec!["documented".to_string()]);
    }
}
