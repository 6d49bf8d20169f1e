//! Zhipu AI chat-completion client.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://open.bigmodel.cn/api/paas/v4/chat/completions`
//! - **Authentication**: `Authorization: Bearer <key>` header.
//! - **Retry policy**: up to 3 attempts total; only connection and timeout
//!   failures are retried. Backoff is exponential: 2s before the second
//!   attempt, 4s before the third. HTTP error statuses and malformed bodies
//!   propagate immediately.
//! - **System persona**: fixed expert article-analyst role; the prompt is
//!   carried in the user message.

pub mod error;
pub mod prompt;
pub mod request;
pub mod sanitize;

pub use error::LlmError;
pub use prompt::{AnalysisMode, analysis_prompt, summary_prompt};
pub use request::{ChatMessage, ChatRequest, ChatResponse};
pub use sanitize::strip_code_fences;

use std::time::Duration;

/// Default base URL for the Zhipu AI API.
const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "glm-4";

/// Default request timeout. Large-model completions are slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Total attempts per call, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Fixed system persona for every completion request.
const SYSTEM_PROMPT: &str = "你是一位擅长分析微信公众号文章的专家，能够进行深入的语义分析、观点提取和结构分析。";

/// Zhipu API client configuration.
#[derive(Debug, Clone)]
pub struct ZhipuConfig {
    /// API key resolved from ZHIPU_API_KEY or layered configuration.
    pub api_key: String,
    /// Base URL (default: https://open.bigmodel.cn/api/paas/v4).
    pub base_url: String,
    /// Request timeout (default: 120s).
    pub timeout: Duration,
}

impl Default for ZhipuConfig {
    fn default() -> Self {
        Self { api_key: String::new(), base_url: DEFAULT_BASE_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

impl ZhipuConfig {
    /// Build an LLM configuration from application configuration.
    ///
    /// The credential is resolved with the ZHIPU_API_KEY environment
    /// variable taking precedence over the layered config; absence of a
    /// credential is a fatal, non-retried failure.
    pub fn from_app(config: &wxarticle_core::AppConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key().map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self { api_key, timeout: config.llm_timeout(), ..Default::default() })
    }
}

/// Zhipu AI chat-completion client.
#[derive(Debug, Clone)]
pub struct ZhipuClient {
    http: reqwest::Client,
    config: ZhipuConfig,
}

/// Backoff before the retry following attempt `attempt` (0-indexed):
/// 2s after the first attempt, 4s after the second.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64 << attempt)
}

impl ZhipuClient {
    /// Create a new client. An empty API key is a fatal, non-retried error.
    pub fn new(config: ZhipuConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| LlmError::Connect(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Send one chat-completion request and return the generated text.
    ///
    /// Transient failures (connect, timeout) are retried with exponential
    /// backoff up to 3 attempts total; after exhausting retries the last
    /// transient error is raised. Any other failure propagates immediately.
    pub async fn chat(
        &self, prompt: &str, model: &str, max_tokens: u32, temperature: f32,
    ) -> Result<String, LlmError> {
        let payload = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens,
            temperature,
        };

        tracing::info!("calling Zhipu AI API: model={}, prompt_length={}", model, prompt.chars().count());

        let response = self.send_with_retry(&payload).await?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(LlmError::AuthRejected);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(LlmError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await.map_err(LlmError::from)?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = parsed.first_content().ok_or(LlmError::InvalidResponse)?;

        tracing::info!("Zhipu AI API response received, length={}", content.chars().count());

        Ok(content.to_string())
    }

    /// Issue the request, retrying transient failures with backoff.
    async fn send_with_retry(&self, payload: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let mut last_transient: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            let result = self
                .http
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(payload)
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let err = LlmError::from(e);
                    if !err.is_transient() {
                        return Err(err);
                    }
                    if attempt + 1 < MAX_ATTEMPTS {
                        let wait = backoff_delay(attempt);
                        tracing::warn!(
                            "API call failed (attempt {}/{}), retrying in {}s: {}",
                            attempt + 1,
                            MAX_ATTEMPTS,
                            wait.as_secs(),
                            err
                        );
                        tokio::time::sleep(wait).await;
                    }
                    last_transient = Some(err);
                }
            }
        }

        Err(last_transient.unwrap_or(LlmError::InvalidResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ZhipuClient {
        ZhipuClient::new(ZhipuConfig {
            api_key: "test-key".into(),
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(0), Duration::from_secs(2));
        assert_eq!(backoff_delay(1), Duration::from_secs(4));
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let result = ZhipuClient::new(ZhipuConfig::default());
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({"model": "glm-4"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "生成的分析"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.chat("分析这篇文章", DEFAULT_MODEL, 1500, 0.3).await.unwrap();
        assert_eq!(text, "生成的分析");
    }

    #[tokio::test]
    async fn test_chat_sends_system_persona() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "system", "content": SYSTEM_PROMPT}, {"role": "user", "content": "p"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::HttpError { status: 500 }));
    }

    #[tokio::test]
    async fn test_auth_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthRejected));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_exhausts_retries() {
        // Nothing listens on this port; every attempt fails to connect and
        // the backoff sleeps auto-advance under paused time.
        let client = ZhipuClient::new(ZhipuConfig {
            api_key: "test-key".into(),
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let err = client.chat("p", DEFAULT_MODEL, 100, 0.3).await.unwrap_err();
        assert!(err.is_transient(), "exhausted retries should surface the last transient error, got {err}");
    }
}
