//! OpenAI Provider
//!
//! `Provider` implementation for the OpenAI chat completions API, or any
//! server exposing the same wire format (set `OPENAI_BASE_URL`).

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::ChatMessage,
    provider::{Completion, FinishReason, GenerationOptions, LazyClient, Provider, TokenUsage},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// OpenAI provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key; the provider refuses to start without one
    pub api_key: Option<String>,

    /// Model used when a request does not name one
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".into(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 120,
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            ..defaults
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl ChatResponse {
    fn into_completion(self) -> Result<Completion> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: self.model,
            usage: self.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
        })
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    name: String,
    config: OpenAiConfig,
    client: LazyClient<reqwest::Client>,
}

impl OpenAiProvider {
    pub const DEFAULT_NAME: &'static str = "OpenAI";

    pub fn from_config(config: OpenAiConfig) -> Self {
        Self {
            name: Self::DEFAULT_NAME.into(),
            config,
            client: LazyClient::new(),
        }
    }

    /// Create with an API key and otherwise default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(OpenAiConfig::default().with_api_key(api_key))
    }

    pub fn from_env() -> Self {
        Self::from_config(OpenAiConfig::from_env())
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Auth(format!("no API key configured for {}", self.name)))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        let (_, created) = self.client.get_or_try_init(|| {
            self.api_key()?;
            reqwest::Client::builder()
                .timeout(Duration::from_secs(self.config.timeout_secs))
                .build()
                .map_err(|e| AgentError::Provider(e.to_string()))
        })?;
        if created {
            tracing::info!(
                provider = %self.name,
                model = %self.config.model,
                "OpenAI client initialized"
            );
        }
        Ok(())
    }

    fn stop(&self) {
        if self.client.clear() {
            tracing::info!(provider = %self.name, "OpenAI client released");
        }
    }

    fn is_started(&self) -> bool {
        self.client.is_initialized()
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.start()?;
        let client = self.client.require(&self.name)?;

        let request = ChatRequest {
            model: options.model_or(&self.config.model),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: &options.stop_sequences,
        };

        let response = client
            .post(self.config.endpoint())
            .bearer_auth(self.api_key()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AgentError::ProviderUnavailable(e.to_string())
                } else {
                    AgentError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid response body: {e}")))?;

        body.into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_requires_api_key() {
        let provider = OpenAiProvider::from_config(OpenAiConfig::default());
        assert!(matches!(provider.start(), Err(AgentError::Auth(_))));
        assert!(!provider.is_started());
    }

    #[test]
    fn test_start_is_idempotent() {
        let provider = OpenAiProvider::new("sk-test");
        provider.start().unwrap();
        provider.start().unwrap();
        assert!(provider.is_started());

        provider.stop();
        assert!(!provider.is_started());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = OpenAiConfig::default().with_api_key("sk-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_body() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: 0.5,
            max_tokens: 16,
            top_p: 1.0,
            stop: &[],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0], json!({"role": "system", "content": "be brief"}));
        assert!(value.get("stop").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatResponse = serde_json::from_value(json!({
            "model": "gpt-4o-2024",
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }))
        .unwrap();

        let completion = body.into_completion().unwrap();
        assert_eq!(completion.content, "Hello!");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 7);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let body: ChatResponse =
            serde_json::from_value(json!({"model": "gpt-4o", "choices": []})).unwrap();
        assert!(matches!(body.into_completion(), Err(AgentError::Provider(_))));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), AgentError::Auth(_)));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            AgentError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, ""),
            AgentError::ProviderUnavailable(_)
        ));
        assert!(matches!(status_error(StatusCode::BAD_REQUEST, ""), AgentError::Provider(_)));
    }
}
