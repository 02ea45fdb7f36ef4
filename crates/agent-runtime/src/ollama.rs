//! Ollama LLM Provider
//!
//! Implementation of `Provider` for local Ollama inference.

use agent_core::{
    error::{AgentError, Result},
    message::{ChatMessage, Role},
    provider::{Completion, FinishReason, GenerationOptions, LazyClient, Provider, TokenUsage},
};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{
        ChatMessage as OllamaMessage, ChatMessageResponse, MessageRole,
        request::ChatMessageRequest,
    },
    models::ModelOptions,
};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model used when a request does not name one
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let model = std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model);

        Self { host, port, model }
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    name: String,
    config: OllamaConfig,
    client: LazyClient<Ollama>,
}

impl OllamaProvider {
    pub const DEFAULT_NAME: &'static str = "Ollama";

    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            name: Self::DEFAULT_NAME.into(),
            config,
            client: LazyClient::new(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    /// Register under a different pool name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Check that the Ollama server answers
    pub async fn health_check(&self) -> Result<bool> {
        self.start()?;
        let client = self.client.require(&self.name)?;
        match client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Convert chat messages to Ollama format
    fn convert_messages(messages: &[ChatMessage]) -> Vec<OllamaMessage> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => MessageRole::System,
                    Role::User => MessageRole::User,
                    Role::Assistant => MessageRole::Assistant,
                    Role::Tool => MessageRole::User, // Tools appear as user context
                };
                OllamaMessage::new(role, m.content.clone())
            })
            .collect()
    }

    /// Convert Ollama response to a completion
    fn convert_completion(response: ChatMessageResponse, model: &str) -> Completion {
        Completion {
            content: response.message.content,
            model: model.to_string(),
            usage: response.final_data.as_ref().map(|d| TokenUsage {
                prompt_tokens: saturate(d.prompt_eval_count),
                completion_tokens: saturate(d.eval_count),
                total_tokens: saturate(d.prompt_eval_count.saturating_add(d.eval_count)),
            }),
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Build Ollama generation options
    fn build_options(opts: &GenerationOptions) -> ModelOptions {
        ModelOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(predict_limit(opts.max_tokens))
    }

    /// Build the client, rejecting hosts the client library cannot parse
    fn connect(&self) -> Result<Ollama> {
        let host = self.config.host.trim_end_matches('/');
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(AgentError::Config(format!(
                "OLLAMA_HOST must include an http:// or https:// scheme, got {host:?}"
            )));
        }

        Ollama::try_new(format!("{host}:{}", self.config.port))
            .map_err(|e| AgentError::Config(format!("invalid Ollama URL {host:?}: {e}")))
    }
}

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn predict_limit(max_tokens: u32) -> i32 {
    i32::try_from(max_tokens).unwrap_or(i32::MAX)
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        let (_, created) = self.client.get_or_try_init(|| self.connect())?;
        if created {
            tracing::info!(
                provider = %self.name,
                host = %self.config.host,
                port = self.config.port,
                "Ollama client initialized"
            );
        }
        Ok(())
    }

    fn stop(&self) {
        if self.client.clear() {
            tracing::info!(provider = %self.name, "Ollama client released");
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
        let model = options.model_or(&self.config.model).to_string();

        let request = ChatMessageRequest::new(model.clone(), Self::convert_messages(messages))
            .options(Self::build_options(options));

        let response = client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(Self::convert_completion(response, &model))
    }
}
