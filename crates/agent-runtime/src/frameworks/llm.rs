use std::sync::Arc;

use agent_core::{
    Agent, AgentError, AgentFramework, AgentParams, AgentProfile, ChatMessage, GenerationOptions,
    LazyClient, Message, Outcome, Provider, Result,
};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Backend shared between the framework and every agent it created
type Backend = Arc<LazyClient<Arc<dyn Provider>>>;

/// Agent that answers through an LLM provider, guided by a system prompt
pub struct LlmAgent {
    profile: AgentProfile,
    system_prompt: String,
    options: GenerationOptions,
    backend: Backend,
}

impl LlmAgent {
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    fn conversation(&self, content: &str) -> Vec<ChatMessage> {
        let mut turns = Vec::with_capacity(2);
        if !self.system_prompt.is_empty() {
            turns.push(ChatMessage::system(self.system_prompt.as_str()));
        }
        turns.push(ChatMessage::user(content));
        turns
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn process(&self, message: Message) -> Result<Outcome> {
        let Some(provider) = self.backend.get() else {
            return Ok(Outcome::failure(
                self.id(),
                format!("agent {} is not initialized; start the system first", self.id()),
            )
            .with_input(&message));
        };

        let turns = self.conversation(message.content().unwrap_or_default());
        match provider.chat(&turns, &self.options).await {
            Ok(completion) => Ok(Outcome::success(self.id())
                .with("role", self.profile.role())
                .with_response(completion.content)
                .with("model", completion.model)
                .with_input(&message)),
            Err(e) => {
                tracing::error!(
                    agent = %self.id(),
                    provider = %provider.name(),
                    error = %e,
                    "LLM agent failed to process message"
                );
                Ok(Outcome::failure(self.id(), e).with_input(&message))
            }
        }
    }
}

/// Framework building [`LlmAgent`]s on top of a single provider.
///
/// Agents only work while the framework is started: `start` publishes the
/// provider to them and `stop` withdraws it.
///
/// Recognized options, set framework-wide with `configure` or per agent in
/// [`AgentParams::options`]: `system_prompt`, `model`, `temperature`,
/// `max_tokens`.
#[derive(Default)]
pub struct LlmAgentFramework {
    provider: Option<Arc<dyn Provider>>,
    config: Map<String, Value>,
    backend: Backend,
}

impl LlmAgentFramework {
    pub const NAME: &'static str = "LlmAgents";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    pub fn set_provider(&mut self, provider: Arc<dyn Provider>) {
        self.provider = Some(provider);
    }

    pub fn is_started(&self) -> bool {
        self.backend.is_initialized()
    }

    /// Agent option, falling back to the framework configuration
    fn option<'a>(&'a self, params: &'a AgentParams, key: &str) -> Option<&'a Value> {
        params.options.get(key).or_else(|| self.config.get(key))
    }

    fn generation_options(&self, params: &AgentParams) -> GenerationOptions {
        let mut options = GenerationOptions::default();
        if let Some(model) = self.option(params, "model").and_then(Value::as_str) {
            options.model = Some(model.to_string());
        }
        if let Some(temperature) = self.option(params, "temperature").and_then(Value::as_f64) {
            options.temperature = temperature as f32;
        }
        if let Some(max_tokens) = self
            .option(params, "max_tokens")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
        {
            options.max_tokens = max_tokens;
        }
        options
    }
}

impl AgentFramework for LlmAgentFramework {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn create_agent(&self, id: &str, params: AgentParams) -> Result<Arc<dyn Agent>> {
        let system_prompt = self
            .option(&params, "system_prompt")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let options = self.generation_options(&params);

        let profile = AgentProfile::from_params(id, &params);
        profile.set_metadata("framework", Self::NAME);
        tracing::debug!(agent = %id, "LLM agent created");

        Ok(Arc::new(LlmAgent {
            profile,
            system_prompt,
            options,
            backend: Arc::clone(&self.backend),
        }))
    }

    fn start(&mut self) -> Result<()> {
        if self.backend.is_initialized() {
            return Ok(());
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            AgentError::Config(format!("{} has no provider configured", Self::NAME))
        })?;
        provider.start()?;
        self.backend.set(Arc::clone(provider));

        tracing::info!(
            framework = Self::NAME,
            provider = %provider.name(),
            "Framework backend ready"
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.backend.clear() {
            tracing::info!(framework = Self::NAME, "Framework backend released");
        }
        Ok(())
    }

    fn configure(&mut self, options: Map<String, Value>) {
        tracing::debug!(framework = Self::NAME, options = options.len(), "Framework configured");
        self.config.extend(options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use serde_json::json;

    fn params() -> AgentParams {
        AgentParams::new()
            .role("poet")
            .option("system_prompt", "Answer in one line.")
    }

    #[tokio::test]
    async fn test_process_before_start_is_error_outcome() {
        let framework = LlmAgentFramework::with_provider(Arc::new(MockProvider::new("mock")));
        let agent = framework.create_agent("bard", params()).unwrap();

        let outcome = agent.process(Message::text("sing")).await.unwrap();
        assert!(outcome.is_error());
        assert!(outcome.error().unwrap().contains("not initialized"));
    }

    #[tokio::test]
    async fn test_process_after_start() {
        let provider = Arc::new(MockProvider::new("mock"));
        let mut framework = LlmAgentFramework::with_provider(provider.clone());
        let agent = framework.create_agent("bard", params()).unwrap();
        framework.start().unwrap();

        let outcome = agent.process(Message::text("sing")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.response(), Some(&json!("[mock] sing")));
        assert_eq!(outcome.get("role"), Some(&json!("poet")));
        assert_eq!(outcome.get("input"), Some(&json!({"content": "sing"})));

        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request[0], ChatMessage::system("Answer in one line."));
        assert_eq!(request[1], ChatMessage::user("sing"));
    }

    #[tokio::test]
    async fn test_stop_withdraws_backend() {
        let mut framework = LlmAgentFramework::with_provider(Arc::new(MockProvider::new("mock")));
        let agent = framework.create_agent("bard", params()).unwrap();
        framework.start().unwrap();
        framework.stop().unwrap();

        assert!(!framework.is_started());
        let outcome = agent.process(Message::text("sing")).await.unwrap();
        assert!(outcome.is_error());
    }

    #[test]
    fn test_start_without_provider_fails() {
        let mut framework = LlmAgentFramework::new();
        assert!(matches!(framework.start(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_start_fails_when_provider_cannot_start() {
        let provider = Arc::new(MockProvider::new("mock").failing_start());
        let mut framework = LlmAgentFramework::with_provider(provider);
        assert!(framework.start().is_err());
        assert!(!framework.is_started());
    }

    #[test]
    fn test_options_overlay() {
        let mut framework = LlmAgentFramework::new();
        let mut config = Map::new();
        config.insert("model".into(), json!("llama3.2"));
        config.insert("temperature".into(), json!(0.2));
        config.insert("system_prompt".into(), json!("Be kind."));
        framework.configure(config);

        let agent = framework
            .create_agent(
                "a",
                AgentParams::new().option("model", "gpt-4o").option("max_tokens", 64),
            )
            .unwrap();
        assert_eq!(agent.profile().metadata("framework"), Some(json!("LlmAgents")));

        let options = framework.generation_options(&AgentParams::new().option("model", "gpt-4o"));
        assert_eq!(options.model.as_deref(), Some("gpt-4o"));
        assert!((options.temperature - 0.2).abs() < 1e-6);

        let fallback = framework.generation_options(&AgentParams::new().option("max_tokens", 64));
        assert_eq!(fallback.model.as_deref(), Some("llama3.2"));
        assert_eq!(fallback.max_tokens, 64);
    }
}
