use std::sync::Arc;

use agent_core::{
    Agent, AgentFramework, AgentParams, AgentProfile, Message, Outcome, Processor, Result,
};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Agent whose behavior is a user-supplied [`Processor`]
pub struct CustomAgent {
    profile: Arc<AgentProfile>,
    processor: Option<Processor>,
}

impl CustomAgent {
    pub fn new(profile: AgentProfile, processor: Option<Processor>) -> Self {
        Self {
            profile: Arc::new(profile),
            processor,
        }
    }
}

#[async_trait]
impl Agent for CustomAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn process(&self, message: Message) -> Result<Outcome> {
        let Some(processor) = &self.processor else {
            tracing::warn!(agent = %self.id(), "Agent has no processor defined");
            return Ok(
                Outcome::failure(self.id(), "no processor function defined").with_input(&message)
            );
        };

        match processor(Arc::clone(&self.profile), message.clone()).await {
            Ok(value) => Ok(Outcome::from_value(value, self.id(), &message)),
            Err(e) => {
                tracing::error!(
                    agent = %self.id(),
                    error = %e,
                    "Custom agent failed to process message"
                );
                Ok(Outcome::failure(self.id(), e).with_input(&message))
            }
        }
    }
}

/// Framework building [`CustomAgent`]s from the `processor` in [`AgentParams`]
#[derive(Default)]
pub struct CustomAgentFramework {
    config: Map<String, Value>,
}

impl CustomAgentFramework {
    pub const NAME: &'static str = "CustomAgents";

    pub fn new() -> Self {
        Self::default()
    }

    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }
}

impl AgentFramework for CustomAgentFramework {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn create_agent(&self, id: &str, params: AgentParams) -> Result<Arc<dyn Agent>> {
        let profile = AgentProfile::from_params(id, &params);
        tracing::debug!(agent = %id, "Custom agent created");
        Ok(Arc::new(CustomAgent::new(profile, params.processor)))
    }

    fn configure(&mut self, options: Map<String, Value>) {
        tracing::debug!(framework = Self::NAME, options = options.len(), "Framework configured");
        self.config.extend(options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;
    use serde_json::json;

    fn build(params: AgentParams) -> Arc<dyn Agent> {
        CustomAgentFramework::new().create_agent("helper", params).unwrap()
    }

    #[tokio::test]
    async fn test_missing_processor() {
        let agent = build(AgentParams::new());
        let outcome = agent.process(Message::text("hi")).await.unwrap();

        assert!(outcome.is_error());
        assert_eq!(outcome.error(), Some("no processor function defined"));
        assert_eq!(outcome.get("input"), Some(&json!({"content": "hi"})));
    }

    #[tokio::test]
    async fn test_object_result_is_normalized() {
        let agent = build(AgentParams::new().role("greeter").processor(
            |profile, message| async move {
                let name = message.content().unwrap_or("nobody");
                Ok(json!({
                    "response": format!("{} says hello to {name}", profile.role()),
                }))
            },
        ));

        let outcome = agent.process(Message::text("Ada")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.agent(), Some("helper"));
        assert_eq!(outcome.response(), Some(&json!("greeter says hello to Ada")));
    }

    #[tokio::test]
    async fn test_scalar_result_is_wrapped() {
        let agent = build(AgentParams::new().processor(|_, message| async move {
            Ok(json!(message.content().map_or(0, str::len)))
        }));

        let outcome = agent.process(Message::text("four")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.response(), Some(&json!(4)));
        assert_eq!(outcome.get("input"), Some(&json!({"content": "four"})));
    }

    #[tokio::test]
    async fn test_processor_error_becomes_outcome() {
        let agent = build(AgentParams::new().processor(|_, _| async move {
            Err(AgentError::Processing("upstream timeout".into()))
        }));

        let outcome = agent.process(Message::text("x")).await.unwrap();
        assert!(outcome.is_error());
        assert!(outcome.error().unwrap().contains("upstream timeout"));
    }

    #[test]
    fn test_profile_from_params() {
        let agent = build(AgentParams::new().name("Helper").role("assistant"));
        assert_eq!(agent.id(), "helper");
        assert_eq!(agent.profile().name(), "Helper");
        assert_eq!(agent.profile().role(), "assistant");
    }

    #[test]
    fn test_configure_merges() {
        let mut framework = CustomAgentFramework::new();
        let mut options = Map::new();
        options.insert("a".into(), json!(1));
        framework.configure(options);

        let mut options = Map::new();
        options.insert("b".into(), json!(2));
        framework.configure(options);

        assert_eq!(framework.config().len(), 2);
    }
}
