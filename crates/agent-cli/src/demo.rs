//! Demo roster and system wiring

use std::sync::Arc;

use agent_core::{
    Agent, AgentParams, AgentSystem, ChatMessage, GenerationOptions, Provider, Result,
};
use agent_runtime::{
    CustomAgentFramework, LlmAgentFramework, MockProvider, OllamaProvider, OpenAiProvider,
    RuntimeConfig,
};
use serde_json::json;

use crate::cli::{FrameworkKind, ProviderKind};

/// Demo agents: (id, display name, role)
pub const ROSTER: [(&str, &str, &str); 3] = [
    ("assistant", "Personal Assistant", "friendly and helpful personal assistant"),
    ("critic", "Critic", "blunt critic who points out weaknesses"),
    ("planner", "Planner", "meticulous planner who answers with numbered steps"),
];

/// Build the selected provider from configuration
pub async fn build_provider(
    kind: ProviderKind,
    model: Option<String>,
    config: &RuntimeConfig,
) -> Arc<dyn Provider> {
    match kind {
        ProviderKind::Mock => Arc::new(MockProvider::new("mock")),
        ProviderKind::Ollama => {
            let mut ollama = config.ollama.clone();
            if let Some(model) = model {
                ollama.model = model;
            }
            let provider = OllamaProvider::from_config(ollama);
            match provider.health_check().await {
                Ok(true) => tracing::info!("✓ Connected to Ollama"),
                Ok(false) | Err(_) => {
                    tracing::warn!("⚠ Ollama not available - agents will report errors");
                    tracing::warn!("  Make sure Ollama is running: ollama serve");
                }
            }
            Arc::new(provider)
        }
        ProviderKind::Openai => {
            let mut openai = config.openai.clone();
            if let Some(model) = model {
                openai.model = model;
            }
            if openai.api_key.is_none() {
                tracing::warn!("⚠ OPENAI_API_KEY not set - agents will report errors");
            }
            Arc::new(OpenAiProvider::from_config(openai))
        }
    }
}

/// Callback asking `provider` to answer in the agent's role
fn in_character(provider: Arc<dyn Provider>) -> AgentParams {
    AgentParams::new().processor(move |profile, message| {
        let provider = Arc::clone(&provider);
        async move {
            let prompt = format!(
                "Acting as a {}, respond to the following message: {}",
                profile.role(),
                message.content().unwrap_or_default()
            );
            let answer = provider
                .chat(&[ChatMessage::user(prompt)], &GenerationOptions::default())
                .await?;
            Ok(json!({
                "response": answer.content,
                "provider": provider.name(),
                "model": answer.model,
            }))
        }
    })
}

/// Assemble a system with `provider`, the chosen framework and the roster
pub fn build_system(provider: Arc<dyn Provider>, framework: FrameworkKind) -> Result<AgentSystem> {
    let mut system = AgentSystem::new();
    system.add_provider(Arc::clone(&provider));

    match framework {
        FrameworkKind::Custom => system.set_framework(CustomAgentFramework::new()),
        FrameworkKind::Llm => {
            system.set_framework(LlmAgentFramework::with_provider(Arc::clone(&provider)));
        }
    }

    for (id, name, role) in ROSTER {
        let params = match framework {
            FrameworkKind::Custom => in_character(Arc::clone(&provider)),
            FrameworkKind::Llm => AgentParams::new().option(
                "system_prompt",
                format!("You are a {role}. Answer clearly and concisely."),
            ),
        };
        let agent = system.create_agent(id, params.name(name).role(role))?;
        agent.profile().set_metadata("roster", true);
    }

    connect_roster(&system);
    Ok(system)
}

/// Every roster agent knows about the others
fn connect_roster(system: &AgentSystem) {
    let agents = system.registry().list();
    for agent in agents.values() {
        for other in agents.values().filter(|o| o.id() != agent.id()) {
            agent.connect_to(other.as_ref());
        }
    }
}

/// Role filter for broadcasts
pub fn role_mentions(agent: &dyn Agent, needle: &str) -> bool {
    agent
        .profile()
        .role()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}
