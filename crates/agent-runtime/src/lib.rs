//! # agent-runtime
//!
//! Concrete providers and agent frameworks for `agent-core`.
//!
//! ## Providers
//!
//! - **Ollama** (feature `ollama`): local LLM inference via Ollama
//! - **OpenAI** (feature `openai`): OpenAI chat completions API
//! - **Mock**: in-process provider for tests and demos
//!
//! ## Frameworks
//!
//! - **CustomAgents**: agents driven by a user callback
//! - **LlmAgents**: agents answering through a provider with a system prompt
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{AgentSystem, AgentParams, CustomAgentFramework, OpenAiProvider};
//!
//! let mut system = AgentSystem::new();
//! system.add_provider(Arc::new(OpenAiProvider::from_env()));
//! system.set_framework(CustomAgentFramework::new());
//! system.create_agent("echo", AgentParams::new().processor(|_, msg| async move {
//!     Ok(serde_json::json!(msg.content()))
//! }))?;
//! system.start();
//! let outcome = system.process_message("echo", Message::text("hi")).await?;
//! ```

pub mod config;
pub mod frameworks;
pub mod mock;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use config::RuntimeConfig;
pub use frameworks::{CustomAgent, CustomAgentFramework, LlmAgent, LlmAgentFramework};
pub use mock::MockProvider;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, AgentFramework, AgentParams, AgentSystem, Message, Outcome, Provider,
    Result,
};
