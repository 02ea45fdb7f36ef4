//! Agent Frameworks
//!
//! Factories for the agent kinds shipped with the runtime:
//!
//! - [`CustomAgentFramework`]: agents driven by a user callback
//! - [`LlmAgentFramework`]: agents answering through an LLM provider

mod custom;
mod llm;

pub use custom::{CustomAgent, CustomAgentFramework};
pub use llm::{LlmAgent, LlmAgentFramework};
