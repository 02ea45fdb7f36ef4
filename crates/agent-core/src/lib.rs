//! # agent-core
//!
//! Routing layer between pluggable agents and pluggable LLM providers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       AgentSystem                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Agent     │  │  Provider   │  │   AgentFramework    │  │
//! │  │  Registry   │  │    Pool     │  │   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Agent`, `Provider` and `AgentFramework` traits are the only seams:
//! concrete LLM bindings and agent kinds live in other crates.

pub mod agent;
pub mod error;
pub mod framework;
pub mod message;
pub mod outcome;
pub mod pool;
pub mod provider;
pub mod registry;
pub mod system;

#[cfg(test)]
mod test_support;

pub use agent::{Agent, AgentParams, AgentProfile, Processor};
pub use error::{AgentError, Result};
pub use framework::AgentFramework;
pub use message::{ChatMessage, Message, Role};
pub use outcome::{Outcome, Status};
pub use pool::ProviderPool;
pub use provider::{Completion, GenerationOptions, LazyClient, Provider};
pub use registry::AgentRegistry;
pub use system::{AgentFilter, AgentSystem, BroadcastOutcomes};
