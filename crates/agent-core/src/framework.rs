//! Agent Frameworks
//!
//! A framework is the factory the [`AgentSystem`](crate::system::AgentSystem)
//! uses to build agents of one particular kind, together with whatever shared
//! resources those agents need while the system is running.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::agent::{Agent, AgentParams};
use crate::error::Result;

pub trait AgentFramework: Send + Sync {
    fn name(&self) -> &str;

    /// Build a new agent. The system registers it afterwards.
    fn create_agent(&self, id: &str, params: AgentParams) -> Result<Arc<dyn Agent>>;

    /// Acquire shared resources
    fn start(&mut self) -> Result<()> {
        tracing::info!(framework = %self.name(), "Starting framework");
        Ok(())
    }

    /// Release shared resources
    fn stop(&mut self) -> Result<()> {
        tracing::info!(framework = %self.name(), "Stopping framework");
        Ok(())
    }

    /// Merge framework-specific options
    fn configure(&mut self, options: Map<String, Value>);
}
