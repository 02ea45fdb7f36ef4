//! Agent System
//!
//! The orchestrator: owns the [`AgentRegistry`], the [`ProviderPool`] and the
//! configured [`AgentFramework`], drives their start/stop lifecycle and routes
//! messages to agents.
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!   message ──────▶│         AgentSystem          │
//!                  │  ┌──────────┐  ┌──────────┐  │
//!                  │  │ Registry │  │ Provider │  │
//!                  │  │  id→Agent│  │   Pool   │  │
//!                  │  └────┬─────┘  └──────────┘  │
//!                  └───────┼──────────────────────┘
//!             ┌────────────┼────────────┐
//!             ▼            ▼            ▼
//!          agent a      agent b      agent c     (one task each on broadcast)
//! ```
//!
//! Usage and lookup errors (no framework, unknown agent) are returned to the
//! caller. Everything that goes wrong while an agent handles a message,
//! including a panic, is turned into an error [`Outcome`] for that agent.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use indexmap::IndexMap;
use tokio::task::JoinSet;

use crate::agent::{Agent, AgentParams};
use crate::error::{AgentError, Result};
use crate::framework::AgentFramework;
use crate::message::Message;
use crate::outcome::Outcome;
use crate::pool::ProviderPool;
use crate::provider::Provider;
use crate::registry::AgentRegistry;

/// Predicate selecting broadcast recipients
pub type AgentFilter = dyn Fn(&dyn Agent) -> bool + Send + Sync;

/// Per-recipient outcomes of a broadcast, in registry order
pub type BroadcastOutcomes = IndexMap<String, Outcome>;

#[derive(Default)]
pub struct AgentSystem {
    registry: AgentRegistry,
    providers: ProviderPool,
    framework: Option<Box<dyn AgentFramework>>,
    running: bool,
}

impl AgentSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub const fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    pub const fn providers(&self) -> &ProviderPool {
        &self.providers
    }

    /// Add or replace a provider. The first provider added becomes the default.
    pub fn add_provider(&mut self, provider: Arc<dyn Provider>) {
        tracing::debug!(provider = %provider.name(), "Adding provider");
        self.providers.add(provider);
    }

    /// Returns `false` if no provider named `name` exists
    pub fn set_default_provider(&mut self, name: &str) -> bool {
        self.providers.set_default(name)
    }

    /// Provider by name, or the default provider when `name` is `None`
    pub fn get_provider(&self, name: Option<&str>) -> Option<Arc<dyn Provider>> {
        self.providers.get(name)
    }

    pub fn set_framework(&mut self, framework: impl AgentFramework + 'static) {
        self.set_boxed_framework(Box::new(framework));
    }

    pub fn set_boxed_framework(&mut self, framework: Box<dyn AgentFramework>) {
        tracing::debug!(framework = %framework.name(), "Setting agent framework");
        self.framework = Some(framework);
    }

    pub fn framework(&self) -> Option<&dyn AgentFramework> {
        self.framework.as_deref()
    }

    pub fn framework_mut(&mut self) -> Option<&mut (dyn AgentFramework + 'static)> {
        self.framework.as_deref_mut()
    }

    /// Build an agent with the configured framework and register it under `id`.
    ///
    /// Fails with [`AgentError::Config`] when no framework is set and with
    /// [`AgentError::DuplicateAgent`] when `id` is taken; in the latter case
    /// the framework is not asked to build anything.
    pub fn create_agent(&mut self, id: &str, params: AgentParams) -> Result<Arc<dyn Agent>> {
        let framework = self
            .framework
            .as_ref()
            .ok_or_else(|| AgentError::Config("no agent framework has been set".into()))?;

        if self.registry.contains(id) {
            return Err(AgentError::DuplicateAgent(id.to_string()));
        }

        let agent = framework.create_agent(id, params)?;
        self.registry.register(id, Arc::clone(&agent));
        tracing::debug!(agent = %id, framework = %framework.name(), "Agent created");
        Ok(agent)
    }

    /// Start every provider, then the framework.
    ///
    /// Individual failures are logged and skipped; the system is running
    /// afterwards regardless. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }

        for (name, provider) in self.providers.iter() {
            match provider.start() {
                Ok(()) => tracing::info!(provider = %name, "Provider started"),
                Err(e) => tracing::error!(provider = %name, error = %e, "Failed to start provider"),
            }
        }

        if let Some(framework) = self.framework.as_mut() {
            match framework.start() {
                Ok(()) => tracing::info!(framework = %framework.name(), "Framework started"),
                Err(e) => {
                    tracing::error!(
                        framework = %framework.name(),
                        error = %e,
                        "Failed to start framework"
                    );
                }
            }
        }

        self.running = true;
        true
    }

    /// Stop the framework, then every provider. Returns `false` if not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }

        if let Some(framework) = self.framework.as_mut() {
            match framework.stop() {
                Ok(()) => tracing::info!(framework = %framework.name(), "Framework stopped"),
                Err(e) => {
                    tracing::error!(
                        framework = %framework.name(),
                        error = %e,
                        "Failed to stop framework"
                    );
                }
            }
        }

        for (name, provider) in self.providers.iter() {
            provider.stop();
            tracing::info!(provider = %name, "Provider stopped");
        }

        self.running = false;
        true
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Deliver `message` to a single agent and return its outcome unchanged.
    ///
    /// Only an unknown `agent_id` is an error; a failing agent yields an
    /// error outcome.
    pub async fn process_message(&self, agent_id: &str, message: Message) -> Result<Outcome> {
        let agent = self
            .registry
            .get(agent_id)
            .ok_or_else(|| AgentError::AgentNotFound(agent_id.to_string()))?;

        Ok(deliver(agent, message).await)
    }

    /// Deliver a copy of `message` to every agent accepted by `filter`
    /// (all agents when `None`), concurrently, one task per agent.
    ///
    /// Waits for every recipient. Each agent gets its own copy of the
    /// message, and a failure in one agent only affects its own entry.
    pub async fn broadcast_message(
        &self,
        message: &Message,
        filter: Option<&AgentFilter>,
    ) -> BroadcastOutcomes {
        let recipients: Vec<(String, Arc<dyn Agent>)> = self
            .registry
            .list()
            .into_iter()
            .filter(|(_, agent)| filter.is_none_or(|accept| accept(agent.as_ref())))
            .collect();

        tracing::debug!(recipients = recipients.len(), "Broadcasting message");

        // Dropping the set aborts every task still in flight
        let mut tasks = JoinSet::new();
        let mut ids = Vec::with_capacity(recipients.len());
        for (index, (id, agent)) in recipients.into_iter().enumerate() {
            let message = message.clone();
            tasks.spawn(async move { (index, deliver(agent, message).await) });
            ids.push(id);
        }

        let mut slots: Vec<Option<Outcome>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Broadcast task failed"),
            }
        }

        let mut outcomes = BroadcastOutcomes::with_capacity(ids.len());
        for (id, slot) in ids.into_iter().zip(slots) {
            let outcome =
                slot.unwrap_or_else(|| Outcome::failure(&id, "broadcast task did not complete"));
            outcomes.insert(id, outcome);
        }

        outcomes
    }
}

/// Run one agent, converting an `Err` or a panic into an error outcome
async fn deliver(agent: Arc<dyn Agent>, message: Message) -> Outcome {
    let result = AssertUnwindSafe(agent.process(message)).catch_unwind().await;

    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::error!(agent = %agent.id(), error = %e, "Agent failed to process message");
            Outcome::failure(agent.id(), e)
        }
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            tracing::error!(
                agent = %agent.id(),
                panic = %reason,
                "Agent panicked while processing message"
            );
            Outcome::failure(agent.id(), format!("agent panicked: {reason}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
