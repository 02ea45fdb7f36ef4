//! Agent Registry
//!
//! In-memory store of agents keyed by id. Iteration follows insertion order.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::agent::Agent;

/// Registry for available agents
#[derive(Default)]
pub struct AgentRegistry {
    agents: IndexMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. First writer wins: returns `false` and leaves the
    /// existing agent untouched if `id` is taken.
    pub fn register(&mut self, id: impl Into<String>, agent: Arc<dyn Agent>) -> bool {
        match self.agents.entry(id.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(agent);
                true
            }
        }
    }

    /// Get an agent by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Remove an agent. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: &str) -> bool {
        self.agents.shift_remove(id).is_some()
    }

    /// Snapshot of all registered agents; changes to it do not affect the registry
    pub fn list(&self) -> IndexMap<String, Arc<dyn Agent>> {
        self.agents.clone()
    }

    /// Agents whose metadata `key` equals `value`, in registration order
    pub fn filter_by_metadata(&self, key: &str, value: &Value) -> Vec<Arc<dyn Agent>> {
        self.agents
            .values()
            .filter(|agent| agent.profile().has_metadata(key, value))
            .cloned()
            .collect()
    }

    /// Registered ids
    pub fn ids(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
