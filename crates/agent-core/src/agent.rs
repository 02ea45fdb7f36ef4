//! Agent Capability
//!
//! An agent turns an inbound [`Message`] into an [`Outcome`]. Concrete agents
//! are built by an [`AgentFramework`](crate::framework::AgentFramework) and
//! share the identity/bookkeeping state kept in [`AgentProfile`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::message::Message;
use crate::outcome::Outcome;

/// Identity and mutable bookkeeping shared by every agent kind
#[derive(Debug)]
pub struct AgentProfile {
    id: String,
    name: String,
    role: String,
    /// Outgoing edges, by agent id
    connections: RwLock<IndexSet<String>>,
    metadata: RwLock<IndexMap<String, Value>>,
}

impl AgentProfile {
    /// Create a profile; `name` defaults to `id`, `role` to empty
    pub fn new(id: impl Into<String>, name: Option<String>, role: Option<String>) -> Self {
        let id = id.into();
        Self {
            name: name.unwrap_or_else(|| id.clone()),
            role: role.unwrap_or_default(),
            id,
            connections: RwLock::new(IndexSet::new()),
            metadata: RwLock::new(IndexMap::new()),
        }
    }

    /// Create a profile from the `name`/`role` carried by creation params
    pub fn from_params(id: impl Into<String>, params: &AgentParams) -> Self {
        Self::new(id, params.name.clone(), params.role.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Record a one-way edge to `other`. Returns `false` if it already existed.
    pub fn connect(&self, other: impl Into<String>) -> bool {
        self.connections.write().insert(other.into())
    }

    /// Connected agent ids in the order they were added
    pub fn connections(&self) -> Vec<String> {
        self.connections.read().iter().cloned().collect()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.write().insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<Value> {
        self.metadata.read().get(key).cloned()
    }

    pub fn metadata_or(&self, key: &str, default: Value) -> Value {
        self.metadata(key).unwrap_or(default)
    }

    /// Whether `key` is present and equal to `value`
    pub fn has_metadata(&self, key: &str, value: &Value) -> bool {
        self.metadata.read().get(key) == Some(value)
    }

    pub fn metadata_snapshot(&self) -> IndexMap<String, Value> {
        self.metadata.read().clone()
    }
}

/// Agent trait - implement to add a new kind of agent
///
/// `process` reports its own failures as error outcomes. Returning `Err` or
/// panicking is treated as a misbehaving agent: the
/// [`AgentSystem`](crate::system::AgentSystem) converts both into an error
/// outcome for that agent alone.
#[async_trait]
pub trait Agent: Send + Sync {
    fn profile(&self) -> &AgentProfile;

    /// Process one message
    async fn process(&self, message: Message) -> Result<Outcome>;

    fn id(&self) -> &str {
        self.profile().id()
    }

    /// Record a one-way connection to another agent
    fn connect_to(&self, other: &dyn Agent) -> bool {
        self.profile().connect(other.id())
    }
}

/// User-supplied message handler for callback-driven agents
pub type Processor =
    Arc<dyn Fn(Arc<AgentProfile>, Message) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Wrap an async closure as a [`Processor`]
pub fn processor<F, Fut>(f: F) -> Processor
where
    F: Fn(Arc<AgentProfile>, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move |profile, message| Box::pin(f(profile, message)))
}

/// Parameters passed to a framework when creating an agent
#[derive(Clone, Default)]
pub struct AgentParams {
    pub name: Option<String>,
    pub role: Option<String>,
    /// Framework-specific options (e.g. `system_prompt`, `model`)
    pub options: Map<String, Value>,
    pub processor: Option<Processor>,
}

impl AgentParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn processor<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<AgentProfile>, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.processor = Some(processor(f));
        self
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

impl std::fmt::Debug for AgentParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentParams")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("options", &self.options)
            .field("processor", &self.processor.is_some())
            .finish()
    }
}
