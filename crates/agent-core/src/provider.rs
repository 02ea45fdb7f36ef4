//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all LLM providers (Ollama, OpenAI, ...)
//! so agents and the system work with any backend without code changes.
//!
//! Providers connect lazily: [`Provider::start`] builds the backing client on
//! first use and is idempotent, [`Provider::stop`] drops it. Both `chat` and
//! `generate` start the provider on demand.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, Provider};
//!
//! let provider = OllamaProvider::from_env();
//! provider.start()?;
//! let answer = provider.generate("Why is the sky blue?", &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::ChatMessage;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model override; `None` uses the provider's configured model
    #[serde(default)]
    pub model: Option<String>,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

const fn default_temperature() -> f32 { 0.7 }
const fn default_max_tokens() -> u32 { 2048 }
const fn default_top_p() -> f32 { 0.9 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationOptions {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The requested model, falling back to `default`
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

impl FinishReason {
    /// Map a vendor finish reason string
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "tool_calls" | "function_call" | "tool_use" => Self::ToolUse,
            "content_filter" => Self::ContentFilter,
            _ => Self::Error,
        }
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique name of this provider inside a pool
    fn name(&self) -> &str;

    /// Build the backing client. Succeeds immediately if already started.
    fn start(&self) -> Result<()>;

    /// Drop the backing client. Safe to call when not started.
    fn stop(&self);

    fn is_started(&self) -> bool;

    /// Generate a completion from a conversation
    async fn chat(&self, messages: &[ChatMessage], options: &GenerationOptions)
        -> Result<Completion>;

    /// Generate a reply to a single prompt
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let completion = self.chat(&[ChatMessage::user(prompt)], options).await?;
        Ok(completion.content)
    }
}

/// Lazily-constructed, clearable client handle
///
/// Providers keep their vendor client here to get idempotent start/stop
/// without holding a lock across an await: callers clone the handle out.
pub struct LazyClient<C> {
    slot: RwLock<Option<C>>,
}

impl<C> Default for LazyClient<C> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<C: Clone> LazyClient<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current client, if initialized
    pub fn get(&self) -> Option<C> {
        self.slot.read().clone()
    }

    /// Return the client, constructing it with `init` if absent.
    ///
    /// The second field is `true` when this call performed the construction.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<(C, bool)>
    where
        F: FnOnce() -> Result<C>,
    {
        if let Some(client) = self.get() {
            return Ok((client, false));
        }

        let mut slot = self.slot.write();
        if let Some(client) = slot.as_ref() {
            return Ok((client.clone(), false));
        }
        let client = init()?;
        *slot = Some(client.clone());
        Ok((client, true))
    }

    /// Publish a ready-made client, replacing any previous one
    pub fn set(&self, client: C) {
        *self.slot.write() = Some(client);
    }

    /// Drop the client. Returns whether one was present.
    pub fn clear(&self) -> bool {
        self.slot.write().take().is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Client or a `ProviderUnavailable` error naming `owner`
    pub fn require(&self, owner: &str) -> Result<C> {
        self.get()
            .ok_or_else(|| AgentError::ProviderUnavailable(format!("{owner} is not started")))
    }
}
