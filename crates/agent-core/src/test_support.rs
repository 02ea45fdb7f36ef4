//! Test doubles shared by the unit tests of this crate

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::agent::{Agent, AgentProfile};
use crate::error::{AgentError, Result};
use crate::message::{ChatMessage, Message};
use crate::outcome::Outcome;
use crate::provider::{Completion, GenerationOptions, Provider};

/// Agent that answers every message with its content
pub struct StubAgent {
    profile: AgentProfile,
}

impl StubAgent {
    pub fn new(id: &str) -> Self {
        Self {
            profile: AgentProfile::new(id, None, None),
        }
    }

    pub fn arc(id: &str) -> Arc<dyn Agent> {
        Arc::new(Self::new(id))
    }

    pub fn named(id: &str, name: &str) -> Arc<dyn Agent> {
        Arc::new(Self {
            profile: AgentProfile::new(id, Some(name.to_string()), None),
        })
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    async fn process(&self, message: Message) -> Result<Outcome> {
        Ok(Outcome::success(self.id()).with_response(message.content().unwrap_or_default()))
    }
}

/// Provider that counts lifecycle calls and can be told to fail on start
pub struct StubProvider {
    name: String,
    fail_start: bool,
    started: AtomicBool,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_start: false,
            started: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail_start: true,
            ..Self::new(name)
        }
    }

    pub fn arc(name: &str) -> Arc<dyn Provider> {
        Arc::new(Self::new(name))
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(AgentError::Auth(format!("{} has no API key", self.name)));
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<Completion> {
        self.start()?;
        Ok(Completion {
            content: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
            model: "stub".into(),
            usage: None,
            finish_reason: None,
        })
    }
}
