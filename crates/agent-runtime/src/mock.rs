//! Mock Provider
//!
//! For testing and demo purposes. Answers without any network access.

use std::sync::atomic::{AtomicUsize, Ordering};

use agent_core::{
    error::{AgentError, Result},
    message::{ChatMessage, Role},
    provider::{Completion, FinishReason, GenerationOptions, LazyClient, Provider, TokenUsage},
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// In-process provider that echoes the last user turn or returns a fixed reply
pub struct MockProvider {
    name: String,
    reply: Option<String>,
    fail_start: bool,
    session: LazyClient<()>,
    start_attempts: AtomicUsize,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Mock")
    }
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: None,
            fail_start: false,
            session: LazyClient::new(),
            start_attempts: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`
    #[must_use]
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    /// Refuse to start, as a provider without credentials would
    #[must_use]
    pub const fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Number of times `start` has been called
    pub fn start_attempts(&self) -> usize {
        self.start_attempts.load(Ordering::SeqCst)
    }

    /// Conversations received so far
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    fn answer(&self, messages: &[ChatMessage]) -> String {
        if let Some(reply) = &self.reply {
            return reply.clone();
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str());
        format!("[{}] {}", self.name, last_user)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        self.start_attempts.fetch_add(1, Ordering::SeqCst);
        self.session.get_or_try_init(|| {
            if self.fail_start {
                Err(AgentError::Auth(format!("{} is configured to fail", self.name)))
            } else {
                Ok(())
            }
        })?;
        Ok(())
    }

    fn stop(&self) {
        self.session.clear();
    }

    fn is_started(&self) -> bool {
        self.session.is_initialized()
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.start()?;
        self.requests.lock().push(messages.to_vec());

        let content = self.answer(messages);
        let words = u32::try_from(content.split_whitespace().count()).unwrap_or(u32::MAX);
        Ok(Completion {
            content,
            model: options.model_or("mock").to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 0,
                completion_tokens: words,
                total_tokens: words,
            }),
            finish_reason: Some(FinishReason::Stop),
        })
    }
}
