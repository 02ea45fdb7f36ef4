//! Agent Outcomes
//!
//! The result an agent produces for a message. Like [`Message`], it is an open
//! key-value map, but the following keys form the contract between agents and
//! their callers:
//!
//! | key        | meaning                                          |
//! |------------|--------------------------------------------------|
//! | `status`   | `"success"` or `"error"`                         |
//! | `agent`    | id of the responding agent                       |
//! | `response` | the answer (success); some agents use `content`  |
//! | `error`    | human-readable failure description (error)       |
//! | `input`    | echo of the message that was processed           |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// Conventional outcome status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an agent processing a [`Message`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome(Map<String, Value>);

impl Outcome {
    pub const STATUS: &'static str = "status";
    pub const AGENT: &'static str = "agent";
    pub const RESPONSE: &'static str = "response";
    pub const CONTENT: &'static str = "content";
    pub const ERROR: &'static str = "error";
    pub const INPUT: &'static str = "input";

    /// A successful outcome attributed to `agent`
    pub fn success(agent: impl Into<String>) -> Self {
        Self::with_status(Status::Success, agent)
    }

    /// An error outcome attributed to `agent`
    pub fn failure(agent: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::with_status(Status::Error, agent).with(Self::ERROR, error.to_string())
    }

    fn with_status(status: Status, agent: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(Self::STATUS.into(), status.as_str().into());
        map.insert(Self::AGENT.into(), Value::String(agent.into()));
        Self(map)
    }

    /// Normalize an arbitrary value returned by a user callback.
    ///
    /// Objects keep their fields; `status` defaults to `success` and `agent`
    /// to `agent`. Any other value becomes the `response` of a success
    /// outcome that echoes `input`.
    pub fn from_value(value: Value, agent: &str, input: &Message) -> Self {
        match value {
            Value::Object(mut map) => {
                map.entry(Self::STATUS)
                    .or_insert_with(|| Status::Success.as_str().into());
                map.entry(Self::AGENT)
                    .or_insert_with(|| Value::String(agent.to_string()));
                Self(map)
            }
            other => Self::success(agent)
                .with_response(other)
                .with_input(input),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_response(self, response: impl Into<Value>) -> Self {
        self.with(Self::RESPONSE, response)
    }

    #[must_use]
    pub fn with_input(self, input: &Message) -> Self {
        self.with(Self::INPUT, input.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parsed `status`; `None` when missing or unrecognized
    pub fn status(&self) -> Option<Status> {
        self.get(Self::STATUS)
            .and_then(Value::as_str)
            .and_then(Status::parse)
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(Status::Success)
    }

    pub fn is_error(&self) -> bool {
        self.status() == Some(Status::Error)
    }

    pub fn agent(&self) -> Option<&str> {
        self.get(Self::AGENT).and_then(Value::as_str)
    }

    /// The answer, looking at `response` first and `content` second
    pub fn response(&self) -> Option<&Value> {
        self.get(Self::RESPONSE).or_else(|| self.get(Self::CONTENT))
    }

    pub fn error(&self) -> Option<&str> {
        self.get(Self::ERROR).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Outcome {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
