//! Runtime Configuration
//!
//! Everything is read from the environment (a `.env` file is loaded by the
//! binary beforehand).
//!
//! | variable          | used by                         |
//! |-------------------|---------------------------------|
//! | `RUST_LOG`        | log filter (takes precedence)   |
//! | `AGENT_LOG_LEVEL` | log filter                      |
//! | `OPENAI_API_KEY`  | [`OpenAiConfig`]                |
//! | `OPENAI_MODEL`    | [`OpenAiConfig`]                |
//! | `OPENAI_BASE_URL` | [`OpenAiConfig`]                |
//! | `OLLAMA_HOST`     | [`OllamaConfig`]                |
//! | `OLLAMA_PORT`     | [`OllamaConfig`]                |
//! | `OLLAMA_MODEL`    | [`OllamaConfig`]                |

#[cfg(feature = "ollama")]
use crate::ollama::OllamaConfig;
#[cfg(feature = "openai")]
use crate::openai::OpenAiConfig;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// `tracing` filter directive
    pub log_filter: String,

    #[cfg(feature = "openai")]
    pub openai: OpenAiConfig,

    #[cfg(feature = "ollama")]
    pub ollama: OllamaConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.into(),
            #[cfg(feature = "openai")]
            openai: OpenAiConfig::default(),
            #[cfg(feature = "ollama")]
            ollama: OllamaConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: resolve_log_filter(
                std::env::var("RUST_LOG").ok(),
                std::env::var("AGENT_LOG_LEVEL").ok(),
            ),
            #[cfg(feature = "openai")]
            openai: OpenAiConfig::from_env(),
            #[cfg(feature = "ollama")]
            ollama: OllamaConfig::from_env(),
        }
    }
}

/// Pick the log filter: a full `RUST_LOG` directive wins over a plain level
fn resolve_log_filter(rust_log: Option<String>, level: Option<String>) -> String {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            level
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.into())
}
