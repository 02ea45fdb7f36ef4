//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "agent-cli",
    version,
    about = "Route messages to a small roster of LLM-backed agents",
    after_help = concat!(
        "Examples:\n",
        "  agent-cli agents\n",
        "  agent-cli ask --agent planner organise a team offsite\n",
        "  agent-cli --provider openai broadcast --role critic is this plan realistic?",
    )
)]
pub struct Cli {
    /// LLM provider backing the agents
    #[arg(long, value_enum, default_value_t = ProviderKind::Mock)]
    pub provider: ProviderKind,

    /// Model override for the selected provider
    #[arg(long)]
    pub model: Option<String>,

    /// Kind of agents to build
    #[arg(long, value_enum, default_value_t = FrameworkKind::Custom)]
    pub framework: FrameworkKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// In-process echo provider, no network access
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI chat completions API (needs OPENAI_API_KEY)
    Openai,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FrameworkKind {
    /// Callback agents that prompt the default provider in character
    Custom,
    /// Provider-backed agents driven by a system prompt
    Llm,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the registered agents
    Agents,

    /// Send a message to one agent
    Ask {
        /// Recipient agent id
        #[arg(long)]
        agent: String,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Send a message to every agent, or to those whose role mentions `--role`
    Broadcast {
        #[arg(long)]
        role: Option<String>,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}
