//! agent-cli
//!
//! Builds a small roster of agents on top of `agent-runtime` and routes
//! one message to a single agent or to the whole roster. Results are
//! printed as JSON on stdout, logs go to stderr.

mod cli;
mod demo;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{Agent, Message};
use agent_runtime::RuntimeConfig;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    let config = RuntimeConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let provider = demo::build_provider(cli.provider, cli.model.clone(), &config).await;
    let mut system = demo::build_system(provider, cli.framework)?;

    tracing::info!("Registered {} agents:", system.registry().len());
    for id in system.registry().ids() {
        tracing::info!("  • {}", id);
    }

    system.start();

    let output = match cli.command {
        Command::Agents => {
            let agents: Vec<_> = system
                .registry()
                .list()
                .values()
                .map(|agent| {
                    let profile = agent.profile();
                    json!({
                        "id": profile.id(),
                        "name": profile.name(),
                        "role": profile.role(),
                        "connections": profile.connections(),
                    })
                })
                .collect();
            json!(agents)
        }
        Command::Ask { agent, text } => {
            let outcome = system
                .process_message(&agent, Message::text(text.join(" ")))
                .await;
            match outcome {
                Ok(outcome) => serde_json::to_value(outcome)?,
                Err(e) => {
                    system.stop();
                    return Err(e.into());
                }
            }
        }
        Command::Broadcast { role, text } => {
            let message = Message::text(text.join(" "));
            let outcomes = match role {
                Some(needle) => {
                    let filter = move |agent: &dyn Agent| demo::role_mentions(agent, &needle);
                    system.broadcast_message(&message, Some(&filter)).await
                }
                None => system.broadcast_message(&message, None).await,
            };
            serde_json::to_value(outcomes)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    system.stop();
    Ok(())
}
