//! End-to-end flows through `AgentSystem` with the runtime frameworks

use std::sync::Arc;

use agent_core::{ChatMessage, GenerationOptions, Provider};
use agent_runtime::{
    AgentError, AgentParams, AgentSystem, CustomAgentFramework, LlmAgentFramework, Message,
    MockProvider,
};
use serde_json::json;

/// A callback agent that asks the provider to answer in character
fn in_character(provider: Arc<dyn Provider>, role: &str) -> AgentParams {
    AgentParams::new().role(role).processor(move |profile, message| {
        let provider = Arc::clone(&provider);
        async move {
            let prompt = format!(
                "Acting as a {}, answer: {}",
                profile.role(),
                message.content().unwrap_or_default()
            );
            let answer = provider
                .chat(&[ChatMessage::user(prompt)], &GenerationOptions::default())
                .await?;
            Ok(json!({ "response": answer.content, "provider": provider.name() }))
        }
    })
}

#[tokio::test]
async fn custom_agents_route_through_default_provider() {
    let mut system = AgentSystem::new();
    system.add_provider(Arc::new(MockProvider::new("mock")));
    system.set_framework(CustomAgentFramework::new());

    let provider = system.get_provider(None).expect("default provider");
    system
        .create_agent("assistant", in_character(Arc::clone(&provider), "helpful assistant"))
        .unwrap();
    system
        .create_agent("critic", in_character(Arc::clone(&provider), "harsh critic"))
        .unwrap();

    assert!(system.start());
    assert!(provider.is_started());

    let outcome = system
        .process_message("assistant", Message::text("plan my weekend"))
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.agent(), Some("assistant"));
    assert_eq!(
        outcome.response(),
        Some(&json!("[mock] Acting as a helpful assistant, answer: plan my weekend"))
    );
    assert_eq!(outcome.get("provider"), Some(&json!("mock")));

    let critics_only = |agent: &dyn agent_core::Agent| agent.profile().role() == "harsh critic";
    let outcomes = system
        .broadcast_message(&Message::text("rate this"), Some(&critics_only))
        .await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes["critic"].is_success());

    assert!(system.stop());
    assert!(!provider.is_started());
}

#[tokio::test]
async fn llm_agents_follow_system_lifecycle() {
    let provider = Arc::new(MockProvider::new("mock").with_reply("Try hiking."));
    let mut system = AgentSystem::new();
    system.add_provider(provider.clone());
    system.set_framework(LlmAgentFramework::with_provider(provider.clone()));

    for id in ["planner", "scout"] {
        system
            .create_agent(id, AgentParams::new().option("system_prompt", "Be concise."))
            .unwrap();
    }

    let before = system
        .process_message("planner", Message::text("weekend?"))
        .await
        .unwrap();
    assert!(before.is_error());

    system.start();
    let outcomes = system.broadcast_message(&Message::text("weekend?"), None).await;
    assert_eq!(outcomes.keys().collect::<Vec<_>>(), vec!["planner", "scout"]);
    for outcome in outcomes.values() {
        assert!(outcome.is_success());
        assert_eq!(outcome.response(), Some(&json!("Try hiking.")));
    }
    assert_eq!(provider.requests().len(), 2);

    system.stop();
    let after = system
        .process_message("scout", Message::text("weekend?"))
        .await
        .unwrap();
    assert!(after.is_error());
}

#[tokio::test]
async fn failed_startup_is_not_fatal() {
    let broken = Arc::new(MockProvider::new("broken").failing_start());
    let healthy = Arc::new(MockProvider::new("healthy"));

    let mut system = AgentSystem::new();
    system.add_provider(broken.clone());
    system.add_provider(healthy.clone());
    system.set_framework(LlmAgentFramework::with_provider(broken.clone()));
    system.create_agent("a", AgentParams::new()).unwrap();

    assert!(system.start());
    assert!(system.is_running());
    assert!(healthy.is_started());
    assert!(!broken.is_started());

    let outcome = system.process_message("a", Message::text("hi")).await.unwrap();
    assert!(outcome.is_error());

    assert!(!system.start());
    assert_eq!(healthy.start_attempts(), 1);
}

#[tokio::test]
async fn processor_errors_stay_inside_their_outcome() {
    let mut system = AgentSystem::new();
    system.set_framework(CustomAgentFramework::new());
    system
        .create_agent(
            "flaky",
            AgentParams::new().processor(|_, _| async move {
                Err(anyhow::anyhow!("quota exhausted").into())
            }),
        )
        .unwrap();
    system
        .create_agent(
            "steady",
            AgentParams::new().processor(|_, message| async move { Ok(json!(message.content())) }),
        )
        .unwrap();
    system.create_agent("empty", AgentParams::new()).unwrap();

    let outcomes = system.broadcast_message(&Message::text("ping"), None).await;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes["flaky"].error(), Some("quota exhausted"));
    assert_eq!(outcomes["steady"].response(), Some(&json!("ping")));
    assert!(outcomes["empty"].is_error());

    let duplicate = system.create_agent("steady", AgentParams::new());
    assert!(matches!(duplicate, Err(AgentError::DuplicateAgent(_))));
}
