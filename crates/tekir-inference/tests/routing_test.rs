//! End-to-end routing in the test environment.
//!
//! Builds the router the way a chat handler would at startup: configuration
//! from environment variables, the binding table it selects, and stored
//! preference values read from the request.

use std::collections::HashMap;
use std::sync::Arc;

use tekir_core::defaults::{PROVIDER_COOKIE, REASONING_STORAGE_KEY};
use tekir_core::{collect_stream, ChatRequest};
use tekir_inference::mock::{MOCK_CHAT_RESPONSE, MOCK_REASONING, MOCK_TITLE};
use tekir_inference::{
    resolve_model_id, ChatPreference, ChatRouter, Environment, InferenceConfig, UtilityModel,
};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn playwright_router() -> ChatRouter {
    let config = InferenceConfig::from_lookup(env(&[("PLAYWRIGHT", "True")])).unwrap();
    assert_eq!(config.environment, Environment::Test);
    ChatRouter::from_config(&config).unwrap()
}

#[test]
fn test_storage_keys() {
    assert_eq!(PROVIDER_COOKIE, "chat-model");
    assert_eq!(REASONING_STORAGE_KEY, "useReasoning");
}

#[tokio::test]
async fn test_default_preference_routes_to_chat_double() {
    let router = playwright_router();

    let preference = ChatPreference::from_stored(None, None);
    let routed = router.route(&preference).unwrap();
    assert_eq!(routed.model_id, "chat-model");
    assert_eq!(routed.handle.provider_name(), "mock");

    let generation = routed
        .handle
        .generate(&ChatRequest::from_prompt("hello"))
        .await
        .unwrap();
    assert_eq!(generation.text, MOCK_CHAT_RESPONSE);
    assert!(generation.reasoning.is_none());
}

#[tokio::test]
async fn test_stored_deepseek_reasoning_preference() {
    let router = playwright_router();

    let preference = ChatPreference::from_stored(Some("deepseek"), Some("true"));
    let routed = router.route(&preference).unwrap();
    assert_eq!(routed.model_id, "deepseek-reasoning");
    assert_eq!(router.selected_provider(&preference).name, "Deepseek");

    let stream = routed
        .handle
        .stream(&ChatRequest::from_prompt("Why?"))
        .await
        .unwrap();
    let generation = collect_stream(stream).await.unwrap();
    assert_eq!(generation.reasoning.as_deref(), Some(MOCK_REASONING));
    assert_eq!(generation.text, MOCK_CHAT_RESPONSE);
}

#[test]
fn test_stale_cookie_uses_catch_all() {
    let router = playwright_router();

    let preference = ChatPreference::from_stored(Some("removed-provider"), Some("false"));
    let routed = router.route(&preference).unwrap();
    assert_eq!(routed.model_id, "chat-model");
    assert_eq!(router.selected_provider(&preference).id, "openai");
}

#[test]
fn test_unreadable_flag_disables_reasoning() {
    let router = playwright_router();

    for flag in ["yes", "1", "", "TRUE"] {
        let preference = ChatPreference::from_stored(Some("deepseek"), Some(flag));
        assert_eq!(router.route(&preference).unwrap().model_id, "deepseek-chat");
    }
}

#[test]
fn test_resolver_is_idempotent() {
    for provider in ["openai", "deepseek", "Deepseek", ""] {
        for reasoning in [false, true] {
            assert_eq!(
                resolve_model_id(provider, reasoning),
                resolve_model_id(provider, reasoning)
            );
        }
    }
}

#[tokio::test]
async fn test_utility_models_bound() {
    let router = playwright_router();
    let request = ChatRequest::from_prompt("Summarize this chat");

    let title = router.utility(UtilityModel::Title).unwrap();
    assert_eq!(title.generate(&request).await.unwrap().text, MOCK_TITLE);

    let artifact = router.utility(UtilityModel::Artifact).unwrap();
    assert!(!artifact.generate(&request).await.unwrap().text.is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_share_router() {
    let router = Arc::new(playwright_router());

    let mut tasks = Vec::new();
    for (provider, reasoning) in [
        ("openai", false),
        ("openai", true),
        ("deepseek", false),
        ("deepseek", true),
    ] {
        let router = Arc::clone(&router);
        tasks.push(tokio::spawn(async move {
            let routed = router
                .route(&ChatPreference::new(provider, reasoning))
                .unwrap();
            let generation = routed
                .handle
                .generate(&ChatRequest::from_prompt("hi"))
                .await
                .unwrap();
            (routed.model_id, generation.reasoning.is_some())
        }));
    }

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    assert_eq!(
        results,
        vec![
            ("chat-model", false),
            ("chat-model-reasoning", true),
            ("deepseek-chat", false),
            ("deepseek-reasoning", true),
        ]
    );
}

#[test]
fn test_production_without_key_fails_at_startup() {
    let config = InferenceConfig::from_lookup(env(&[("TEKIR_ENV", "production")])).unwrap();
    let err = ChatRouter::from_config(&config).unwrap_err();
    assert!(err.is_configuration_defect());
    assert!(err.to_string().contains("OPENROUTER_API_KEY"));
}

#[test]
fn test_production_router_builds_with_key() {
    let config = InferenceConfig::from_lookup(env(&[
        ("TEKIR_ENV", "production"),
        ("OPENROUTER_API_KEY", "sk-or-test"),
    ]))
    .unwrap();
    let router = ChatRouter::from_config(&config).unwrap();

    let routed = router
        .route(&ChatPreference::new("deepseek", true))
        .unwrap();
    assert_eq!(routed.model_id, "deepseek-reasoning");
    assert_eq!(routed.handle.model_id(), "deepseek/deepseek-r1");
    assert_eq!(routed.handle.reasoning_tag(), Some("think"));
}
