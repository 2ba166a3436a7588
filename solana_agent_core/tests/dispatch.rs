//! End-to-end dispatch behavior: lookup, validation, handler faults, and
//! consistency of the bundled action set.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use solana_sdk::signature::{Keypair, Signer};

use solana_agent_core::{
    register_all_actions, schema, Action, ActionExample, ActionMetadata, ActionRegistry, Agent,
    KeypairWallet,
};

fn test_agent() -> Agent {
    let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
    Agent::new(wallet, "http://localhost:8899")
}

struct PingAction {
    meta: ActionMetadata,
}

impl PingAction {
    fn new() -> Self {
        Self {
            meta: ActionMetadata {
                name: "PING".to_string(),
                similes: vec!["ping".to_string()],
                description: "Liveness check".to_string(),
                examples: vec![vec![ActionExample {
                    input: json!({}),
                    output: json!({ "status": "success", "pong": true }),
                    explanation: "Ping the agent".to_string(),
                }]],
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false,
                }),
            },
        }
    }
}

#[async_trait]
impl Action for PingAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, _agent: &Agent, _input: Value) -> anyhow::Result<Value> {
        Ok(json!({ "status": "success", "pong": true }))
    }
}

struct EchoAction {
    meta: ActionMetadata,
    calls: Arc<AtomicUsize>,
}

impl EchoAction {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        Self {
            meta: ActionMetadata {
                name: "ECHO".to_string(),
                similes: vec![],
                description: "Echo a message back".to_string(),
                examples: vec![],
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "msg": { "type": "string" },
                    },
                    "required": ["msg"],
                    "additionalProperties": false,
                }),
            },
            calls,
        }
    }
}

#[async_trait]
impl Action for EchoAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, _agent: &Agent, input: Value) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "echo": input["msg"] }))
    }
}

struct BoomAction {
    meta: ActionMetadata,
}

impl BoomAction {
    fn new() -> Self {
        Self {
            meta: ActionMetadata {
                name: "BOOM".to_string(),
                similes: vec![],
                description: "Always fails".to_string(),
                examples: vec![],
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false,
                }),
            },
        }
    }
}

#[async_trait]
impl Action for BoomAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.meta
    }

    async fn call(&self, _agent: &Agent, _input: Value) -> anyhow::Result<Value> {
        anyhow::bail!("boom")
    }
}

#[tokio::test]
async fn executes_a_registered_action() {
    let mut registry = ActionRegistry::new();
    registry.register(PingAction::new()).unwrap();
    let agent = test_agent();

    let envelope = registry.execute("PING", &agent, json!({})).await;
    assert_eq!(envelope, json!({ "status": "success", "pong": true }));
}

#[tokio::test]
async fn validation_failure_mentions_the_field_and_skips_the_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ActionRegistry::new();
    registry.register(EchoAction::new(calls.clone())).unwrap();
    let agent = test_agent();

    let envelope = registry.execute("ECHO", &agent, json!({})).await;
    assert_eq!(envelope["status"], "error");
    assert!(envelope["message"].as_str().unwrap().contains("msg"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_action_yields_an_error_envelope() {
    let registry = ActionRegistry::new();
    let agent = test_agent();

    let envelope = registry.execute("NOPE", &agent, json!({})).await;
    assert_eq!(envelope["status"], "error");
    assert!(envelope["message"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn handler_faults_become_error_envelopes() {
    let mut registry = ActionRegistry::new();
    registry.register(BoomAction::new()).unwrap();
    let agent = test_agent();

    let envelope = registry.execute("BOOM", &agent, json!({})).await;
    assert_eq!(envelope, json!({ "status": "error", "message": "boom" }));
}

#[tokio::test]
async fn bare_payloads_are_wrapped_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ActionRegistry::new();
    registry.register(EchoAction::new(calls.clone())).unwrap();
    let agent = test_agent();

    // EchoAction returns a bare object without `status`.
    let envelope = registry.execute("ECHO", &agent, json!({ "msg": "hi" })).await;
    assert_eq!(envelope, json!({ "status": "success", "echo": "hi" }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rpc_failures_surface_as_error_envelopes_on_any_runtime() {
    // Current-thread runtime; the RPC client must not require a
    // multi-threaded executor to fail cleanly.
    let mut registry = ActionRegistry::new();
    register_all_actions(&mut registry);
    let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
    let agent = Agent::new(wallet, "http://127.0.0.1:1");

    let envelope = registry.execute("BALANCE_ACTION", &agent, json!({})).await;
    assert_eq!(envelope["status"], "error");
    assert!(envelope["message"].is_string());
}

#[tokio::test]
async fn non_positive_transfer_amounts_are_rejected_before_submission() {
    let mut registry = ActionRegistry::new();
    register_all_actions(&mut registry);
    let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
    let agent = Agent::new(wallet, "http://127.0.0.1:1");
    let destination = Keypair::new().pubkey().to_string();

    for amount in [json!(-1.0), json!(0.0)] {
        let envelope = registry
            .execute("TRANSFER", &agent, json!({ "to": destination, "amount": amount }))
            .await;
        assert_eq!(envelope["status"], "error");
        assert!(envelope["message"].as_str().unwrap().contains("amount"));
    }
}

#[test]
fn bundled_action_examples_match_their_schemas() {
    let mut registry = ActionRegistry::new();
    register_all_actions(&mut registry);
    assert!(!registry.metadata().is_empty());

    for meta in registry.metadata() {
        let shape = schema::translate(&meta.input_schema)
            .unwrap_or_else(|e| panic!("schema for {} does not translate: {e}", meta.name));
        for group in &meta.examples {
            for example in group {
                shape.validate(&example.input).unwrap_or_else(|e| {
                    panic!("example input for {} fails its own schema: {e}", meta.name)
                });
            }
        }
    }
}

#[test]
fn bundled_action_names_are_unique_and_stable() {
    let mut registry = ActionRegistry::new();
    register_all_actions(&mut registry);

    let names: Vec<String> = registry.metadata().into_iter().map(|m| m.name).collect();
    let mut deduped = names.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), names.len(), "duplicate action names: {names:?}");

    // Wallet actions register first; market data follows.
    assert_eq!(names[0], "GET_WALLET_ADDRESS");
    for expected in [
        "BALANCE_ACTION",
        "TRANSFER",
        "DEFILLAMA_FETCH_PRICE",
        "DEFILLAMA_GET_PROTOCOL_TVL",
        "GET_COINGECKO_TOKEN_PRICE_DATA",
        "GET_COINGECKO_TRENDING_TOKENS",
        "GET_COINGECKO_TOP_GAINERS",
        "GET_COINGECKO_LATEST_POOLS",
        "GET_COINGECKO_TRENDING_POOLS",
        "GET_TOKEN_DATA_BY_TICKER",
        "ELFA_PING",
        "ELFA_API_KEY_STATUS",
        "ELFA_GET_SMART_MENTIONS",
        "ELFA_GET_TOP_MENTIONS_BY_TICKER",
        "ELFA_SEARCH_MENTIONS_BY_KEYWORDS",
        "ELFA_SMART_TWITTER_ACCOUNT_STATS",
        "ELFA_TRENDING_TOKENS",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
}
