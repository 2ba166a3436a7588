use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use solana_sdk::signature::Keypair;

use solana_agent_core::{
    Action, ActionExample, ActionMetadata, ActionRegistry, Agent, KeypairWallet,
};
use solana_agent_mcp::{McpServer, McpServerOptions, PROTOCOL_VERSION};

fn test_agent() -> Arc<Agent> {
    let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
    Arc::new(Agent::new(wallet, "http://localhost:8899"))
}

struct PingAction {
    metadata: ActionMetadata,
}

impl PingAction {
    fn new() -> Self {
        Self {
            metadata: ActionMetadata {
                name: "PING".to_string(),
                similes: vec!["heartbeat".to_string()],
                description: "Check that the agent is responsive".to_string(),
                examples: vec![vec![
                    ActionExample {
                        input: json!({}),
                        output: json!({ "status": "success", "pong": true }),
                        explanation: "A healthy agent answers with pong".to_string(),
                    },
                    ActionExample {
                        input: json!({}),
                        output: json!({ "status": "success", "pong": true }),
                        explanation: "Repeated pings are idempotent".to_string(),
                    },
                ]],
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": [],
                }),
            },
        }
    }
}

#[async_trait]
impl Action for PingAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn call(&self, _agent: &Agent, _input: Value) -> anyhow::Result<Value> {
        Ok(json!({ "pong": true }))
    }
}

struct BoomAction {
    metadata: ActionMetadata,
}

impl BoomAction {
    fn new() -> Self {
        Self {
            metadata: ActionMetadata {
                name: "BOOM".to_string(),
                similes: vec![],
                description: "Always fails".to_string(),
                examples: vec![],
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": [],
                }),
            },
        }
    }
}

#[async_trait]
impl Action for BoomAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn call(&self, _agent: &Agent, _input: Value) -> anyhow::Result<Value> {
        anyhow::bail!("boom")
    }
}

fn test_server() -> McpServer {
    let mut registry = ActionRegistry::new();
    registry.register(PingAction::new()).unwrap();
    registry.register(BoomAction::new()).unwrap();
    McpServer::new(
        Arc::new(registry),
        test_agent(),
        McpServerOptions {
            name: "test-agent".to_string(),
            version: "0.0.1".to_string(),
        },
    )
}

#[tokio::test]
async fn initialize_reports_protocol_and_capabilities() {
    let server = test_server();
    let resp = server.handle_request("initialize", json!(1), json!({})).await;
    let result = resp.result.expect("initialize should succeed");
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], "test-agent");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["prompts"].is_object());
}

#[tokio::test]
async fn every_action_becomes_a_tool_and_examples_become_prompts() {
    let server = test_server();

    let tools = server.list_tools();
    let tools = tools["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "PING");
    assert_eq!(tools[1]["name"], "BOOM");
    assert_eq!(tools[0]["inputSchema"]["type"], "object");

    // Only PING carries examples, so only PING gets a prompt.
    let prompts = server.list_prompts();
    let prompts = prompts["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0]["name"], "PING-examples");

    assert_eq!(server.registered_actions(), &["PING", "BOOM"]);
}

#[tokio::test]
async fn calling_a_tool_returns_the_envelope_as_text() {
    let server = test_server();
    let result = server.call_tool("PING", json!({})).await;
    assert_eq!(result["isError"], false);

    let text = result["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["pong"], true);
}

#[tokio::test]
async fn handler_failures_are_flagged_not_raised() {
    let server = test_server();
    let result = server.call_tool("BOOM", json!({})).await;
    assert_eq!(result["isError"], true);

    let text = result["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["message"], "boom");
}

#[tokio::test]
async fn unknown_tools_are_reported_in_band() {
    let server = test_server();
    let result = server.call_tool("NOPE", json!({})).await;
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("unknown tool"));
}

#[tokio::test]
async fn prompts_render_all_examples_by_default() {
    let server = test_server();
    let result = server.get_prompt("PING-examples", &json!({})).unwrap();
    let text = result["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.starts_with("Examples for PING:"));
    assert!(text.contains("Example 1:"));
    assert!(text.contains("Example 2:"));
    assert!(text.contains("Repeated pings are idempotent"));
}

#[tokio::test]
async fn show_index_selects_a_single_example() {
    let server = test_server();
    let result = server
        .get_prompt("PING-examples", &json!({ "showIndex": "0" }))
        .unwrap();
    let text = result["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("Example 1:"));
    assert!(!text.contains("Example 2:"));
    assert!(text.contains("A healthy agent answers with pong"));
}

#[tokio::test]
async fn show_index_out_of_range_is_an_error() {
    let server = test_server();
    let err = server
        .get_prompt("PING-examples", &json!({ "showIndex": "7" }))
        .unwrap_err();
    assert!(err.contains("out of range"));

    let err = server
        .get_prompt("PING-examples", &json!({ "showIndex": "seven" }))
        .unwrap_err();
    assert!(err.contains("must be a number"));
}

#[tokio::test]
async fn unknown_methods_get_a_jsonrpc_error() {
    let server = test_server();
    let resp = server
        .handle_request("resources/list", json!(9), json!({}))
        .await;
    let error = resp.error.expect("unknown method should error");
    assert_eq!(error.code, -32601);
}
