//! Tool-calling adapter: wraps each registered action as a standalone
//! [`AgentTool`] suitable for function-calling agent frameworks. A tool
//! carries the action's name, description, and translated input schema
//! verbatim, and its output is always the stringified result envelope so
//! framework code never has to handle a thrown error.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use solana_agent_core::{error_envelope, schema, ActionRegistry, Agent};

pub struct AgentTool {
    agent: Arc<Agent>,
    registry: Arc<ActionRegistry>,
    name: String,
    description: String,
    input_schema: Value,
}

impl AgentTool {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Canonical JSON schema for the tool's input, as re-serialized by the
    /// schema translator.
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Run the tool with structured input. The returned string is always a
    /// JSON result envelope, for success and failure alike.
    pub async fn call(&self, input: Value) -> String {
        let envelope = self.registry.execute(&self.name, &self.agent, input).await;
        envelope.to_string()
    }

    /// Run the tool with raw text input, the form most tool-calling
    /// frameworks hand over. Empty input means an empty object; text that
    /// is not valid JSON becomes an error envelope rather than a fault.
    pub async fn call_text(&self, input: &str) -> String {
        let trimmed = input.trim();
        let parsed: Value = if trimmed.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(trimmed) {
                Ok(value) => value,
                Err(error) => {
                    return error_envelope(format!("invalid JSON input: {error}")).to_string();
                }
            }
        };
        self.call(parsed).await
    }
}

/// Build one [`AgentTool`] per registered action, in registration order.
/// An action whose schema cannot be translated is skipped with a warning.
pub fn agent_tools(registry: Arc<ActionRegistry>, agent: Arc<Agent>) -> Vec<AgentTool> {
    let mut tools = Vec::new();
    for meta in registry.metadata() {
        let shape = match schema::translate(&meta.input_schema) {
            Ok(shape) => shape,
            Err(error) => {
                warn!(action = %meta.name, %error, "skipping action with untranslatable schema");
                continue;
            }
        };
        tools.push(AgentTool {
            agent: Arc::clone(&agent),
            registry: Arc::clone(&registry),
            name: meta.name,
            description: meta.description,
            input_schema: shape.to_input_schema(),
        });
    }
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::json;
    use solana_sdk::signature::Keypair;

    use solana_agent_core::{Action, ActionMetadata, KeypairWallet};

    struct EchoAction {
        metadata: ActionMetadata,
    }

    impl EchoAction {
        fn new() -> Self {
            Self {
                metadata: ActionMetadata {
                    name: "ECHO".to_string(),
                    similes: vec!["repeat".to_string()],
                    description: "Echo a message back".to_string(),
                    examples: vec![],
                    input_schema: json!({
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                        },
                        "required": ["message"],
                    }),
                },
            }
        }
    }

    #[async_trait]
    impl Action for EchoAction {
        fn metadata(&self) -> &ActionMetadata {
            &self.metadata
        }

        async fn call(&self, _agent: &Agent, input: Value) -> anyhow::Result<Value> {
            Ok(json!({ "echo": input["message"] }))
        }
    }

    fn test_tools() -> Vec<AgentTool> {
        let mut registry = ActionRegistry::new();
        registry.register(EchoAction::new()).unwrap();
        let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
        let agent = Arc::new(Agent::new(wallet, "http://localhost:8899"));
        agent_tools(Arc::new(registry), agent)
    }

    #[test]
    fn tools_carry_action_metadata_verbatim() {
        let tools = test_tools();
        assert_eq!(tools.len(), 1);
        let tool = &tools[0];
        assert_eq!(tool.name(), "ECHO");
        assert_eq!(tool.description(), "Echo a message back");
        assert_eq!(tool.input_schema()["type"], "object");
        assert_eq!(
            tool.input_schema()["properties"]["message"]["type"],
            "string"
        );
        assert_eq!(tool.input_schema()["required"], json!(["message"]));
    }

    #[tokio::test]
    async fn call_returns_a_stringified_envelope() {
        let tools = test_tools();
        let out = tools[0].call(json!({ "message": "hi" })).await;
        let envelope: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(envelope["status"], "success");
        assert_eq!(envelope["echo"], "hi");
    }

    #[tokio::test]
    async fn text_input_is_parsed_as_json() {
        let tools = test_tools();
        let out = tools[0].call_text(r#"{"message": "hello"}"#).await;
        let envelope: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(envelope["status"], "success");
        assert_eq!(envelope["echo"], "hello");
    }

    #[tokio::test]
    async fn empty_text_input_means_an_empty_object() {
        let tools = test_tools();
        let out = tools[0].call_text("  ").await;
        let envelope: Value = serde_json::from_str(&out).unwrap();
        // Validation rejects the missing field, but in-band.
        assert_eq!(envelope["status"], "error");
        assert!(envelope["message"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn malformed_text_input_becomes_an_error_envelope() {
        let tools = test_tools();
        let out = tools[0].call_text("{not json").await;
        let envelope: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(envelope["status"], "error");
        assert!(envelope["message"]
            .as_str()
            .unwrap()
            .contains("invalid JSON input"));
    }
}
