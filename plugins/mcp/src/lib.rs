//! MCP server adapter: exposes an [`ActionRegistry`] as Model Context
//! Protocol tools (plus per-action example prompts) over a line-delimited
//! JSON-RPC 2.0 stdio transport.
//!
//! The tool catalog is materialized once at construction by walking the
//! registry through the schema translator; dispatch then funnels every
//! `tools/call` through `ActionRegistry::execute`, so a handler fault is
//! always an error content block, never a transport failure.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{info, warn};

use solana_agent_core::{schema, ActionExample, ActionRegistry, Agent};

mod jsonrpc;

pub use jsonrpc::{err, ok, write_frame, JsonRpcError, JsonRpcResponse};

pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Oversized frames are treated as a broken client, not parsed.
const MAX_LINE_BYTES: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct McpServerOptions {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

struct McpTool {
    name: String,
    description: String,
    input_schema: Value,
}

struct McpPrompt {
    name: String,
    action: String,
    examples: Vec<ActionExample>,
}

pub struct McpServer {
    agent: Arc<Agent>,
    registry: Arc<ActionRegistry>,
    options: McpServerOptions,
    tools: Vec<McpTool>,
    prompts: Vec<McpPrompt>,
    registered_actions: Vec<String>,
}

impl McpServer {
    /// Build the tool and prompt catalog from the registry. An action whose
    /// schema fails translation is skipped with a warning, matching the
    /// registry's own registration policy.
    pub fn new(registry: Arc<ActionRegistry>, agent: Arc<Agent>, options: McpServerOptions) -> Self {
        let mut tools = Vec::new();
        let mut prompts = Vec::new();
        let mut registered_actions = Vec::new();

        for meta in registry.metadata() {
            let shape = match schema::translate(&meta.input_schema) {
                Ok(shape) => shape,
                Err(error) => {
                    warn!(action = %meta.name, %error, "skipping action with untranslatable schema");
                    continue;
                }
            };

            tools.push(McpTool {
                name: meta.name.clone(),
                description: meta.description.clone(),
                input_schema: shape.to_input_schema(),
            });

            let examples: Vec<ActionExample> = meta.examples.iter().flatten().cloned().collect();
            if !examples.is_empty() {
                prompts.push(McpPrompt {
                    name: format!("{}-examples", meta.name),
                    action: meta.name.clone(),
                    examples,
                });
            }

            registered_actions.push(meta.name);
        }

        Self {
            agent,
            registry,
            options,
            tools,
            prompts,
            registered_actions,
        }
    }

    /// Names of the actions exposed as tools, in registration order. Kept
    /// for introspection; dispatch does not consult it.
    pub fn registered_actions(&self) -> &[String] {
        &self.registered_actions
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": { "name": self.options.name, "version": self.options.version },
            "capabilities": { "tools": {}, "prompts": {} },
        })
    }

    pub fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    pub fn list_prompts(&self) -> Value {
        let prompts: Vec<Value> = self
            .prompts
            .iter()
            .map(|prompt| {
                json!({
                    "name": prompt.name,
                    "description": format!("Example inputs and outputs for the {} action", prompt.action),
                    "arguments": [
                        {
                            "name": "showIndex",
                            "description": "Example index to show (number)",
                            "required": false,
                        }
                    ],
                })
            })
            .collect();
        json!({ "prompts": prompts })
    }

    /// Invoke a tool and wrap the result envelope as a text content block.
    /// `isError` mirrors the envelope status.
    pub async fn call_tool(&self, name: &str, args: Value) -> Value {
        if !self.tools.iter().any(|tool| tool.name == name) {
            return json!({
                "content": [{ "type": "text", "text": format!("unknown tool: {name}") }],
                "isError": true,
            });
        }

        let envelope = self.registry.execute(name, &self.agent, args).await;
        let is_error = envelope.get("status").and_then(Value::as_str) == Some("error");
        let text = pretty(&envelope);
        json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        })
    }

    /// Render a `<action>-examples` prompt. With a `showIndex` argument only
    /// the matching example is returned; otherwise all of them.
    pub fn get_prompt(&self, name: &str, args: &Value) -> Result<Value, String> {
        let prompt = self
            .prompts
            .iter()
            .find(|prompt| prompt.name == name)
            .ok_or_else(|| format!("unknown prompt: {name}"))?;

        let selected: Vec<&ActionExample> = match args.get("showIndex").and_then(Value::as_str) {
            Some(raw) => {
                let index: usize = raw
                    .parse()
                    .map_err(|_| format!("showIndex must be a number, got `{raw}`"))?;
                let example = prompt
                    .examples
                    .get(index)
                    .ok_or_else(|| format!("example index {index} out of range"))?;
                vec![example]
            }
            None => prompt.examples.iter().collect(),
        };

        let mut text = format!("Examples for {}:\n", prompt.action);
        for (idx, example) in selected.iter().enumerate() {
            text.push_str(&format!(
                "\nExample {}:\nInput: {}\nOutput: {}\nExplanation: {}\n",
                idx + 1,
                pretty(&example.input),
                pretty(&example.output),
                example.explanation,
            ));
        }

        Ok(json!({
            "description": format!("Examples for {}", prompt.action),
            "messages": [
                {
                    "role": "user",
                    "content": { "type": "text", "text": text },
                }
            ],
        }))
    }

    pub async fn handle_request(&self, method: &str, id: Value, params: Value) -> JsonRpcResponse {
        match method {
            "initialize" => ok(id, self.initialize_result()),
            "ping" => ok(id, json!({})),
            "tools/list" => ok(id, self.list_tools()),
            "tools/call" => {
                let name = params.get("name").and_then(Value::as_str).unwrap_or("");
                let args = params.get("arguments").cloned().unwrap_or(json!({}));
                ok(id, self.call_tool(name, args).await)
            }
            "prompts/list" => ok(id, self.list_prompts()),
            "prompts/get" => {
                let name = params.get("name").and_then(Value::as_str).unwrap_or("");
                let args = params.get("arguments").cloned().unwrap_or(json!({}));
                match self.get_prompt(name, &args) {
                    Ok(result) => ok(id, result),
                    Err(message) => err(id, -32602, message),
                }
            }
            _ => err(id, -32601, "method not found"),
        }
    }

    /// Serve MCP requests over stdin/stdout until EOF. Transport failures
    /// abort the loop and surface to the caller.
    pub async fn serve_stdio(&self) -> anyhow::Result<()> {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = stdin.next_line().await? {
            if line.len() > MAX_LINE_BYTES {
                warn!(bytes = line.len(), "oversized frame, closing connection");
                break;
            }

            let frame: Value = match serde_json::from_str(&line) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(%error, "invalid json on stdin");
                    continue;
                }
            };

            // Notifications (no "id") are acknowledged by silence.
            if frame.get("id").is_none() {
                continue;
            }

            let req: JsonRpcRequest = match serde_json::from_value(frame) {
                Ok(req) => req,
                Err(error) => {
                    warn!(%error, "failed to parse jsonrpc request");
                    continue;
                }
            };

            let resp = if req.jsonrpc == "2.0" {
                self.handle_request(&req.method, req.id, req.params).await
            } else {
                err(req.id, -32600, "invalid jsonrpc version")
            };

            write_frame(&mut stdout, &resp).await?;
        }

        Ok(())
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Build the server and run it on stdio. Startup failure here is fatal and
/// reported to the operator.
pub async fn start_mcp_server(
    registry: Arc<ActionRegistry>,
    agent: Arc<Agent>,
    options: McpServerOptions,
) -> anyhow::Result<()> {
    info!(name = %options.name, version = %options.version, "MCP server starting");
    let server = McpServer::new(registry, agent, options);
    info!(tools = server.registered_actions().len(), "MCP server ready");
    server.serve_stdio().await
}
