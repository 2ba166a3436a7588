use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::errors::ActionError;
use crate::schema;

/// One illustrative input/output pair. Never executed, only displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionExample {
    pub input: Value,
    pub output: Value,
    pub explanation: String,
}

/// Static description of an action: identity, trigger phrases, example
/// groups, and the JSON input schema the executor validates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub name: String,
    pub similes: Vec<String>,
    pub description: String,
    pub examples: Vec<Vec<ActionExample>>,
    pub input_schema: Value,
}

#[async_trait]
pub trait Action: Send + Sync {
    fn metadata(&self) -> &ActionMetadata;

    /// Business logic. Inputs have already passed schema validation when the
    /// call comes through [`ActionRegistry::execute`].
    async fn call(&self, agent: &Agent, input: Value) -> anyhow::Result<Value>;
}

/// Build a `{"status": "error", "message": ...}` envelope.
pub fn error_envelope(message: impl Into<String>) -> Value {
    let mut out = Map::new();
    out.insert("status".to_string(), Value::String("error".to_string()));
    out.insert("message".to_string(), Value::String(message.into()));
    Value::Object(out)
}

/// Wrap a handler payload as a success envelope. Object payloads keep their
/// fields at the top level; anything else lands under `result`.
pub fn success_envelope(payload: Value) -> Value {
    let mut out = match payload {
        Value::Object(fields) => fields,
        other => {
            let mut fields = Map::new();
            fields.insert("result".to_string(), other);
            fields
        }
    };
    out.insert("status".to_string(), Value::String("success".to_string()));
    Value::Object(out)
}

/// Handlers that already speak the envelope convention pass through
/// unchanged; everything else is wrapped exactly once.
fn normalize_envelope(payload: Value) -> Value {
    let already_enveloped = payload
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| status == "success" || status == "error");
    if already_enveloped {
        payload
    } else {
        success_envelope(payload)
    }
}

/// Append-only mapping from action name to implementation. Built once at
/// startup and shared read-only afterwards.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
    order: Vec<String>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register an action. Fails on an empty or duplicate name, or on a
    /// schema the translator cannot express for protocol adapters.
    pub fn register<A>(&mut self, action: A) -> Result<(), ActionError>
    where
        A: Action + 'static,
    {
        let action = Arc::new(action) as Arc<dyn Action>;
        let meta = action.metadata();
        if meta.name.is_empty() {
            return Err(ActionError::EmptyActionName);
        }
        if self.actions.contains_key(&meta.name) {
            return Err(ActionError::DuplicateAction(meta.name.clone()));
        }
        // Catch untranslatable schemas at registration instead of at the
        // first tools/list or execute call.
        schema::translate(&meta.input_schema).map_err(|source| ActionError::Schema {
            name: meta.name.clone(),
            source,
        })?;

        let name = meta.name.clone();
        self.order.push(name.clone());
        self.actions.insert(name, action);
        Ok(())
    }

    /// Registration helper for the bundled action sets: a rejected action is
    /// logged and skipped rather than aborting the whole registry build.
    pub fn register_or_warn<A>(&mut self, action: A)
    where
        A: Action + 'static,
    {
        if let Err(error) = self.register(action) {
            warn!(%error, "skipping action registration");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// All actions in registration order.
    pub fn list(&self) -> Vec<Arc<dyn Action>> {
        self.order
            .iter()
            .filter_map(|name| self.actions.get(name).cloned())
            .collect()
    }

    /// Metadata for all registered actions, in registration order (useful
    /// for AI tool schemas).
    pub fn metadata(&self) -> Vec<ActionMetadata> {
        self.list().iter().map(|a| a.metadata().clone()).collect()
    }

    /// Execute an action by name with the given JSON input.
    ///
    /// Always returns a result envelope; lookup misses, validation failures,
    /// and handler errors are all converted at this boundary and never
    /// propagate to the caller as faults.
    pub async fn execute(&self, name: &str, agent: &Agent, input: Value) -> Value {
        let Some(action) = self.get(name) else {
            return error_envelope(format!("unknown action: {name}"));
        };

        let shape = match schema::translate(&action.metadata().input_schema) {
            Ok(shape) => shape,
            // Unreachable for actions admitted by `register`, but dispatch
            // must not trust that every registry was built through it.
            Err(error) => {
                return error_envelope(format!("schema for `{name}` cannot be translated: {error}"))
            }
        };
        if let Err(error) = shape.validate(&input) {
            debug!(action = name, %error, "input rejected");
            return error_envelope(error.to_string());
        }

        debug!(action = name, "executing action");
        match action.call(agent, input).await {
            Ok(payload) => normalize_envelope(payload),
            Err(error) => error_envelope(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubAction {
        meta: ActionMetadata,
    }

    impl StubAction {
        fn named(name: &str) -> Self {
            Self {
                meta: ActionMetadata {
                    name: name.to_string(),
                    similes: vec![],
                    description: format!("stub action {name}"),
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
    impl Action for StubAction {
        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }

        async fn call(&self, _agent: &Agent, _input: Value) -> anyhow::Result<Value> {
            Ok(json!({ "status": "success" }))
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ActionRegistry::new();
        registry.register(StubAction::named("PING")).unwrap();
        let err = registry.register(StubAction::named("PING")).unwrap_err();
        assert!(matches!(err, ActionError::DuplicateAction(name) if name == "PING"));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut registry = ActionRegistry::new();
        let err = registry.register(StubAction::named("")).unwrap_err();
        assert!(matches!(err, ActionError::EmptyActionName));
    }

    #[test]
    fn untranslatable_schema_is_rejected_at_registration() {
        let mut action = StubAction::named("BAD_SCHEMA");
        action.meta.input_schema = json!({
            "type": "object",
            "properties": { "x": { "type": "tuple" } },
        });
        let mut registry = ActionRegistry::new();
        let err = registry.register(action).unwrap_err();
        assert!(matches!(err, ActionError::Schema { name, .. } if name == "BAD_SCHEMA"));
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = ActionRegistry::new();
        for name in ["C_ACTION", "A_ACTION", "B_ACTION"] {
            registry.register(StubAction::named(name)).unwrap();
        }
        let names: Vec<String> = registry
            .metadata()
            .into_iter()
            .map(|meta| meta.name)
            .collect();
        assert_eq!(names, vec!["C_ACTION", "A_ACTION", "B_ACTION"]);
    }

    #[test]
    fn get_returns_the_registered_instance() {
        let mut registry = ActionRegistry::new();
        registry.register(StubAction::named("PING")).unwrap();
        let first = registry.get("PING").unwrap();
        let second = registry.get("PING").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &registry.list()[0]));
    }

    #[test]
    fn envelopes_are_not_double_wrapped() {
        let enveloped = json!({ "status": "success", "pong": true });
        assert_eq!(normalize_envelope(enveloped.clone()), enveloped);

        let error = json!({ "status": "error", "message": "boom" });
        assert_eq!(normalize_envelope(error.clone()), error);

        let bare = json!({ "pong": true });
        let wrapped = normalize_envelope(bare);
        assert_eq!(wrapped["status"], "success");
        assert_eq!(wrapped["pong"], true);

        let scalar = normalize_envelope(json!(42));
        assert_eq!(scalar["status"], "success");
        assert_eq!(scalar["result"], 42);
    }
}
