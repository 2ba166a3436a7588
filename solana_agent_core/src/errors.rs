use thiserror::Error;

/// Errors raised while translating an action's input schema into a
/// protocol-neutral shape. These surface at registration time, not dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema root must be an object with `type: \"object\"`")]
    NonObjectRoot,

    #[error("schema node at `{path}` is not an object")]
    MalformedNode { path: String },

    #[error("unsupported schema type `{ty}` at `{path}`")]
    UnsupportedType { path: String, ty: String },

    #[error("array schema at `{path}` is missing `items`")]
    MissingItems { path: String },

    #[error("schema nesting at `{path}` exceeds the supported depth")]
    DepthExceeded { path: String },
}

/// Input rejected by schema validation. Collects every failing field so the
/// caller sees the full set of problems in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl ValidationError {
    pub fn new(issues: Vec<String>) -> Self {
        Self { issues }
    }
}

/// Registry-level failures.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("action `{0}` is already registered")]
    DuplicateAction(String),

    #[error("action name must not be empty")]
    EmptyActionName,

    #[error("schema for action `{name}` cannot be translated: {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
