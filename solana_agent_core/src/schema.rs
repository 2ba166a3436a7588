//! Schema translation for action inputs.
//!
//! Actions author their input schema as a JSON-schema-style `serde_json::Value`
//! (see the `json!` blocks in the action modules). Protocol adapters and the
//! executor never walk that value directly; it is translated once into a
//! [`SchemaShape`] over a closed set of field kinds. Anything outside that set
//! fails the translation with the offending field path instead of silently
//! degrading the protocol-facing contract.

use serde_json::{Map, Value};

use crate::errors::{SchemaError, ValidationError};

/// Recursion bound for nested object/array schemas. JSON values cannot alias,
/// so a depth check is the realizable form of cycle detection.
const MAX_DEPTH: usize = 8;

/// Supported field kinds. Exhaustive by construction; the translator is the
/// only place new kinds can enter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldType>),
    Object(SchemaShape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub ty: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
}

/// Protocol-neutral description of an action's input object.
///
/// Field order is deterministic (source property order as serialized by
/// `serde_json`), and translating the same schema twice yields equal shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaShape {
    pub fields: Vec<(String, FieldShape)>,
    pub additional_properties: bool,
}

/// Translate an action's JSON input schema into a [`SchemaShape`].
pub fn translate(schema: &Value) -> Result<SchemaShape, SchemaError> {
    translate_object(schema, "$", 0)
}

fn translate_object(node: &Value, path: &str, depth: usize) -> Result<SchemaShape, SchemaError> {
    if depth > MAX_DEPTH {
        return Err(SchemaError::DepthExceeded {
            path: path.to_string(),
        });
    }

    let Some(obj) = node.as_object() else {
        return Err(if depth == 0 {
            SchemaError::NonObjectRoot
        } else {
            SchemaError::MalformedNode {
                path: path.to_string(),
            }
        });
    };

    if depth == 0 && obj.get("type").and_then(Value::as_str) != Some("object") {
        return Err(SchemaError::NonObjectRoot);
    }

    let required: Vec<&str> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let additional_properties = match obj.get("additionalProperties") {
        None => true,
        Some(Value::Bool(allow)) => *allow,
        Some(_) => {
            return Err(SchemaError::MalformedNode {
                path: format!("{path}.additionalProperties"),
            })
        }
    };

    let mut fields = Vec::new();
    if let Some(props) = obj.get("properties") {
        let Some(props) = props.as_object() else {
            return Err(SchemaError::MalformedNode {
                path: format!("{path}.properties"),
            });
        };
        for (name, node) in props {
            let field_path = format!("{path}.{name}");
            let field = translate_field(node, &field_path, required.contains(&name.as_str()), depth)?;
            fields.push((name.clone(), field));
        }
    }

    Ok(SchemaShape {
        fields,
        additional_properties,
    })
}

fn translate_field(
    node: &Value,
    path: &str,
    required: bool,
    depth: usize,
) -> Result<FieldShape, SchemaError> {
    if depth > MAX_DEPTH {
        return Err(SchemaError::DepthExceeded {
            path: path.to_string(),
        });
    }

    let Some(obj) = node.as_object() else {
        return Err(SchemaError::MalformedNode {
            path: path.to_string(),
        });
    };

    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let (ty_name, nullable) = field_type_name(obj, path)?;
    let ty = match ty_name.as_str() {
        "string" => FieldType::String,
        "number" => FieldType::Number,
        "integer" => FieldType::Integer,
        "boolean" => FieldType::Boolean,
        "array" => {
            let items = obj.get("items").ok_or_else(|| SchemaError::MissingItems {
                path: path.to_string(),
            })?;
            let item_path = format!("{path}[]");
            let item = translate_field(items, &item_path, true, depth + 1)?;
            FieldType::Array(Box::new(item.ty))
        }
        "object" => FieldType::Object(translate_object(node, path, depth + 1)?),
        other => {
            return Err(SchemaError::UnsupportedType {
                path: path.to_string(),
                ty: other.to_string(),
            })
        }
    };

    Ok(FieldShape {
        ty,
        required,
        nullable,
        description,
    })
}

/// Resolve a field's `type` keyword. A `["T", "null"]` union marks the field
/// nullable; any other union is outside the supported set.
fn field_type_name(obj: &Map<String, Value>, path: &str) -> Result<(String, bool), SchemaError> {
    match obj.get("type") {
        Some(Value::String(name)) => Ok((name.clone(), false)),
        Some(Value::Array(entries)) => {
            let names: Vec<&str> = entries.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let concrete: Vec<&str> = names.iter().copied().filter(|n| *n != "null").collect();
            match concrete.as_slice() {
                [single] => Ok(((*single).to_string(), nullable)),
                _ => Err(SchemaError::UnsupportedType {
                    path: path.to_string(),
                    ty: names.join("|"),
                }),
            }
        }
        _ => Err(SchemaError::UnsupportedType {
            path: path.to_string(),
            ty: "(missing)".to_string(),
        }),
    }
}

impl SchemaShape {
    /// Validate an untyped input object against the shape. All failing fields
    /// are collected so the caller sees every problem at once.
    pub fn validate(&self, input: &Value) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.check(input, "", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    fn check(&self, input: &Value, prefix: &str, issues: &mut Vec<String>) {
        let Some(obj) = input.as_object() else {
            if prefix.is_empty() {
                issues.push("input must be a JSON object".to_string());
            } else {
                issues.push(format!("field `{prefix}`: expected object, got {}", json_kind(input)));
            }
            return;
        };

        for (name, field) in &self.fields {
            let label = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match obj.get(name) {
                None => {
                    if field.required {
                        issues.push(format!("missing required field `{label}`"));
                    }
                }
                Some(Value::Null) => {
                    if !field.nullable {
                        issues.push(format!("field `{label}` must not be null"));
                    }
                }
                Some(value) => check_type(&field.ty, value, &label, issues),
            }
        }

        if !self.additional_properties {
            for key in obj.keys() {
                if !self.fields.iter().any(|(name, _)| name == key) {
                    let label = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    issues.push(format!("unexpected field `{label}`"));
                }
            }
        }
    }

    /// Re-serialize the shape as a canonical JSON schema for protocol
    /// adapters (the MCP `inputSchema`, the toolbox tool metadata).
    pub fn to_input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, field) in &self.fields {
            properties.insert(name.clone(), field_to_value(field));
            if field.required {
                required.push(Value::String(name.clone()));
            }
        }

        let mut out = Map::new();
        out.insert("type".to_string(), Value::String("object".to_string()));
        out.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            out.insert("required".to_string(), Value::Array(required));
        }
        out.insert(
            "additionalProperties".to_string(),
            Value::Bool(self.additional_properties),
        );
        Value::Object(out)
    }
}

fn check_type(ty: &FieldType, value: &Value, label: &str, issues: &mut Vec<String>) {
    match ty {
        FieldType::String => {
            if !value.is_string() {
                issues.push(format!("field `{label}`: expected string, got {}", json_kind(value)));
            }
        }
        FieldType::Number => {
            if !value.is_number() {
                issues.push(format!("field `{label}`: expected number, got {}", json_kind(value)));
            }
        }
        FieldType::Integer => {
            if !value.is_i64() && !value.is_u64() {
                issues.push(format!("field `{label}`: expected integer, got {}", json_kind(value)));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                issues.push(format!("field `{label}`: expected boolean, got {}", json_kind(value)));
            }
        }
        FieldType::Array(item_ty) => match value.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    check_type(item_ty, item, &format!("{label}[{idx}]"), issues);
                }
            }
            None => {
                issues.push(format!("field `{label}`: expected array, got {}", json_kind(value)));
            }
        },
        FieldType::Object(shape) => shape.check(value, label, issues),
    }
}

fn field_to_value(field: &FieldShape) -> Value {
    let mut node = match &field.ty {
        FieldType::String => simple_node("string"),
        FieldType::Number => simple_node("number"),
        FieldType::Integer => simple_node("integer"),
        FieldType::Boolean => simple_node("boolean"),
        FieldType::Array(item_ty) => {
            let mut node = simple_node("array");
            let item = FieldShape {
                ty: (**item_ty).clone(),
                required: true,
                nullable: false,
                description: None,
            };
            node.insert("items".to_string(), field_to_value(&item));
            node
        }
        FieldType::Object(shape) => match shape.to_input_schema() {
            Value::Object(node) => node,
            _ => unreachable!("to_input_schema always yields an object"),
        },
    };

    if field.nullable {
        if let Some(Value::String(base)) = node.get("type").cloned() {
            node.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(base), Value::String("null".to_string())]),
            );
        }
    }
    if let Some(desc) = &field.description {
        node.insert("description".to_string(), Value::String(desc.clone()));
    }
    Value::Object(node)
}

fn simple_node(ty: &str) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("type".to_string(), Value::String(ty.to_string()));
    node
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
