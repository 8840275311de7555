//! Builds sweep trees from already-parsed JSON/YAML values.

use runm_core::errors::{ErrorInfo, RunmError};
use serde_json::{Map, Value};

use crate::node::{NumericSequence, SweepNode};

fn parse_error(code: &str, message: impl Into<String>) -> RunmError {
    RunmError::Config(ErrorInfo::new(code, message))
}

/// Renders a scalar JSON value to the text used in assignments.
///
/// Numbers keep their written digits when `serde_json` preserves precision.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Builds a node from a `{"type": ...}` object.
pub fn node_from_value(value: &Value) -> Result<SweepNode, RunmError> {
    let Value::Object(object) = value else {
        return Err(parse_error("sweep_not_object", "sweep node must be an object"));
    };
    let kind = match object.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(_) => return Err(parse_error("sweep_type", "sweep node type must be a string")),
        None => return Err(parse_error("sweep_type", "sweep node is missing its type")),
    };
    match kind {
        "sequence" => {
            let parameter = string_field(object, kind, "parameter")?;
            let from = numeric_field(object, kind, "from")?;
            let to = numeric_field(object, kind, "to")?;
            let by = numeric_field(object, kind, "by")?;
            NumericSequence::parse(parameter, &from, &to, &by).map(SweepNode::NumericSequence)
        }
        "list" => {
            let parameter = string_field(object, kind, "parameter")?;
            let Some(Value::Array(raw)) = object.get("values") else {
                return Err(field_error(kind, "values", "expected an array"));
            };
            let values = raw
                .iter()
                .map(|value| {
                    scalar_text(value).ok_or_else(|| {
                        RunmError::Config(
                            field_info(kind, "values", "list values must be scalars")
                                .with_parameter(parameter.as_str()),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SweepNode::list(parameter, values))
        }
        "parallel" => Ok(SweepNode::parallel(children_field(object, kind)?)),
        "combination" => Ok(SweepNode::combination(children_field(object, kind)?)),
        other => Err(RunmError::Config(
            ErrorInfo::new("sweep_type", "unknown sweep node type")
                .with_context("type", other)
                .with_hint("expected one of sequence, list, parallel, combination"),
        )),
    }
}

/// Builds the implicit top-level combination over a list of sweeps.
pub fn sweeps_from_values(values: &[Value]) -> Result<SweepNode, RunmError> {
    let children = values
        .iter()
        .map(node_from_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SweepNode::combination(children))
}

fn children_field(object: &Map<String, Value>, kind: &str) -> Result<Vec<SweepNode>, RunmError> {
    match object.get("sweeps") {
        Some(Value::Array(children)) => children.iter().map(node_from_value).collect(),
        _ => Err(field_error(kind, "sweeps", "expected an array of sweep nodes")),
    }
}

fn string_field(object: &Map<String, Value>, kind: &str, field: &str) -> Result<String, RunmError> {
    match object.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        _ => Err(field_error(kind, field, "expected a string")),
    }
}

fn numeric_field(
    object: &Map<String, Value>,
    kind: &str,
    field: &str,
) -> Result<String, RunmError> {
    match object.get(field) {
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::String(text)) => Ok(text.clone()),
        _ => Err(field_error(kind, field, "expected a number")),
    }
}

fn field_error(kind: &str, field: &str, message: &str) -> RunmError {
    RunmError::Config(field_info(kind, field, message))
}

fn field_info(kind: &str, field: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new("sweep_field", message)
        .with_context("type", kind)
        .with_context("field", field)
}
