//! Type coercion ladder applied before a property write
//!
//! Order: bool <-> int (0/1), string -> enum by case-insensitive variant name,
//! then a generic conversion for everything else.

use super::{Value, ValueKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert {from} value to {to}: {reason}")]
pub struct CoercionError {
    pub from: &'static str,
    pub to: String,
    pub reason: String,
}

impl CoercionError {
    fn new(value: &Value, target: &ValueKind, reason: impl Into<String>) -> Self {
        Self {
            from: value.kind_name(),
            to: format!("{:?}", target),
            reason: reason.into(),
        }
    }
}

/// Convert `value` to the declared `target` type
pub fn coerce(value: Value, target: &ValueKind) -> Result<Value, CoercionError> {
    match (target, value) {
        (ValueKind::Any, v) => Ok(v),
        (_, Value::Null) => Err(CoercionError::new(&Value::Null, target, "null is not assignable")),

        // bool <-> int
        (ValueKind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ValueKind::Bool, Value::Int(i)) => Ok(Value::Bool(i != 0)),
        (ValueKind::Int, Value::Bool(b)) => Ok(Value::Int(if b { 1 } else { 0 })),

        // string -> enum
        (ValueKind::Enum(variants), Value::Str(s)) | (ValueKind::Enum(variants), Value::Enum(s)) => {
            let needle = s.trim();
            variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(needle))
                .map(|v| Value::Enum(v.clone()))
                .ok_or_else(|| {
                    CoercionError::new(&Value::Str(s.clone()), target, format!("no variant named '{}'", needle))
                })
        }

        (target, value) => generic(value, target),
    }
}

fn generic(value: Value, target: &ValueKind) -> Result<Value, CoercionError> {
    let fail = |v: &Value, reason: &str| Err(CoercionError::new(v, target, reason));

    match target {
        ValueKind::Bool => match &value {
            Value::Float(f) => Ok(Value::Bool(*f != 0.0)),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => fail(&value, "not a boolean literal"),
            },
            _ => fail(&value, "unsupported conversion"),
        },
        ValueKind::Int => match &value {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(Value::Int(f.round() as i64)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| fail(&value, "not an integer literal")),
            _ => fail(&value, "unsupported conversion"),
        },
        ValueKind::Float => match &value {
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .or_else(|_| fail(&value, "not a numeric literal")),
            _ => fail(&value, "unsupported conversion"),
        },
        ValueKind::Str => match &value {
            Value::Str(s) | Value::Enum(s) => Ok(Value::Str(s.clone())),
            Value::Bool(b) => Ok(Value::Str(b.to_string())),
            Value::Int(i) => Ok(Value::Str(i.to_string())),
            Value::Float(f) => Ok(Value::Str(f.to_string())),
            _ => fail(&value, "unsupported conversion"),
        },
        ValueKind::StrList => match value {
            Value::Str(s) => Ok(Value::List(vec![Value::Str(s)])),
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(generic(item, &ValueKind::Str)?);
                }
                Ok(Value::List(out))
            }
            other => fail(&other, "unsupported conversion"),
        },
        ValueKind::Enum(variants) => match &value {
            Value::Int(i) => usize::try_from(*i)
                .ok()
                .and_then(|idx| variants.get(idx))
                .map(|v| Value::Enum(v.clone()))
                .ok_or_else(|| CoercionError::new(&value, target, "ordinal out of range")),
            _ => fail(&value, "unsupported conversion"),
        },
        ValueKind::Object => match value {
            Value::Object(o) => Ok(Value::Object(o)),
            other => fail(&other, "not an object"),
        },
        ValueKind::Any => Ok(value),
    }
}
