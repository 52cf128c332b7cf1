//! Engine object model
//!
//! The engine is reached only through these object-safe traits. A host bridge
//! implements them over whatever binding it has to the installed engine; the
//! adapter never assumes a particular member exists and discovers everything
//! through [`EngineObject::members`].

pub mod coerce;
pub mod dynamic;

pub use coerce::{coerce, CoercionError};
pub use dynamic::{DynModule, DynObject, DynRuntime, DynType};

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to an engine-side object instance
pub type ObjectRef = Arc<dyn EngineObject>;

/// Shared handle to a located engine type
pub type TypeRef = Arc<dyn EngineType>;

/// Shared handle to an engine module (assembly, shared library, namespace)
pub type ModuleRef = Arc<dyn EngineModule>;

/// A fault raised by the engine while a member was read, written or invoked
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineFault {
    pub message: String,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value crossing the engine boundary
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Canonical variant name of an engine enumeration
    Enum(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer or floating value as f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Enum(s) => write!(f, "Enum({s})"),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Object(o) => write!(f, "Object({})", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Value::Str).collect())
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

/// Declared type of a property, the target of coercion on write
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    StrList,
    /// Enumeration with its variant names
    Enum(Vec<String>),
    Object,
    Any,
}

/// Which kind of member a probe looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Property => write!(f, "property"),
            MemberKind::Method => write!(f, "method"),
        }
    }
}

/// Public instance member exposed by an engine object
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    /// Name exactly as the engine spells it
    pub name: String,
    pub kind: MemberKind,
    /// Declared type (properties) or return type (methods)
    pub ty: ValueKind,
    pub readable: bool,
    pub writable: bool,
}

impl MemberInfo {
    pub fn property(name: impl Into<String>, ty: ValueKind, readable: bool, writable: bool) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            ty,
            readable,
            writable,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            ty: ValueKind::Any,
            readable: false,
            writable: false,
        }
    }
}

/// An engine-side object instance
///
/// Member names passed to `get`/`set`/`invoke` are always names previously
/// returned by `members`, spelled exactly as the engine reported them.
pub trait EngineObject: Send + Sync {
    /// Full engine type name, for diagnostics
    fn type_name(&self) -> &str;

    /// Public instance members (properties and methods)
    fn members(&self) -> Vec<MemberInfo>;

    fn get(&self, name: &str) -> Result<Value, EngineFault>;

    fn set(&self, name: &str, value: Value) -> Result<(), EngineFault>;

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, EngineFault>;

    /// Items of an enumerable object, `None` when it is not enumerable
    fn enumerate(&self) -> Option<Vec<Value>> {
        None
    }
}

/// A located engine type that can be instantiated
pub trait EngineType: Send + Sync {
    fn full_name(&self) -> &str;

    fn instantiate(&self) -> Result<ObjectRef, EngineFault>;
}

/// A unit of engine code that exposes types by full name
pub trait EngineModule: Send + Sync {
    fn name(&self) -> &str;

    fn find_type(&self, full_name: &str) -> Option<TypeRef>;
}

/// The host runtime that owns engine loading and unloading
pub trait EngineRuntime: Send + Sync {
    /// Modules already loaded in the current process
    fn loaded_modules(&self) -> Vec<ModuleRef>;

    /// Load a module by its well-known name
    fn load_module(&self, name: &str) -> Result<ModuleRef, EngineFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Float(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Int(2).as_number(), Some(2.0));
        assert_eq!(Value::Str("a".into()).as_str(), Some("a"));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_int(), None);
    }

    #[test]
    fn test_value_from_string_list() {
        let v = Value::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            v,
            Value::List(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
    }
}
