//! Invocation façade
//!
//! Every engine interaction goes through `try_set`, `get`, `try_call` and
//! `try_call_ret`. Each resolves its member through the capability resolver,
//! coerces arguments where needed and turns misses, coercion failures, engine
//! faults and panics into a `ProbeError` value.

use super::resolver::CapabilityResolver;
use crate::config::AdapterError;
use crate::engine::{coerce, CoercionError, EngineFault, MemberKind, ObjectRef, TypeRef, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Why a probe did not succeed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("{type_name} has no {kind} named {member}")]
    Missing {
        type_name: String,
        member: String,
        kind: MemberKind,
    },

    #[error("{type_name}.{member} is not writable")]
    NotWritable { type_name: String, member: String },

    #[error("{type_name}.{member} is not readable")]
    NotReadable { type_name: String, member: String },

    #[error("cannot assign {type_name}.{member}: {source}")]
    Coercion {
        type_name: String,
        member: String,
        #[source]
        source: CoercionError,
    },

    #[error("{type_name}.{member} faulted: {cause}")]
    Fault {
        type_name: String,
        member: String,
        cause: String,
    },
}

impl ProbeError {
    /// The member does not exist at all (capability absent)
    pub fn is_missing(&self) -> bool {
        matches!(self, ProbeError::Missing { .. })
    }

    fn missing(object: &ObjectRef, candidates: &[&str], kind: MemberKind) -> Self {
        ProbeError::Missing {
            type_name: object.type_name().to_string(),
            member: candidates.join("|"),
            kind,
        }
    }
}

impl From<ProbeError> for AdapterError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Fault { type_name, member, cause } => AdapterError::EngineFault {
                member: format!("{}.{}", type_name, member),
                cause,
            },
            ProbeError::Coercion { type_name, member, source } => AdapterError::EngineFault {
                member: format!("{}.{}", type_name, member),
                cause: source.to_string(),
            },
            missing => AdapterError::absent(missing.to_string()),
        }
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "engine panicked".to_string())
}

/// Create an instance of `ty`; constructor faults and panics become `EngineFault`
pub fn instantiate(ty: &TypeRef) -> Result<ObjectRef, AdapterError> {
    let fault = |cause: String| AdapterError::EngineFault {
        member: format!("{}::new", ty.full_name()),
        cause,
    };

    match panic::catch_unwind(AssertUnwindSafe(|| ty.instantiate())) {
        Ok(Ok(object)) => Ok(object),
        Ok(Err(e)) => Err(fault(e.message)),
        Err(payload) => Err(fault(panic_message(payload.as_ref()))),
    }
}

/// Run an engine call, converting faults and panics into `ProbeError::Fault`
fn guarded<T>(
    object: &ObjectRef,
    member: &str,
    call: impl FnOnce() -> Result<T, EngineFault>,
) -> Result<T, ProbeError> {
    let fault = |cause: String| ProbeError::Fault {
        type_name: object.type_name().to_string(),
        member: member.to_string(),
        cause,
    };

    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(fault(e.message)),
        Err(payload) => Err(fault(panic_message(payload.as_ref()))),
    }
}

/// Guarded access to engine objects
#[derive(Clone, Copy)]
pub struct Invoker<'r> {
    resolver: &'r CapabilityResolver,
}

impl<'r> Invoker<'r> {
    pub fn new(resolver: &'r CapabilityResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &'r CapabilityResolver {
        self.resolver
    }

    /// Set a writable property, coercing `value` to its declared type
    pub fn try_set(&self, object: &ObjectRef, property: &str, value: impl Into<Value>) -> Result<(), ProbeError> {
        let member = self
            .resolver
            .find_member(object.as_ref(), property, MemberKind::Property)
            .ok_or_else(|| ProbeError::missing(object, &[property], MemberKind::Property))?;

        if !member.writable {
            return Err(ProbeError::NotWritable {
                type_name: object.type_name().to_string(),
                member: member.name,
            });
        }

        let value = coerce(value.into(), &member.ty).map_err(|source| ProbeError::Coercion {
            type_name: object.type_name().to_string(),
            member: member.name.clone(),
            source,
        })?;

        guarded(object, &member.name, || object.set(&member.name, value))
    }

    /// Read a property; `None` when absent, unreadable, faulted or null
    pub fn get(&self, object: &ObjectRef, property: &str) -> Option<Value> {
        self.read(object, property).ok().filter(|v| !v.is_null())
    }

    /// Read a property, keeping the reason on failure
    pub fn read(&self, object: &ObjectRef, property: &str) -> Result<Value, ProbeError> {
        let member = self
            .resolver
            .find_member(object.as_ref(), property, MemberKind::Property)
            .ok_or_else(|| ProbeError::missing(object, &[property], MemberKind::Property))?;

        if !member.readable {
            return Err(ProbeError::NotReadable {
                type_name: object.type_name().to_string(),
                member: member.name,
            });
        }

        guarded(object, &member.name, || object.get(&member.name))
    }

    /// Invoke a method and discard its return value
    pub fn try_call(&self, object: &ObjectRef, method: &str, args: &[Value]) -> Result<(), ProbeError> {
        self.try_call_ret(object, method, args).map(|_| ())
    }

    /// Invoke a method and return its result (`Value::Null` for none)
    pub fn try_call_ret(&self, object: &ObjectRef, method: &str, args: &[Value]) -> Result<Value, ProbeError> {
        let member = self
            .resolver
            .find_member(object.as_ref(), method, MemberKind::Method)
            .ok_or_else(|| ProbeError::missing(object, &[method], MemberKind::Method))?;

        guarded(object, &member.name, || object.invoke(&member.name, args))
    }

    /// Items of an enumerable object; `None` if not enumerable or it panicked
    pub fn enumerate(&self, object: &ObjectRef) -> Option<Vec<Value>> {
        panic::catch_unwind(AssertUnwindSafe(|| object.enumerate())).ok().flatten()
    }

    /// First candidate property holding a non-null value
    pub fn get_first(&self, object: &ObjectRef, candidates: &[&str]) -> Option<Value> {
        candidates.iter().find_map(|name| self.get(object, name))
    }

    /// Set the first candidate property that accepts the value
    pub fn set_first(&self, object: &ObjectRef, candidates: &[&str], value: Value) -> Result<(), ProbeError> {
        first_available(object, candidates, MemberKind::Property, |name| {
            self.try_set(object, name, value.clone())
        })
    }

    /// Call the first candidate method that succeeds
    pub fn call_first(&self, object: &ObjectRef, candidates: &[&str], args: &[Value]) -> Result<Value, ProbeError> {
        first_available(object, candidates, MemberKind::Method, |name| {
            self.try_call_ret(object, name, args)
        })
    }
}

/// "First available wins" over an ordered candidate list
///
/// A missing member moves on silently; any other failure is kept and
/// reported if no later candidate succeeds.
pub fn first_available<T>(
    object: &ObjectRef,
    candidates: &[&str],
    kind: MemberKind,
    mut attempt: impl FnMut(&str) -> Result<T, ProbeError>,
) -> Result<T, ProbeError> {
    let mut failure: Option<ProbeError> = None;

    for name in candidates {
        match attempt(*name) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_missing() => {}
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }

    Err(failure.unwrap_or_else(|| ProbeError::missing(object, candidates, kind)))
}
