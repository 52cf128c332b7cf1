//! Capability resolver: find engine types and members by candidate names

use super::invoke::panic_message;
use crate::diag;
use crate::engine::{EngineObject, EngineRuntime, MemberInfo, MemberKind, ModuleRef, TypeRef};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Locates engine types and probes objects for members
pub struct CapabilityResolver {
    runtime: Arc<dyn EngineRuntime>,
    known_modules: Vec<String>,
}

impl CapabilityResolver {
    pub fn new(runtime: Arc<dyn EngineRuntime>, known_modules: Vec<String>) -> Self {
        Self {
            runtime,
            known_modules,
        }
    }

    /// Find the first of `candidates` exposed by the engine
    ///
    /// Modules already loaded are scanned first, then each known module name
    /// is loaded and probed. No match is not an error: the capability is absent.
    pub fn find_type(&self, candidates: &[&str]) -> Option<TypeRef> {
        let loaded = match panic::catch_unwind(AssertUnwindSafe(|| self.runtime.loaded_modules())) {
            Ok(modules) => modules,
            Err(payload) => {
                diag!("listing loaded modules panicked: {}", panic_message(payload.as_ref()));
                Vec::new()
            }
        };
        for name in candidates {
            if let Some(ty) = loaded.iter().find_map(|m| type_in(m, name)) {
                diag!("resolved type {} in loaded modules", name);
                return Some(ty);
            }
        }

        for module_name in &self.known_modules {
            let module = match panic::catch_unwind(AssertUnwindSafe(|| self.runtime.load_module(module_name))) {
                Ok(Ok(module)) => module,
                Ok(Err(e)) => {
                    diag!("module {} not loadable: {}", module_name, e);
                    continue;
                }
                Err(payload) => {
                    diag!("loading module {} panicked: {}", module_name, panic_message(payload.as_ref()));
                    continue;
                }
            };
            if let Some(ty) = candidates.iter().find_map(|name| type_in(&module, name)) {
                diag!("resolved type {} in module {}", ty.full_name(), module_name);
                return Some(ty);
            }
        }

        diag!("no engine type among [{}]", candidates.join(", "));
        None
    }

    /// Case-insensitive exact-name lookup of one member of the given kind
    pub fn find_member(&self, object: &dyn EngineObject, name: &str, kind: MemberKind) -> Option<MemberInfo> {
        self.find_first_member(object, &[name], kind)
    }

    /// First of `candidates` that the object exposes as a member of `kind`
    pub fn find_first_member(
        &self,
        object: &dyn EngineObject,
        candidates: &[&str],
        kind: MemberKind,
    ) -> Option<MemberInfo> {
        let members = Self::members_of(object);
        let found = candidates.iter().find_map(|wanted| {
            members
                .iter()
                .find(|m| m.kind == kind && m.name.eq_ignore_ascii_case(wanted))
                .cloned()
        });

        if found.is_none() {
            diag!(
                "{} has no {} among [{}]; available: [{}]",
                object.type_name(),
                kind,
                candidates.join(", "),
                members
                    .iter()
                    .filter(|m| m.kind == kind)
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        found
    }

    fn members_of(object: &dyn EngineObject) -> Vec<MemberInfo> {
        panic::catch_unwind(AssertUnwindSafe(|| object.members())).unwrap_or_default()
    }
}

/// Look up one type in a module; a panicking module counts as not found
fn type_in(module: &ModuleRef, name: &str) -> Option<TypeRef> {
    match panic::catch_unwind(AssertUnwindSafe(|| module.find_type(name))) {
        Ok(found) => found,
        Err(payload) => {
            diag!("type lookup for {} panicked: {}", name, panic_message(payload.as_ref()));
            None
        }
    }
}
