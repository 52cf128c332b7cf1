//! In-process implementation of the engine object model
//!
//! `DynObject` is assembled from property slots and method closures. Host
//! bridges use it to wrap engines they reach by hand, and it doubles as the
//! engine stand-in for the test suite.

use super::{
    EngineFault, EngineModule, EngineObject, EngineRuntime, EngineType, MemberInfo, MemberKind,
    ModuleRef, ObjectRef, TypeRef, Value, ValueKind,
};
use parking_lot::Mutex;
use std::sync::Arc;

type MethodFn = Arc<dyn Fn(&DynObject, &[Value]) -> Result<Value, EngineFault> + Send + Sync>;
type Factory = Box<dyn Fn() -> Result<ObjectRef, EngineFault> + Send + Sync>;

struct Slot {
    info: MemberInfo,
    value: Value,
}

/// Engine object assembled at runtime
pub struct DynObject {
    type_name: String,
    slots: Mutex<Vec<Slot>>,
    methods: Vec<(String, MethodFn)>,
    items: Option<Vec<Value>>,
}

impl DynObject {
    pub fn builder(type_name: impl Into<String>) -> DynObjectBuilder {
        DynObjectBuilder {
            type_name: type_name.into(),
            slots: Vec::new(),
            methods: Vec::new(),
            items: None,
        }
    }

    /// Current value of a property, ignoring readability
    pub fn value_of(&self, name: &str) -> Option<Value> {
        self.slots
            .lock()
            .iter()
            .find(|s| s.info.name == name)
            .map(|s| s.value.clone())
    }

    /// Overwrite a property, ignoring writability and declared type
    pub fn store(&self, name: &str, value: Value) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.iter_mut().find(|s| s.info.name == name) {
            slot.value = value;
        }
    }
}

impl EngineObject for DynObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Vec<MemberInfo> {
        let mut members: Vec<MemberInfo> = self.slots.lock().iter().map(|s| s.info.clone()).collect();
        members.extend(self.methods.iter().map(|(name, _)| MemberInfo::method(name.clone())));
        members
    }

    fn get(&self, name: &str) -> Result<Value, EngineFault> {
        let slots = self.slots.lock();
        let slot = slots
            .iter()
            .find(|s| s.info.name == name)
            .ok_or_else(|| EngineFault::new(format!("{}.{} does not exist", self.type_name, name)))?;
        if !slot.info.readable {
            return Err(EngineFault::new(format!("{}.{} is write-only", self.type_name, name)));
        }
        Ok(slot.value.clone())
    }

    fn set(&self, name: &str, value: Value) -> Result<(), EngineFault> {
        let mut slots = self.slots.lock();
        let slot = slots
            .iter_mut()
            .find(|s| s.info.name == name)
            .ok_or_else(|| EngineFault::new(format!("{}.{} does not exist", self.type_name, name)))?;
        if !slot.info.writable {
            return Err(EngineFault::new(format!("{}.{} is read-only", self.type_name, name)));
        }
        slot.value = value;
        Ok(())
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, EngineFault> {
        let method = self
            .methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| Arc::clone(f))
            .ok_or_else(|| EngineFault::new(format!("{}.{}() does not exist", self.type_name, name)))?;
        method(self, args)
    }

    fn enumerate(&self) -> Option<Vec<Value>> {
        self.items.clone()
    }
}

pub struct DynObjectBuilder {
    type_name: String,
    slots: Vec<Slot>,
    methods: Vec<(String, MethodFn)>,
    items: Option<Vec<Value>>,
}

impl DynObjectBuilder {
    /// Readable and writable property
    pub fn property(self, name: &str, ty: ValueKind, initial: impl Into<Value>) -> Self {
        self.slot(name, ty, initial.into(), true, true)
    }

    pub fn read_only(self, name: &str, ty: ValueKind, value: impl Into<Value>) -> Self {
        self.slot(name, ty, value.into(), true, false)
    }

    pub fn write_only(self, name: &str, ty: ValueKind) -> Self {
        self.slot(name, ty, Value::Null, false, true)
    }

    fn slot(mut self, name: &str, ty: ValueKind, value: Value, readable: bool, writable: bool) -> Self {
        self.slots.push(Slot {
            info: MemberInfo {
                name: name.to_string(),
                kind: MemberKind::Property,
                ty,
                readable,
                writable,
            },
            value,
        });
        self
    }

    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&DynObject, &[Value]) -> Result<Value, EngineFault> + Send + Sync + 'static,
    {
        self.methods.push((name.to_string(), Arc::new(f)));
        self
    }

    /// Make the object enumerable over `items`
    pub fn items(mut self, items: Vec<Value>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn build(self) -> Arc<DynObject> {
        Arc::new(DynObject {
            type_name: self.type_name,
            slots: Mutex::new(self.slots),
            methods: self.methods,
            items: self.items,
        })
    }
}

/// Engine type backed by a factory closure
pub struct DynType {
    full_name: String,
    factory: Factory,
}

impl DynType {
    pub fn new<F>(full_name: impl Into<String>, factory: F) -> Arc<Self>
    where
        F: Fn() -> Result<ObjectRef, EngineFault> + Send + Sync + 'static,
    {
        Arc::new(Self {
            full_name: full_name.into(),
            factory: Box::new(factory),
        })
    }
}

impl EngineType for DynType {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn instantiate(&self) -> Result<ObjectRef, EngineFault> {
        (self.factory)()
    }
}

/// Named collection of types
pub struct DynModule {
    name: String,
    types: Vec<TypeRef>,
}

impl DynModule {
    pub fn new(name: impl Into<String>, types: Vec<TypeRef>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            types,
        })
    }
}

impl EngineModule for DynModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_type(&self, full_name: &str) -> Option<TypeRef> {
        self.types.iter().find(|t| t.full_name() == full_name).cloned()
    }
}

/// Runtime with a set of loaded modules and a set that loads on demand
#[derive(Default)]
pub struct DynRuntime {
    loaded: Mutex<Vec<ModuleRef>>,
    available: Vec<ModuleRef>,
}

impl DynRuntime {
    pub fn new(loaded: Vec<ModuleRef>, available: Vec<ModuleRef>) -> Arc<Self> {
        Arc::new(Self {
            loaded: Mutex::new(loaded),
            available,
        })
    }
}

impl EngineRuntime for DynRuntime {
    fn loaded_modules(&self) -> Vec<ModuleRef> {
        self.loaded.lock().clone()
    }

    fn load_module(&self, name: &str) -> Result<ModuleRef, EngineFault> {
        let module = self
            .available
            .iter()
            .find(|m| m.name() == name)
            .cloned()
            .ok_or_else(|| EngineFault::new(format!("module '{}' could not be loaded", name)))?;
        let mut loaded = self.loaded.lock();
        if !loaded.iter().any(|m| m.name() == name) {
            loaded.push(Arc::clone(&module));
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_access_rules() {
        let obj = DynObject::builder("T")
            .property("A", ValueKind::Int, 1i64)
            .read_only("B", ValueKind::Str, "x")
            .write_only("C", ValueKind::Bool)
            .build();

        assert_eq!(obj.get("A"), Ok(Value::Int(1)));
        assert!(obj.set("B", Value::Str("y".into())).is_err());
        assert!(obj.get("C").is_err());
        assert!(obj.set("C", Value::Bool(true)).is_ok());
        assert_eq!(obj.value_of("C"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_method_sees_object_state() {
        let obj = DynObject::builder("T")
            .property("Counter", ValueKind::Int, 0i64)
            .method("Bump", |this, _| {
                let n = this.value_of("Counter").and_then(|v| v.as_int()).unwrap_or(0);
                this.store("Counter", Value::Int(n + 1));
                Ok(Value::Null)
            })
            .build();

        obj.invoke("Bump", &[]).unwrap();
        obj.invoke("Bump", &[]).unwrap();
        assert_eq!(obj.value_of("Counter"), Some(Value::Int(2)));
        assert_eq!(obj.members().len(), 2);
    }

    #[test]
    fn test_runtime_loads_on_demand() {
        let ty: TypeRef = DynType::new("Eng.Job", || Ok(DynObject::builder("Eng.Job").build() as ObjectRef));
        let module: ModuleRef = DynModule::new("eng", vec![ty]);
        let runtime = DynRuntime::new(Vec::new(), vec![module]);

        assert!(runtime.loaded_modules().is_empty());
        assert!(runtime.load_module("missing").is_err());
        let m = runtime.load_module("eng").unwrap();
        assert!(m.find_type("Eng.Job").is_some());
        assert_eq!(runtime.loaded_modules().len(), 1);
    }
}
