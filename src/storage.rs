use crate::capability::DurableCapability;
use crate::runtime_state::StorageMode;
use crate::runtime_values::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Names shared with the automation driver. Durable mode uses them as
/// localStorage keys holding JSON; volatile mode uses them as global fields.
pub mod keys {
    pub const ALERTS: &str = "__webdriverAlerts";
    pub const CONFIRMS: &str = "__webdriverConfirms";
    pub const NEXT_CONFIRM: &str = "__webdriverNextConfirm";
    pub const PROMPTS: &str = "__webdriverPrompts";
    pub const NEXT_PROMPT: &str = "__webdriverNextPrompt";
    pub const INSTALLED: &str = "__isReplacedAlertMethod";
}

/// One origin's localStorage area. Cloning shares the area.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalStorage(Rc<RefCell<BTreeMap<String, String>>>);

impl LocalStorage {
    pub(crate) fn get_item(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    pub(crate) fn set_item(&self, key: &str, raw: String) {
        self.0.borrow_mut().insert(key.to_string(), raw);
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }
}

/// Plain fields on a context's global object.
#[derive(Debug, Clone, Default)]
pub(crate) struct GlobalScope(Rc<RefCell<HashMap<String, Value>>>);

impl GlobalScope {
    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub(crate) fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().insert(name.to_string(), value);
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }
}

pub(crate) trait StorageBackend: fmt::Debug {
    fn mode(&self) -> StorageMode;
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn has(&self, key: &str) -> bool;
}

#[derive(Debug)]
pub(crate) struct DurableBackend {
    storage: LocalStorage,
}

impl DurableBackend {
    pub(crate) fn new(capability: DurableCapability) -> Self {
        Self {
            storage: capability.into_storage(),
        }
    }
}

impl StorageBackend for DurableBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Durable
    }

    // Items that are not JSON read as absent.
    fn get(&self, key: &str) -> Option<Value> {
        let raw = self.storage.get_item(key)?;
        Value::from_json(&raw).ok()
    }

    fn set(&self, key: &str, value: Value) {
        if let Ok(raw) = value.to_json() {
            self.storage.set_item(key, raw);
        }
    }

    fn has(&self, key: &str) -> bool {
        self.storage.contains_key(key)
    }
}

#[derive(Debug)]
pub(crate) struct VolatileBackend {
    globals: GlobalScope,
}

impl VolatileBackend {
    pub(crate) fn new(globals: GlobalScope) -> Self {
        Self { globals }
    }
}

impl StorageBackend for VolatileBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Volatile
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.globals.get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.globals.set(key, value);
    }

    fn has(&self, key: &str) -> bool {
        self.globals.has(key)
    }
}

pub(crate) fn select_backend(
    capability: Option<DurableCapability>,
    globals: &GlobalScope,
) -> Rc<dyn StorageBackend> {
    match capability {
        Some(capability) => Rc::new(DurableBackend::new(capability)),
        None => Rc::new(VolatileBackend::new(globals.clone())),
    }
}
