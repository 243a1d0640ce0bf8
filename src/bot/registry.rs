//! In-memory map of live component bindings.
//!
//! Every component this process is currently willing to act on has an entry
//! here. Entries are added when an entity is created (or re-added by the
//! reconciliation pass after a restart) and removed when the entity reaches a
//! terminal state. Dispatch consults the registry first; a decodable id with
//! no entry is treated the same as an unknown one.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::router::ComponentTarget;

#[derive(Default)]
pub struct BindingRegistry {
    inner: Mutex<HashMap<String, ComponentTarget>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, custom_id: &str, target: ComponentTarget) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(custom_id.to_string(), target);
    }

    pub fn unregister(&self, custom_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.remove(custom_id);
    }

    pub fn resolve(&self, custom_id: &str) -> Option<ComponentTarget> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(custom_id).cloned()
    }

    /// Ordered copy of the whole map, for reconciliation round-trip checks.
    pub fn snapshot(&self) -> BTreeMap<String, ComponentTarget> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.clear();
    }
}
