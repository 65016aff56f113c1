use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Per-tab key/value store that survives a full navigation, used for
/// one-shot success banners set before a redirect.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Reads and removes a flash message so it shows exactly once.
pub fn take_flash(store: &dyn SessionStore, key: &str) -> Option<String> {
    let message = store.get(key)?;
    store.remove(key);
    Some(message).filter(|message| !message.is_empty())
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::{take_flash, MemorySessionStore, SessionStore};

    #[test]
    fn flash_is_consumed_once() {
        let store = MemorySessionStore::new();
        store.set("expenseSuccess", "Expense added");
        assert_eq!(take_flash(&store, "expenseSuccess").as_deref(), Some("Expense added"));
        assert_eq!(take_flash(&store, "expenseSuccess"), None);
    }

    #[test]
    fn empty_flash_is_dropped() {
        let store = MemorySessionStore::new();
        store.set("saleSuccess", "");
        assert_eq!(take_flash(&store, "saleSuccess"), None);
        assert_eq!(store.get("saleSuccess"), None);
    }
}
