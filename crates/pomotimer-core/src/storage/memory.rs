use std::cell::RefCell;
use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::Result;

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, (String, Option<i64>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value regardless of expiry, for inspection in tests.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).map(|(v, _)| v.clone())
    }

    pub fn expires_at(&self, key: &str) -> Option<i64> {
        self.entries.borrow().get(key).and_then(|(_, exp)| *exp)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).and_then(|(value, expires)| match expires {
            Some(at) if *at <= now_ms => None,
            _ => Some(value.clone()),
        }))
    }

    fn set(&self, key: &str, value: &str, expires_at_ms: Option<i64>) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), (value.to_string(), expires_at_ms));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
