use dashmap::DashMap;

use crate::domain::models::PersistenceError;
use crate::domain::models::Store;

/// Process-local store for tests. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        return Ok(self.values.get(key).map(|e| return e.value().to_string()));
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }
}
