use std::{collections::HashMap, sync::RwLock};

use super::{KeyValueStore, StoreError, StoreResult};

/// Non durable store, lives as long as the process
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| StoreError::UnableToRead(e.to_string()))?;

        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values
            .write()
            .map_err(|e| StoreError::UnableToWrite(e.to_string()))?
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values
            .write()
            .map_err(|e| StoreError::UnableToWrite(e.to_string()))?
            .remove(key);

        Ok(())
    }
}
