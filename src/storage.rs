//! String-keyed storage backends the quest store persists into.

use std::collections::HashMap;

use near_sdk::env;

use crate::models::{StorageError, StorageMetrics};

pub trait KeyValueStore {
    fn read(&self, key: &str) -> Option<String>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn cost_per_byte(&self) -> u128 {
        0
    }

    /// Rejects a write of `metrics` that the backing account cannot pay for.
    fn check_budget(&self, _metrics: &StorageMetrics) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Contract storage of the current account.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContractStorage;

impl KeyValueStore for ContractStorage {
    fn read(&self, key: &str) -> Option<String> {
        env::storage_read(key.as_bytes()).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        env::storage_write(key.as_bytes(), value.as_bytes());
        Ok(())
    }

    fn cost_per_byte(&self) -> u128 {
        env::storage_byte_cost().as_yoctonear()
    }

    fn check_budget(&self, metrics: &StorageMetrics) -> Result<(), StorageError> {
        let available = env::account_balance().as_yoctonear();
        if available < metrics.total_cost {
            return Err(StorageError::InsufficientBalance {
                required: metrics.total_cost,
                available,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn cost_per_byte(&self) -> u128 {
        (**self).cost_per_byte()
    }

    fn check_budget(&self, metrics: &StorageMetrics) -> Result<(), StorageError> {
        (**self).check_budget(metrics)
    }
}
