use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Clone, PartialEq, Debug)]
#[serde(crate = "near_sdk::serde")]
pub enum StorageError {
    InsufficientBalance { required: u128, available: u128 },
    ExceedsMaxSize { size: u64, max_allowed: u64 }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientBalance { required, available } => {
                write!(f, "Insufficient balance: required {}, available {}", required, available)
            },
            Self::ExceedsMaxSize { size, max_allowed } => {
                write!(f, "Exceeds max size: size {}, max allowed {}", size, max_allowed)
            }
        }
    }
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize,
    Debug, Clone, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct StorageMetrics {
    pub base_size: u64,
    pub dynamic_size: u64,
    pub total_bytes: u64,
    pub cost_per_byte: u128,
    pub total_cost: u128,
}

pub trait Storable {
    const BASE_STORAGE: u64;
    const MAX_STORAGE: u64;

    fn dynamic_size(&self) -> u64;

    fn calculate_storage_metrics(&self, cost_per_byte: u128) -> StorageMetrics {
        let dynamic_size = self.dynamic_size();
        let total_bytes = Self::BASE_STORAGE + dynamic_size;
        StorageMetrics {
            base_size: Self::BASE_STORAGE,
            dynamic_size,
            total_bytes,
            cost_per_byte,
            total_cost: cost_per_byte * total_bytes as u128,
        }
    }

    fn validate_storage(&self, cost_per_byte: u128) -> Result<StorageMetrics, StorageError> {
        let metrics = self.calculate_storage_metrics(cost_per_byte);

        if metrics.total_bytes > Self::MAX_STORAGE {
            return Err(StorageError::ExceedsMaxSize {
                size: metrics.total_bytes,
                max_allowed: Self::MAX_STORAGE,
            });
        }

        Ok(metrics)
    }
}
