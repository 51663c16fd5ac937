//! Persisted form of the quest log: three string values under fixed keys.

use near_sdk::serde::de::DeserializeOwned;

use crate::models::config::{keys, storage::*};
use crate::models::{level_for, Quest, Storable};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub quests: Vec<Quest>,
    pub player_level: u32,
    pub total_exp: u32,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            quests: Vec::new(),
            player_level: level_for(0),
            total_exp: 0,
        }
    }
}

/// Result of reading a snapshot. `invalid` names the keys that held a value
/// which failed to parse or validate; absent keys are not listed.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub snapshot: Snapshot,
    pub invalid: Vec<&'static str>,
}

/// Serialized key/value pairs, ready to be sized and written.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    entries: Vec<(&'static str, String)>,
}

impl Encoded {
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }
}

fn read_value<S, T, F>(storage: &S, key: &'static str, is_valid: F, invalid: &mut Vec<&'static str>) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let raw = storage.read(key)?;
    let value = serde_json::from_str::<T>(&raw).ok().filter(|value| is_valid(value));
    if value.is_none() {
        invalid.push(key);
    }
    value
}

impl Snapshot {
    /// Reads every key from `storage`. Never fails: each missing or corrupt
    /// value is replaced by its default. A quest list holding any record
    /// that breaks the quest model counts as corrupt as a whole.
    pub fn decode<S: KeyValueStore + ?Sized>(storage: &S) -> Decoded {
        let defaults = Snapshot::default();
        let mut invalid = Vec::new();

        let quests = read_value(storage, keys::QUESTS,
            |quests: &Vec<Quest>| quests.iter().all(Quest::is_well_formed), &mut invalid)
            .unwrap_or(defaults.quests);
        let player_level = read_value(storage, keys::PLAYER_LEVEL,
            |level: &u32| *level >= 1, &mut invalid)
            .unwrap_or(defaults.player_level);
        let total_exp = read_value(storage, keys::TOTAL_EXP, |_: &u32| true, &mut invalid)
            .unwrap_or(defaults.total_exp);

        Decoded {
            snapshot: Snapshot { quests, player_level, total_exp },
            invalid,
        }
    }

    pub fn encode(&self) -> Encoded {
        let quests = serde_json::to_string(&self.quests).unwrap_or_else(|_| "[]".to_string());
        Encoded {
            entries: vec![
                (keys::QUESTS, quests),
                (keys::PLAYER_LEVEL, self.player_level.to_string()),
                (keys::TOTAL_EXP, self.total_exp.to_string()),
            ],
        }
    }
}

impl Storable for Encoded {
    const BASE_STORAGE: u64 = SNAPSHOT_BASE_STORAGE;
    const MAX_STORAGE: u64 = MAX_SNAPSHOT_BYTES;

    fn dynamic_size(&self) -> u64 {
        self.entries
            .iter()
            .map(|(key, value)| (key.len() + value.len()) as u64)
            .sum()
    }
}
