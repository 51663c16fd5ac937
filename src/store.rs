//! The quest log: an ordered quest list plus the player's experience,
//! mirrored into a [`KeyValueStore`] after every change.

use schemars::JsonSchema;
use near_sdk::{env, log, serde::{Deserialize, Serialize}};

use crate::models::{
    Difficulty, PlayerProgress, ProgressView, Quest, QuestId, QuestState,
    Storable, StorageError, level_for};
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStore;

/// What a successful completion credited.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct QuestCompletion {
    pub quest_id: QuestId,
    pub exp: u32,
    pub total_exp: u32,
    pub previous_level: u32,
    pub level: u32,
}

impl QuestCompletion {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

pub struct QuestStore<S> {
    storage: S,
    quests: Vec<Quest>,
    progress: PlayerProgress,
    hydrated: bool,
    saved: bool,
}

impl<S: KeyValueStore> QuestStore<S> {
    /// An empty, not yet hydrated store. Nothing is written until
    /// [`QuestStore::initialize`] has run.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            quests: Vec::new(),
            progress: PlayerProgress::default(),
            hydrated: false,
            saved: false,
        }
    }

    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.initialize();
        store
    }

    pub fn initialize(&mut self) {
        let decoded = Snapshot::decode(&self.storage);
        for key in &decoded.invalid {
            log!("Stored value for {} is invalid, using default", key);
        }

        let snapshot = decoded.snapshot;
        let expected_level = level_for(snapshot.total_exp);
        if snapshot.player_level != expected_level {
            log!("Stored level {} does not match {} exp, using level {}",
                snapshot.player_level, snapshot.total_exp, expected_level);
        }

        self.quests = snapshot.quests;
        self.progress = PlayerProgress::new(snapshot.total_exp);
        self.hydrated = true;
        self.saved = true;
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether the last change reached storage. A failed write leaves the
    /// in-memory state in place but reports `false` here.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Appends a new active quest. A title that is blank after trimming is
    /// ignored and `None` is returned.
    pub fn add_quest(&mut self, title: &str, difficulty: Difficulty) -> Option<QuestId> {
        let quest = match Quest::new(self.next_id(), title, difficulty) {
            Ok(quest) => quest,
            Err(e) => {
                log!("Quest not added: {}", e);
                return None;
            }
        };

        let quest_id = quest.id.clone();
        self.quests.push(quest);
        self.persist();
        Some(quest_id)
    }

    /// Completes an active quest and credits its exp. Unknown ids and
    /// quests that are already completed are ignored and `None` is returned.
    pub fn complete_quest(&mut self, quest_id: &str) -> Option<QuestCompletion> {
        let Some(quest) = self.quests.iter_mut().find(|quest| quest.id == quest_id) else {
            log!("Quest {} not found", quest_id);
            return None;
        };

        if let Err(e) = quest.transition_to(QuestState::Completed) {
            log!("Quest {} not completed: {}", quest_id, e);
            return None;
        }

        let exp = quest.exp;
        let (previous_level, level) = self.progress.credit(exp);
        let completion = QuestCompletion {
            quest_id: quest_id.to_string(),
            exp,
            total_exp: self.progress.total_exp(),
            previous_level,
            level,
        };

        self.persist();
        Some(completion)
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == quest_id)
    }

    pub fn active_quests(&self) -> Vec<&Quest> {
        self.quests.iter().filter(|quest| !quest.completed).collect()
    }

    pub fn completed_quests(&self) -> Vec<&Quest> {
        self.quests.iter().filter(|quest| quest.completed).collect()
    }

    pub fn total_exp(&self) -> u32 {
        self.progress.total_exp()
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn exp_to_next_level(&self) -> u32 {
        self.progress.exp_to_next_level()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.progress.progress_fraction()
    }

    pub fn progress(&self) -> ProgressView {
        self.progress.view()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            quests: self.quests.clone(),
            player_level: self.level(),
            total_exp: self.total_exp(),
        }
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // Ids come from the block timestamp; a numeric suffix keeps quests added
    // within the same millisecond apart.
    fn next_id(&self) -> QuestId {
        let base = env::block_timestamp_ms().to_string();
        let mut id = base.clone();
        let mut suffix = 1u32;
        while self.quests.iter().any(|quest| quest.id == id) {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        id
    }

    fn persist(&mut self) -> bool {
        self.saved = self.hydrated && match self.write_snapshot() {
            Ok(()) => true,
            Err(e) => {
                log!("Quest log not saved: {}", e);
                false
            }
        };
        self.saved
    }

    fn write_snapshot(&mut self) -> Result<(), StorageError> {
        let encoded = self.snapshot().encode();
        let metrics = encoded.validate_storage(self.storage.cost_per_byte())?;
        self.storage.check_budget(&metrics)?;

        for (key, value) in encoded.entries() {
            self.storage.write(key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StorageMetrics;
    use crate::storage::MemoryStorage;
    use near_sdk::test_utils::{get_logs, VMContextBuilder};
    use near_sdk::testing_env;
    use proptest::prelude::*;

    fn store() -> QuestStore<MemoryStorage> {
        QuestStore::open(MemoryStorage::new())
    }

    fn store_with_exp(total_exp: u32) -> QuestStore<MemoryStorage> {
        QuestStore::open(MemoryStorage::new().with_entry("totalExp", &total_exp.to_string()))
    }

    /// Accepts nothing.
    struct FullStorage;

    impl KeyValueStore for FullStorage {
        fn read(&self, _key: &str) -> Option<String> {
            None
        }

        fn write(&mut self, _key: &str, value: &str) -> Result<(), StorageError> {
            Err(StorageError::ExceedsMaxSize { size: value.len() as u64, max_allowed: 0 })
        }

        fn check_budget(&self, metrics: &StorageMetrics) -> Result<(), StorageError> {
            Err(StorageError::InsufficientBalance { required: metrics.total_cost, available: 0 })
        }
    }

    #[test]
    fn scenario_add_then_complete() {
        let mut store = store();
        let id = store.add_quest("Slay dragon", Difficulty::Hard).unwrap();
        assert_eq!(store.active_quests().len(), 1);
        assert_eq!(store.quest(&id).unwrap().exp, 30);
        assert_eq!(store.total_exp(), 0);

        let completion = store.complete_quest(&id).unwrap();
        assert_eq!(store.completed_quests().len(), 1);
        assert_eq!(store.active_quests().len(), 0);
        assert_eq!(store.total_exp(), 30);
        assert_eq!(store.level(), 1);
        assert_eq!(store.exp_to_next_level(), 70);
        assert!(!completion.leveled_up());
    }

    #[test]
    fn crossing_a_hundred_levels_up() {
        let mut store = store_with_exp(90);
        let id = store.add_quest("Clean garage", Difficulty::Medium).unwrap();
        let completion = store.complete_quest(&id).unwrap();
        assert_eq!(completion.total_exp, 110);
        assert_eq!((completion.previous_level, completion.level), (1, 2));
        assert!(completion.leveled_up());
        assert_eq!(store.level(), 2);
    }

    #[test]
    fn corrupt_quest_list_hydrates_empty() {
        let store = QuestStore::open(MemoryStorage::new().with_entry("quests", "not valid json"));
        assert!(store.is_hydrated());
        assert!(store.active_quests().is_empty());
        assert_eq!(store.level(), 1);
    }

    #[test]
    fn blank_titles_are_ignored() {
        let mut store = store();
        assert_eq!(store.add_quest("", Difficulty::Easy), None);
        assert_eq!(store.add_quest("   \t", Difficulty::Hard), None);
        assert!(store.quests().is_empty());
        assert!(store.into_storage().is_empty());
    }

    #[test]
    fn completing_twice_credits_once() {
        let mut store = store();
        let id = store.add_quest("Write report", Difficulty::Medium).unwrap();
        assert!(store.complete_quest(&id).is_some());
        assert_eq!(store.complete_quest(&id), None);
        assert_eq!(store.total_exp(), 20);
        assert_eq!(store.completed_quests().len(), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut store = store();
        store.add_quest("Stretch", Difficulty::Easy);
        assert_eq!(store.complete_quest("missing"), None);
        assert_eq!(store.total_exp(), 0);
        assert_eq!(store.active_quests().len(), 1);
    }

    #[test]
    fn quests_keep_insertion_order() {
        let mut store = store();
        let first = store.add_quest("First", Difficulty::Easy).unwrap();
        let second = store.add_quest("Second", Difficulty::Hard).unwrap();
        let third = store.add_quest("Third", Difficulty::Medium).unwrap();
        store.complete_quest(&second);

        let active: Vec<_> = store.active_quests().iter().map(|q| q.id.clone()).collect();
        assert_eq!(active, vec![first, third]);
        assert_eq!(store.completed_quests()[0].id, second);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut store = store();
        let a = store.add_quest("a", Difficulty::Easy).unwrap();
        let b = store.add_quest("b", Difficulty::Easy).unwrap();
        let c = store.add_quest("c", Difficulty::Easy).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(b, format!("{}-1", a));
    }

    #[test]
    fn initialize_does_not_write() {
        let storage = MemoryStorage::new().with_entry("totalExp", "40");
        let store = QuestStore::open(storage.clone());
        assert_eq!(store.into_storage(), storage);
    }

    #[test]
    fn unhydrated_store_never_writes() {
        let mut store = QuestStore::new(MemoryStorage::new());
        assert!(!store.is_hydrated());
        store.add_quest("Early", Difficulty::Easy);
        assert!(!store.is_saved());
        assert!(store.into_storage().is_empty());
    }

    #[test]
    fn mutations_write_full_snapshot() {
        let mut storage = MemoryStorage::new();
        let mut store = QuestStore::open(&mut storage);
        let id = store.add_quest("Read a chapter", Difficulty::Hard).unwrap();
        store.complete_quest(&id);
        assert!(store.is_saved());
        drop(store);

        assert_eq!(storage.read("totalExp").as_deref(), Some("30"));
        assert_eq!(storage.read("playerLevel").as_deref(), Some("1"));
        assert!(storage.read("quests").unwrap().contains("\"completed\":true"));
    }

    #[test]
    fn stored_level_is_recomputed_from_exp() {
        testing_env!(VMContextBuilder::new().build());
        let store = QuestStore::open(
            MemoryStorage::new()
                .with_entry("playerLevel", "7")
                .with_entry("totalExp", "150"),
        );
        assert_eq!(store.level(), 2);
        assert!(get_logs().iter().any(|line| line.contains("does not match")));
    }

    #[test]
    fn write_failures_are_swallowed() {
        testing_env!(VMContextBuilder::new().build());
        let mut store = QuestStore::open(FullStorage);
        let id = store.add_quest("Survive", Difficulty::Easy).unwrap();
        let completion = store.complete_quest(&id).unwrap();
        assert_eq!(completion.total_exp, 10);
        assert_eq!(store.total_exp(), 10);
        assert!(!store.is_saved());
        assert!(get_logs().iter().any(|line| line.starts_with("Quest log not saved")));
    }

    #[test]
    fn missing_keys_hydrate_quietly() {
        testing_env!(VMContextBuilder::new().build());
        let store = store();
        assert!(store.is_saved());
        assert!(get_logs().is_empty());

        QuestStore::open(MemoryStorage::new().with_entry("totalExp", "lots"));
        assert_eq!(get_logs(), vec!["Stored value for totalExp is invalid, using default"]);
    }

    #[test]
    fn inflated_stored_exp_is_never_credited() {
        let mut store = QuestStore::open(MemoryStorage::new().with_entry(
            "quests",
            r#"[{"id":"1","title":"Water plants","completed":false,"difficulty":"easy","exp":1000}]"#,
        ));
        assert!(store.quests().is_empty());
        assert_eq!(store.complete_quest("1"), None);
        assert_eq!(store.total_exp(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String, Difficulty),
        Complete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let difficulty = prop::sample::select(Difficulty::ALL.to_vec());
        prop_oneof![
            ("[ a-z]{0,12}", difficulty).prop_map(|(title, difficulty)| Op::Add(title, difficulty)),
            (0usize..16).prop_map(Op::Complete),
        ]
    }

    proptest! {
        #[test]
        fn operations_preserve_progress_invariants(ops in prop::collection::vec(op(), 0..40)) {
            testing_env!(VMContextBuilder::new().build());
            let mut storage = MemoryStorage::new();
            let mut store = QuestStore::open(&mut storage);

            for op in ops {
                let before_total = store.total_exp();
                let before_active = store.active_quests().len();
                let before_completed = store.completed_quests().len();

                match op {
                    Op::Add(title, difficulty) => {
                        let added = store.add_quest(&title, difficulty);
                        prop_assert_eq!(added.is_some(), !title.trim().is_empty());
                        let expected = before_active + usize::from(added.is_some());
                        prop_assert_eq!(store.active_quests().len(), expected);
                        prop_assert_eq!(store.total_exp(), before_total);
                    }
                    Op::Complete(index) => {
                        let target = store.quests().get(index).cloned();
                        let completion = target.as_ref().and_then(|quest| store.complete_quest(&quest.id));
                        match (target, completion) {
                            (Some(quest), Some(completion)) => {
                                prop_assert!(!quest.completed);
                                prop_assert_eq!(completion.exp, quest.exp);
                                prop_assert_eq!(store.total_exp(), before_total + quest.exp);
                                prop_assert_eq!(store.active_quests().len(), before_active - 1);
                                prop_assert_eq!(store.completed_quests().len(), before_completed + 1);
                                prop_assert_eq!(store.complete_quest(&quest.id), None);
                                prop_assert_eq!(store.total_exp(), before_total + quest.exp);
                            }
                            (_, None) => prop_assert_eq!(store.total_exp(), before_total),
                            (None, Some(_)) => prop_assert!(false, "completed a missing quest"),
                        }
                    }
                }

                prop_assert_eq!(store.level(), store.total_exp() / 100 + 1);
                let credited: u32 = store.completed_quests().iter().map(|quest| quest.exp).sum();
                prop_assert_eq!(store.total_exp(), credited);
            }

            let snapshot = store.snapshot();
            drop(store);
            let reloaded = QuestStore::open(&mut storage);
            prop_assert_eq!(reloaded.snapshot(), snapshot);
        }
    }
}
