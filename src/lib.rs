use near_sdk::{near, PanicOnDefault};

pub mod events;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod store;

use crate::events::QuestEvent;
use crate::models::{Difficulty, ProgressView, Quest, QuestId};
use crate::storage::ContractStorage;
use crate::store::{QuestCompletion, QuestStore};

// === Core Data Structures ===
// All quest data lives under the `quests`, `playerLevel` and `totalExp`
// storage keys; the contract struct itself carries nothing.
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {}

#[near]
impl Contract {
    #[init]
    pub fn new() -> Self {
        Self {}
    }

    fn open_store() -> QuestStore<ContractStorage> {
        QuestStore::open(ContractStorage)
    }

    // === Quest Management ===
    pub fn add_quest(&mut self, title: String, difficulty: Difficulty) -> Option<QuestId> {
        let mut store = Self::open_store();
        let quest_id = store.add_quest(&title, difficulty)?;

        if store.is_saved() {
            QuestEvent::QuestAdded {
                quest_id: quest_id.clone(),
                difficulty,
                exp: difficulty.exp(),
            }.emit();
        }

        Some(quest_id)
    }

    pub fn complete_quest(&mut self, quest_id: QuestId) -> Option<QuestCompletion> {
        let mut store = Self::open_store();
        let completion = store.complete_quest(&quest_id)?;
        if !store.is_saved() {
            return Some(completion);
        }

        QuestEvent::QuestCompleted {
            quest_id: completion.quest_id.clone(),
            exp: completion.exp,
            total_exp: completion.total_exp,
        }.emit();

        if completion.leveled_up() {
            QuestEvent::LevelUp {
                previous_level: completion.previous_level,
                level: completion.level,
            }.emit();
        }

        Some(completion)
    }

    // === Views ===
    pub fn get_quests(&self) -> Vec<Quest> {
        Self::open_store().quests().to_vec()
    }

    pub fn get_active_quests(&self) -> Vec<Quest> {
        Self::open_store().active_quests().into_iter().cloned().collect()
    }

    pub fn get_completed_quests(&self) -> Vec<Quest> {
        Self::open_store().completed_quests().into_iter().cloned().collect()
    }

    pub fn get_progress(&self) -> ProgressView {
        Self::open_store().progress()
    }
}
