use near_sdk::near;

use crate::models::{Difficulty, QuestId};

/// NEP-297 events logged as `EVENT_JSON:` lines.
#[near(event_json(standard = "quest-tracker"))]
pub enum QuestEvent {
    #[event_version("1.0.0")]
    QuestAdded { quest_id: QuestId, difficulty: Difficulty, exp: u32 },

    #[event_version("1.0.0")]
    QuestCompleted { quest_id: QuestId, exp: u32, total_exp: u32 },

    #[event_version("1.0.0")]
    LevelUp { previous_level: u32, level: u32 },
}
