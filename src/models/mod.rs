pub mod config;
pub mod traits;
pub mod quest;
pub mod progress;

pub use config::*;

pub use quest::{Quest, QuestId, Difficulty, QuestState,
    QuestError, QuestValidationError, QuestStateError, TitleError};

pub use progress::{PlayerProgress, ProgressView, level_for};

pub use traits::{Storable, StorageError, StorageMetrics};
