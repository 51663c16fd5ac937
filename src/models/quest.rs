use schemars::JsonSchema;
use near_sdk::{
    borsh::{self, BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize}};

use crate::models::config::exp;

pub type QuestId = String;

// === Core State and Action Enums ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize,
    Debug, PartialEq, Eq, Clone, Copy, JsonSchema)]
#[serde(crate = "near_sdk::serde", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn exp(self) -> u32 {
        match self {
            Difficulty::Easy => exp::EASY,
            Difficulty::Medium => exp::MEDIUM,
            Difficulty::Hard => exp::HARD,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub enum QuestState {
    Active,
    Completed,
}

// === Error Hierarchy ===
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum QuestError {
    Validation(QuestValidationError),
    State(QuestStateError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum QuestValidationError {
    Title {
        reason: TitleError,
        current_length: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum TitleError {
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum QuestStateError {
    InvalidTransition { from: QuestState, to: QuestState },
}

// === Core Data Structures ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize,
    Debug, Clone, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub completed: bool,
    pub difficulty: Difficulty,
    pub exp: u32,
}

// === Error Conversions ===
impl From<QuestValidationError> for QuestError {
    fn from(err: QuestValidationError) -> Self {
        QuestError::Validation(err)
    }
}

impl From<QuestStateError> for QuestError {
    fn from(err: QuestStateError) -> Self {
        QuestError::State(err)
    }
}

impl std::fmt::Display for QuestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(v) => write!(f, "Validation error: {}", v),
            Self::State(s) => write!(f, "State error: {}", s),
        }
    }
}

impl std::fmt::Display for QuestValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title { reason, current_length } => {
                write!(f, "Title validation error: {:?} (length: {})", reason, current_length)
            }
        }
    }
}

impl std::fmt::Display for QuestStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid transition from {:?} to {:?}", from, to)
            }
        }
    }
}

// === Core Implementations ===
impl Quest {
    /// Builds an active quest worth the fixed exp of `difficulty`.
    /// The title is kept as given; only its trimmed form must be non-empty.
    pub fn new(id: QuestId, title: &str, difficulty: Difficulty) -> Result<Self, QuestError> {
        let quest = Self {
            id,
            title: title.to_string(),
            completed: false,
            difficulty,
            exp: difficulty.exp(),
        };

        quest.validate_title()?;
        Ok(quest)
    }

    fn validate_title(&self) -> Result<(), QuestValidationError> {
        if self.title.trim().is_empty() {
            return Err(QuestValidationError::Title {
                reason: TitleError::Empty,
                current_length: self.title.len(),
            });
        }
        Ok(())
    }

    /// Whether a quest read back from storage could have been built by
    /// [`Quest::new`]: a non-blank title and the exp of its difficulty.
    pub fn is_well_formed(&self) -> bool {
        self.validate_title().is_ok() && self.exp == self.difficulty.exp()
    }

    pub fn state(&self) -> QuestState {
        if self.completed {
            QuestState::Completed
        } else {
            QuestState::Active
        }
    }

    pub fn transition_to(&mut self, new_state: QuestState) -> Result<(), QuestError> {
        match (self.state(), new_state) {
            (QuestState::Active, QuestState::Completed) => {
                self.completed = true;
                Ok(())
            },
            (from, to) => Err(QuestStateError::InvalidTransition { from, to }.into()),
        }
    }
}
