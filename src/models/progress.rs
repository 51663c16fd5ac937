use schemars::JsonSchema;
use near_sdk::serde::{Deserialize, Serialize};

use crate::models::config::exp::PER_LEVEL;

/// Level reached with `total_exp` experience: one level per 100 exp, starting at 1.
pub fn level_for(total_exp: u32) -> u32 {
    total_exp / PER_LEVEL + 1
}

/// Cumulative experience of the player. The level is always derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerProgress {
    total_exp: u32,
}

impl PlayerProgress {
    pub fn new(total_exp: u32) -> Self {
        Self { total_exp }
    }

    pub fn total_exp(&self) -> u32 {
        self.total_exp
    }

    pub fn level(&self) -> u32 {
        level_for(self.total_exp)
    }

    pub fn exp_to_next_level(&self) -> u32 {
        PER_LEVEL - self.total_exp % PER_LEVEL
    }

    pub fn progress_fraction(&self) -> f64 {
        (self.total_exp % PER_LEVEL) as f64 / PER_LEVEL as f64
    }

    /// Adds `exp` and returns the level before and after.
    pub fn credit(&mut self, exp: u32) -> (u32, u32) {
        let previous_level = self.level();
        self.total_exp = self.total_exp.saturating_add(exp);
        (previous_level, self.level())
    }

    pub fn view(&self) -> ProgressView {
        ProgressView {
            level: self.level(),
            total_exp: self.total_exp,
            exp_to_next_level: self.exp_to_next_level(),
            progress_fraction: self.progress_fraction(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct ProgressView {
    pub level: u32,
    pub total_exp: u32,
    pub exp_to_next_level: u32,
    pub progress_fraction: f64,
}
