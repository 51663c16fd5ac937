// === Experience Constants ===
pub mod exp {
    pub const EASY: u32 = 10;
    pub const MEDIUM: u32 = 20;
    pub const HARD: u32 = 30;
    pub const PER_LEVEL: u32 = 100;
}

// === Persisted Keys ===
pub mod keys {
    pub const QUESTS: &str = "quests";
    pub const PLAYER_LEVEL: &str = "playerLevel";
    pub const TOTAL_EXP: &str = "totalExp";
}

// === Storage Constants ===
pub mod storage {
    pub const SNAPSHOT_BASE_STORAGE: u64 = 128;
    pub const MAX_SNAPSHOT_BYTES: u64 = 512 * 1024;
}
