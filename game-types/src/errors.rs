use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Guard failures reported to the boundary before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum ValidationError {
    #[error("A player name is required")]
    EmptyName,
    #[error("At most {max} players can take part")]
    TooManyPlayers { max: u32 },
    #[error("At least {required} players are needed, got {actual}")]
    NotEnoughPlayers { required: u32, actual: u32 },
    #[error("Select at least one category")]
    NoCategorySelected,
    #[error("Impostor count {count} must be between 1 and {max}")]
    ImpostorCountOutOfRange { count: u32, max: u32 },
    #[error("A category name is required")]
    CategoryNameRequired,
    #[error("A category needs at least {min} words")]
    TooFewWords { min: u32 },
    #[error("Word '{word}' appears more than once")]
    DuplicateWord { word: String },
    #[error("Free users can create up to {max} custom categories")]
    CustomCategoryLimit { max: u32 },
    #[error("Cannot vote for that player")]
    InvalidVoteTarget,
}
