use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    CategoryId, CustomCategory, DifficultyFilter, GamePhase, Language, PlayerId, SavedPreferences,
};

/// Action vocabulary of the classic (single device) game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum GameAction {
    AddPlayer(String),
    RemovePlayer(PlayerId),
    #[serde(rename_all = "camelCase")]
    RenamePlayer { player_id: PlayerId, name: String },
    ToggleCategory(CategoryId),
    SetImpostorCount(u32),
    SetGameDuration(Option<u32>),
    SetDifficulty(DifficultyFilter),
    SetLanguage(Language),
    ToggleMusic(bool),
    ToggleSounds(bool),
    SetImpostorHint(bool),
    StartGame,
    LoadNewWord,
    MarkPlayerSeenWord(PlayerId),
    #[serde(rename_all = "camelCase")]
    SubmitClue { player_id: PlayerId, clue: String },
    SetGamePhase(GamePhase),
    #[serde(rename_all = "camelCase")]
    SubmitVote { player_id: PlayerId, voted_for: PlayerId },
    EliminatePlayer(PlayerId),
    ResolveVote(PlayerId),
    RevealResults,
    NextRound,
    ResetGame,
    SetHasLoaded,
    SetPremium(bool),
    AddCustomCategory(CustomCategory),
    EditCustomCategory(CustomCategory),
    DeleteCustomCategory(CategoryId),
    SetGamesPlayed(u32),
    IncrementGamesPlayed,
    ResetGamesPlayed,
    LoadPreferences(SavedPreferences),
}

impl GameAction {
    /// Actions that touch the values owned by the persistence collaborator.
    pub fn touches_preferences(&self) -> bool {
        matches!(
            self,
            GameAction::StartGame
                | GameAction::AddCustomCategory(_)
                | GameAction::EditCustomCategory(_)
                | GameAction::DeleteCustomCategory(_)
                | GameAction::SetGamesPlayed(_)
                | GameAction::IncrementGamesPlayed
                | GameAction::ResetGamesPlayed
        )
    }
}
