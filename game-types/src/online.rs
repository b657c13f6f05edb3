use crate::{
    Avatar, CategoryId, CustomCategory, DEFAULT_CATEGORIES, Language, PlayerId, PlayerRole,
    Winner, Word,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Voting,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OnlinePlayer {
    pub id: PlayerId,
    pub name: String,
    #[ts(type = "string")]
    pub avatar: Avatar,
    pub is_host: bool,
    pub is_ready: bool,
    pub score: i32,
    #[serde(default)]
    pub is_eliminated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PlayerRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<PlayerId>,
}

impl OnlinePlayer {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        avatar: Avatar,
        is_host: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar,
            is_host,
            is_ready: true,
            score: 0,
            is_eliminated: false,
            role: None,
            vote: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoomSettings {
    pub impostor_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_duration: Option<u32>,
    pub language: Language,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub custom_categories: Vec<CustomCategory>,
    /// Copied from the host's entitlement when the room is created.
    #[serde(default)]
    pub is_premium_room: bool,
}

fn default_categories() -> Vec<CategoryId> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// Partial settings update sent by the host. `None` fields are left untouched;
/// `game_duration: Some(None)` switches to unlimited time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoomSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impostor_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_duration: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_categories: Option<Vec<CustomCategory>>,
}

/// The shared `rooms/{code}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OnlineRoom {
    pub id: String,
    pub host_id: PlayerId,
    pub status: RoomStatus,
    #[serde(default)]
    pub players: HashMap<PlayerId, OnlinePlayer>,
    pub settings: RoomSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_word: Option<Word>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub current_impostors: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    /// Epoch milliseconds.
    #[ts(type = "number")]
    pub created_at: i64,
}

impl OnlineRoom {
    /// Players sorted by id so iteration order does not depend on the map.
    pub fn roster(&self) -> Vec<&OnlinePlayer> {
        let mut players: Vec<&OnlinePlayer> = self.players.values().collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }
}

/// Per-device view of the online session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OnlineGameState {
    pub room_code: Option<String>,
    pub player_id: Option<PlayerId>,
    pub is_host: bool,
    pub room: Option<OnlineRoom>,
    pub error: Option<String>,
}
