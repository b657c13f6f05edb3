use crate::{CategoryId, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

pub const TOTAL_AVATARS: u8 = 20;

pub const DEFAULT_CATEGORIES: [&str; 3] =
    ["personajes_biblicos", "libros_biblicos", "objetos_biblicos"];

pub const DEFAULT_GAME_DURATION_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GameMode {
    Classic,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GamePhase {
    Setup,
    Reveal,
    Discussion,
    Voting,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PlayerRole {
    #[default]
    Civilian,
    Impostor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Language {
    Es,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

/// Difficulty selection in the settings; `All` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    pub fn accepts(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Easy => difficulty == Difficulty::Easy,
            DifficultyFilter::Medium => difficulty == Difficulty::Medium,
            DifficultyFilter::Hard => difficulty == Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Winner {
    Civilians,
    Impostors,
}

/// Avatar key, serialized as `avatar_<n>` with `n` in `1..=TOTAL_AVATARS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Avatar(u8);

impl Avatar {
    pub fn new(index: u8) -> Option<Self> {
        (1..=TOTAL_AVATARS).contains(&index).then_some(Self(index))
    }

    pub fn clamped(index: u8) -> Self {
        Self(index.clamp(1, TOTAL_AVATARS))
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Avatar> {
        (1..=TOTAL_AVATARS).map(Avatar)
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "avatar_{}", self.0)
    }
}

impl From<Avatar> for String {
    fn from(avatar: Avatar) -> Self {
        avatar.to_string()
    }
}

impl TryFrom<String> for Avatar {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("avatar_")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Avatar::new)
            .ok_or_else(|| format!("Invalid avatar key: {}", value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: PlayerRole,
    pub score: i32,
    pub has_seen_word: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_for: Option<PlayerId>,
    #[ts(type = "string")]
    pub avatar: Avatar,
    #[serde(default)]
    pub is_eliminated: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, avatar: Avatar) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            role: PlayerRole::Civilian,
            score: 0,
            has_seen_word: false,
            clue: None,
            voted_for: None,
            avatar,
            is_eliminated: false,
        }
    }

    pub fn is_impostor(&self) -> bool {
        self.role == PlayerRole::Impostor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Word {
    pub id: String,
    pub word: String,
    pub category: CategoryId,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impostor_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CategoryType {
    #[default]
    Biblical,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomCategory {
    pub id: CategoryId,
    pub name: String,
    pub words: Vec<String>,
    pub language: Language,
    // Older saves have no type; they were all biblical.
    #[serde(default, rename = "type")]
    pub category_type: CategoryType,
}

impl CustomCategory {
    pub fn new(
        name: impl Into<String>,
        words: Vec<String>,
        language: Language,
        category_type: CategoryType,
    ) -> Self {
        Self {
            id: format!("custom_{}", Uuid::new_v4().simple()),
            name: name.into(),
            words,
            language,
            category_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameSettings {
    pub mode: GameMode,
    pub players: Vec<Player>,
    pub selected_categories: Vec<CategoryId>,
    pub impostor_count: u32,
    /// Discussion length in seconds; `None` means unlimited.
    pub game_duration: Option<u32>,
    pub music_enabled: bool,
    pub sounds_enabled: bool,
    pub language: Language,
    #[serde(default)]
    pub difficulty: DifficultyFilter,
    #[serde(default)]
    pub impostor_hint: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            players: Vec::new(),
            selected_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            impostor_count: 1,
            game_duration: Some(DEFAULT_GAME_DURATION_SECS),
            music_enabled: true,
            sounds_enabled: true,
            language: Language::Es,
            difficulty: DifficultyFilter::All,
            impostor_hint: false,
        }
    }
}

/// Result of one elimination vote in classic mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VoteOutcome {
    pub eliminated: PlayerId,
    pub was_impostor: bool,
    pub remaining_impostors: u32,
    pub active_players: u32,
    pub winner: Option<Winner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameState {
    pub settings: GameSettings,
    pub current_word: Option<Word>,
    /// First entry of `current_impostors`, kept for older clients.
    pub current_impostor: Option<PlayerId>,
    pub current_impostors: Vec<PlayerId>,
    pub game_phase: GamePhase,
    pub round_number: u32,
    pub votes: HashMap<PlayerId, PlayerId>,
    pub has_loaded: bool,
    pub custom_categories: Vec<CustomCategory>,
    pub games_played: u32,
    pub is_premium: bool,
    #[serde(default)]
    pub winner: Option<Winner>,
    #[serde(default)]
    pub last_vote: Option<VoteOutcome>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            settings: GameSettings::default(),
            current_word: None,
            current_impostor: None,
            current_impostors: Vec::new(),
            game_phase: GamePhase::Setup,
            round_number: 1,
            votes: HashMap::new(),
            has_loaded: false,
            custom_categories: Vec::new(),
            games_played: 0,
            is_premium: false,
            winner: None,
            last_vote: None,
        }
    }
}

impl GameState {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.settings.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.settings.players.iter_mut().find(|p| p.id == player_id)
    }
}

/// Durable values owned by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SavedPreferences {
    pub custom_categories: Vec<CustomCategory>,
    pub games_played: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_serialization() {
        let avatar = Avatar::new(7).unwrap();
        let json = serde_json::to_string(&avatar).unwrap();
        assert_eq!(json, "\"avatar_7\"");

        let parsed: Avatar = serde_json::from_str("\"avatar_20\"").unwrap();
        assert_eq!(parsed.index(), 20);

        assert!(serde_json::from_str::<Avatar>("\"avatar_21\"").is_err());
        assert!(serde_json::from_str::<Avatar>("\"avatar_0\"").is_err());
        assert!(serde_json::from_str::<Avatar>("\"cat\"").is_err());
    }

    #[test]
    fn test_default_state() {
        let state = GameState::default();
        assert_eq!(state.round_number, 1);
        assert_eq!(state.game_phase, GamePhase::Setup);
        assert_eq!(state.settings.selected_categories.len(), 3);
        assert_eq!(state.settings.game_duration, Some(300));
        assert_eq!(state.settings.language, Language::Es);
    }

    #[test]
    fn test_player_wire_shape() {
        let player = Player::new("Ana", Avatar::new(3).unwrap());
        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["hasSeenWord"], false);
        assert_eq!(value["avatar"], "avatar_3");
        assert_eq!(value["role"], "civilian");
        assert!(value.get("clue").is_none());
    }

    #[test]
    fn test_custom_category_without_type_is_biblical() {
        let json = r#"{"id":"c1","name":"Frutas","words":["a","b","c"],"language":"es"}"#;
        let category: CustomCategory = serde_json::from_str(json).unwrap();
        assert_eq!(category.category_type, CategoryType::Biblical);
    }
}
