use crate::avatars::next_avatar;
use crate::rules::{self, Participant};
use crate::voting;
use crate::word_bank::{WordRequest, select_word};
use game_types::{
    CategoryId, DEFAULT_CATEGORIES, GameAction, GamePhase, GameSettings, GameState, Language,
    Player, PlayerId, PlayerRole, Word,
};
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

static ENGLISH_DEFAULT_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Player (\d+)$").ok());
static SPANISH_DEFAULT_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Jugador (\d+)$").ok());

/// Placeholder name offered for the `number`-th player.
pub fn default_player_name(language: Language, number: usize) -> String {
    match language {
        Language::Es => format!("Jugador {}", number),
        Language::En => format!("Player {}", number),
    }
}

/// Translate a placeholder name into `language`. Anything the user typed
/// is returned untouched.
pub fn translate_default_name(name: &str, language: Language) -> Option<String> {
    let source: &Option<Regex> = match language {
        Language::Es => &ENGLISH_DEFAULT_NAME,
        Language::En => &SPANISH_DEFAULT_NAME,
    };
    let captures = source.as_ref()?.captures(name)?;
    let number: usize = captures.get(1)?.as_str().parse().ok()?;
    Some(default_player_name(language, number))
}

/// Apply one action to the classic game state.
///
/// Never fails: actions that do not make sense in the current phase leave
/// the state as it was.
pub fn reduce<R: Rng + ?Sized>(state: GameState, action: GameAction, rng: &mut R) -> GameState {
    let mut state = state;

    match action {
        GameAction::AddPlayer(name) => {
            let name = name.trim();
            if name.is_empty() {
                debug!("Ignoring player with an empty name");
                return state;
            }
            let avatar = next_avatar(state.settings.players.iter().map(|p| &p.avatar), rng);
            state.settings.players.push(Player::new(name, avatar));
        }
        GameAction::RemovePlayer(player_id) => {
            if state.game_phase != GamePhase::Setup {
                debug!("Ignoring removal of {} during {:?}", player_id, state.game_phase);
                return state;
            }
            state.settings.players.retain(|p| p.id != player_id);
            let max = rules::max_impostors(state.settings.players.len());
            state.settings.impostor_count = state.settings.impostor_count.min(max);
        }
        GameAction::RenamePlayer { player_id, name } => {
            let name = name.trim();
            if name.is_empty() {
                return state;
            }
            if let Some(player) = state.player_mut(&player_id) {
                player.name = name.to_string();
            }
        }
        GameAction::ToggleCategory(category) => toggle_category(&mut state.settings, category),
        GameAction::SetImpostorCount(count) => state.settings.impostor_count = count,
        GameAction::SetGameDuration(duration) => state.settings.game_duration = duration,
        GameAction::SetDifficulty(difficulty) => state.settings.difficulty = difficulty,
        GameAction::SetLanguage(language) => {
            state.settings.language = language;
            for player in &mut state.settings.players {
                if let Some(name) = translate_default_name(&player.name, language) {
                    player.name = name;
                }
            }
        }
        GameAction::ToggleMusic(enabled) => state.settings.music_enabled = enabled,
        GameAction::ToggleSounds(enabled) => state.settings.sounds_enabled = enabled,
        GameAction::SetImpostorHint(enabled) => state.settings.impostor_hint = enabled,
        GameAction::StartGame => start_game(&mut state, rng),
        GameAction::LoadNewWord => {
            state.current_word = Some(draw_word(&state, rng));
        }
        GameAction::MarkPlayerSeenWord(player_id) => {
            if let Some(player) = state.player_mut(&player_id) {
                player.has_seen_word = true;
            }
        }
        GameAction::SubmitClue { player_id, clue } => {
            if let Some(player) = state.player_mut(&player_id) {
                player.clue = Some(clue);
            }
        }
        GameAction::SetGamePhase(phase) => {
            if state.game_phase == GamePhase::Results && phase != GamePhase::Setup {
                debug!("Round already finished, ignoring move to {:?}", phase);
                return state;
            }
            state.game_phase = phase;
        }
        GameAction::SubmitVote { player_id, voted_for } => {
            return voting::submit_vote(state, &player_id, &voted_for);
        }
        GameAction::EliminatePlayer(player_id) => {
            if state.game_phase != GamePhase::Voting {
                debug!("Ignoring elimination of {} during {:?}", player_id, state.game_phase);
                return state;
            }
            if let Some(player) = state.player_mut(&player_id) {
                player.is_eliminated = true;
            }
        }
        GameAction::ResolveVote(player_id) => return voting::resolve_vote(state, &player_id),
        GameAction::RevealResults => return voting::reveal_results(state),
        GameAction::NextRound => {
            for player in &mut state.settings.players {
                player.prepare_for_round();
            }
            state.votes.clear();
            state.winner = None;
            state.last_vote = None;
            state.round_number += 1;
            state.game_phase = GamePhase::Setup;
        }
        GameAction::ResetGame => reset_game(&mut state),
        GameAction::SetHasLoaded => state.has_loaded = true,
        GameAction::SetPremium(is_premium) => state.is_premium = is_premium,
        GameAction::AddCustomCategory(category) => {
            if state.custom_categories.iter().any(|c| c.id == category.id) {
                debug!("Custom category {} already exists", category.id);
                return state;
            }
            state.custom_categories.push(category);
        }
        GameAction::EditCustomCategory(category) => {
            if let Some(existing) = state
                .custom_categories
                .iter_mut()
                .find(|c| c.id == category.id)
            {
                *existing = category;
            }
        }
        GameAction::DeleteCustomCategory(category_id) => {
            state.custom_categories.retain(|c| c.id != category_id);
            let selected = &mut state.settings.selected_categories;
            selected.retain(|c| *c != category_id);
            if selected.is_empty() {
                *selected = default_selection();
            }
        }
        GameAction::SetGamesPlayed(count) => state.games_played = count,
        GameAction::IncrementGamesPlayed => state.games_played += 1,
        GameAction::ResetGamesPlayed => state.games_played = 0,
        GameAction::LoadPreferences(preferences) => {
            state.custom_categories = preferences.custom_categories;
            state.games_played = preferences.games_played;
        }
    }

    state
}

fn default_selection() -> Vec<CategoryId> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn toggle_category(settings: &mut GameSettings, category: CategoryId) {
    let selected = &mut settings.selected_categories;
    if let Some(index) = selected.iter().position(|c| *c == category) {
        if selected.len() <= 1 {
            debug!("Keeping {} selected, it is the last category", category);
            return;
        }
        selected.remove(index);
    } else {
        selected.push(category);
    }
}

fn draw_word<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Word {
    let request = WordRequest {
        categories: &state.settings.selected_categories,
        language: state.settings.language,
        custom_categories: &state.custom_categories,
        difficulty: state.settings.difficulty,
        premium_allowed: state.is_premium,
    };
    select_word(&request, rng)
}

fn start_game<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let assignment =
        rules::assign_roles(&state.settings.players, state.settings.impostor_count, rng);
    let word = draw_word(state, rng);

    info!(
        "Starting round {} with {} players and {} impostors, word from {}",
        state.round_number,
        assignment.players.len(),
        assignment.impostor_ids.len(),
        word.category
    );

    state.settings.players = assignment.players;
    state.current_impostor = assignment.impostor_ids.first().cloned();
    state.current_impostors = assignment.impostor_ids;
    state.current_word = Some(word);
    state.game_phase = GamePhase::Reveal;
    state.games_played += 1;
    state.votes.clear();
    state.winner = None;
    state.last_vote = None;
}

fn reset_game(state: &mut GameState) {
    let players = std::mem::take(&mut state.settings.players)
        .into_iter()
        .map(|mut player| {
            player.prepare_for_round();
            player.role = PlayerRole::Civilian;
            player.score = 0;
            player
        })
        .collect();

    state.settings = GameSettings {
        players,
        ..GameSettings::default()
    };
    state.current_word = None;
    state.current_impostor = None;
    state.current_impostors.clear();
    state.game_phase = GamePhase::Setup;
    state.round_number = 1;
    state.votes.clear();
    state.winner = None;
    state.last_vote = None;
}

/// What the reveal screen shows `player_id`: the word for civilians, the
/// optional impostor hint for impostors. `None` while no round is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealCard {
    Word(String),
    Impostor { hint: Option<String> },
}

pub fn reveal_card(state: &GameState, player_id: &str) -> Option<RevealCard> {
    let word = state.current_word.as_ref()?;
    let player = state.player(player_id)?;

    if player.is_impostor() {
        let hint = if state.settings.impostor_hint {
            word.impostor_hint.clone()
        } else {
            None
        };
        Some(RevealCard::Impostor { hint })
    } else {
        Some(RevealCard::Word(word.word.clone()))
    }
}

pub fn all_players_seen_word(state: &GameState) -> bool {
    state.settings.players.iter().all(|p| p.has_seen_word)
}

pub fn active_players(state: &GameState) -> Vec<&Player> {
    state.settings.players.iter().filter(|p| !p.is_eliminated).collect()
}

pub fn impostor_names(state: &GameState) -> Vec<String> {
    state
        .current_impostors
        .iter()
        .filter_map(|id| state.player(id))
        .map(|p| p.name.clone())
        .collect()
}

pub fn player_ids(state: &GameState) -> Vec<PlayerId> {
    state.settings.players.iter().map(|p| p.id.clone()).collect()
}
