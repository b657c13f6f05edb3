//! Patches the host writes to the room document. Each builder is pure so it
//! can be computed before any await point.

use game_core::rules::{self, Participant};
use game_core::word_bank::{WordRequest, select_word};
use game_types::{DifficultyFilter, OnlinePlayer, OnlineRoom, PlayerId, RoomStatus, VoteOutcome};
use rand::Rng;
use serde_json::{Map, Value, json};

fn player_key(player_id: &str, field: &str) -> String {
    format!("players/{}/{}", player_id, field)
}

/// Deal roles and draw a word for a fresh round. Votes and eliminations from
/// the previous round are cleared.
pub fn start_round_patch<R: Rng + ?Sized>(
    room: &OnlineRoom,
    rng: &mut R,
) -> Result<Map<String, Value>, serde_json::Error> {
    let roster: Vec<OnlinePlayer> = room.roster().into_iter().cloned().collect();
    let assignment = rules::assign_roles(&roster, room.settings.impostor_count, rng);

    let request = WordRequest {
        categories: &room.settings.categories,
        language: room.settings.language,
        custom_categories: &room.settings.custom_categories,
        difficulty: DifficultyFilter::All,
        premium_allowed: room.settings.is_premium_room,
    };
    let word = select_word(&request, rng);

    let mut patch = Map::new();
    for player in &assignment.players {
        patch.insert(player_key(&player.id, "role"), serde_json::to_value(player.role())?);
        patch.insert(player_key(&player.id, "isEliminated"), Value::Bool(false));
        patch.insert(player_key(&player.id, "vote"), Value::Null);
    }
    patch.insert("currentWord".to_string(), serde_json::to_value(&word)?);
    patch.insert("currentImpostors".to_string(), json!(assignment.impostor_ids));
    patch.insert("status".to_string(), serde_json::to_value(RoomStatus::Playing)?);
    patch.insert("winner".to_string(), Value::Null);
    Ok(patch)
}

pub fn start_voting_patch() -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert("status".to_string(), json!("voting"));
    patch
}

pub fn vote_patch(voter: &str, target: &str) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(player_key(voter, "vote"), json!(target));
    patch
}

/// Back to discussion after a vote: everyone's vote is cleared.
pub fn resume_discussion_patch(room: &OnlineRoom) -> Map<String, Value> {
    let mut patch = Map::new();
    for id in room.players.keys() {
        patch.insert(player_key(id, "vote"), Value::Null);
    }
    patch.insert("status".to_string(), json!("playing"));
    patch
}

/// Eliminate `player_id` in place and settle the winner with the same rules
/// as the classic game. Votes are cleared; a winner finishes the room.
/// Returns `None` outside a vote, or if the player is not in the room or
/// already out.
pub fn apply_elimination(room: &mut OnlineRoom, player_id: &PlayerId) -> Option<VoteOutcome> {
    if room.status != RoomStatus::Voting {
        return None;
    }
    if room.players.get(player_id)?.is_eliminated() {
        return None;
    }
    let outcome = rules::resolve_elimination(room.players.values(), player_id)?;

    for player in room.players.values_mut() {
        player.vote = None;
        if player.id == *player_id {
            player.set_eliminated(true);
        }
    }
    if let Some(winner) = outcome.winner {
        room.status = RoomStatus::Finished;
        room.winner = Some(winner);
    }
    Some(outcome)
}
