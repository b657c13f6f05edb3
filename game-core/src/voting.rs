use crate::rules::{self, VoteTally};
use game_types::{GamePhase, GameState};
use tracing::{debug, info};

fn is_active(state: &GameState, player_id: &str) -> bool {
    state.player(player_id).is_some_and(|p| !p.is_eliminated)
}

/// Record `voter`'s vote. Only active players can vote, only for another
/// active player, and only while the round is in the voting phase.
pub fn submit_vote(mut state: GameState, voter: &str, target: &str) -> GameState {
    if state.game_phase != GamePhase::Voting {
        debug!("Vote from {} outside of voting phase", voter);
        return state;
    }
    if voter == target || !is_active(&state, voter) || !is_active(&state, target) {
        debug!("Rejected vote {} -> {}", voter, target);
        return state;
    }

    state.votes.insert(voter.to_string(), target.to_string());
    if let Some(player) = state.player_mut(voter) {
        player.voted_for = Some(target.to_string());
    }
    state
}

/// Eliminate `target` and decide whether the round is over.
///
/// The outcome is kept in `last_vote`. A winner moves the round to results,
/// after which further votes are ignored.
pub fn resolve_vote(mut state: GameState, target: &str) -> GameState {
    if state.game_phase != GamePhase::Voting {
        debug!("Ignoring vote resolution during {:?}", state.game_phase);
        return state;
    }
    if !is_active(&state, target) {
        debug!("Cannot eliminate {}, not an active player", target);
        return state;
    }

    let Some(outcome) = rules::resolve_elimination(&state.settings.players, target) else {
        return state;
    };

    if let Some(player) = state.player_mut(target) {
        player.is_eliminated = true;
    }
    state.votes.clear();
    for player in &mut state.settings.players {
        player.voted_for = None;
    }

    info!(
        "Eliminated {} (impostor: {}), {} active players and {} impostors left",
        target, outcome.was_impostor, outcome.active_players, outcome.remaining_impostors
    );

    if let Some(winner) = outcome.winner {
        info!("Round {} won by {:?}", state.round_number, winner);
        state.winner = Some(winner);
        state.game_phase = GamePhase::Results;
    }
    state.last_vote = Some(outcome);
    state
}

/// Jump to results without a winner, e.g. when the group stops voting.
pub fn reveal_results(mut state: GameState) -> GameState {
    match state.game_phase {
        GamePhase::Voting | GamePhase::Discussion => {
            state.game_phase = GamePhase::Results;
            state
        }
        phase => {
            debug!("Ignoring results reveal during {:?}", phase);
            state
        }
    }
}

/// Current count of the votes cast by active players.
pub fn vote_tally(state: &GameState) -> VoteTally {
    let eligible: Vec<&str> = state
        .settings
        .players
        .iter()
        .filter(|p| !p.is_eliminated)
        .map(|p| p.id.as_str())
        .collect();
    rules::tally_votes(
        state.votes.iter().map(|(voter, target)| (voter.as_str(), target.as_str())),
        &eligible,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::{Avatar, Player, PlayerRole, Winner};

    fn voting_state(roles: &[PlayerRole]) -> GameState {
        let mut state = GameState::default();
        for (i, role) in roles.iter().enumerate() {
            let mut player = Player::new(format!("P{}", i), Avatar::clamped(i as u8 + 1));
            player.id = format!("p{}", i);
            player.role = *role;
            state.settings.players.push(player);
        }
        state.current_impostors = state
            .settings
            .players
            .iter()
            .filter(|p| p.is_impostor())
            .map(|p| p.id.clone())
            .collect();
        state.game_phase = GamePhase::Voting;
        state
    }

    use PlayerRole::{Civilian as C, Impostor as I};

    #[test]
    fn test_votes_only_between_active_players() {
        let state = voting_state(&[C, C, I]);
        let state = submit_vote(state, "p0", "p2");
        let state = submit_vote(state, "p1", "p1");
        let state = submit_vote(state, "p1", "ghost");
        assert_eq!(state.votes.len(), 1);
        assert_eq!(state.player("p0").unwrap().voted_for.as_deref(), Some("p2"));

        let tally = vote_tally(&state);
        assert_eq!(tally.leader.as_deref(), Some("p2"));
        assert!(!tally.all_voted);
    }

    #[test]
    fn test_eliminating_the_impostor_ends_the_round() {
        let state = voting_state(&[C, C, I]);
        let state = resolve_vote(state, "p2");

        assert_eq!(state.game_phase, GamePhase::Results);
        assert_eq!(state.winner, Some(Winner::Civilians));
        let outcome = state.last_vote.as_ref().unwrap();
        assert!(outcome.was_impostor);
        assert_eq!(outcome.remaining_impostors, 0);
    }

    #[test]
    fn test_eliminating_a_civilian_with_three_left_hands_impostors_the_win() {
        let state = voting_state(&[C, C, I]);
        let state = resolve_vote(state, "p0");

        assert_eq!(state.winner, Some(Winner::Impostors));
        assert_eq!(state.last_vote.as_ref().unwrap().active_players, 2);
    }

    #[test]
    fn test_round_continues_until_someone_wins() {
        let state = voting_state(&[C, C, C, I, I]);
        let state = resolve_vote(state, "p3");
        assert_eq!(state.game_phase, GamePhase::Voting);
        assert_eq!(state.winner, None);
        assert_eq!(state.last_vote.as_ref().unwrap().remaining_impostors, 1);

        // Eliminated players are out of the vote.
        let state = resolve_vote(state, "p3");
        assert_eq!(state.last_vote.as_ref().unwrap().eliminated, "p3");
        let state = submit_vote(state, "p3", "p0");
        assert!(state.votes.is_empty());

        let state = resolve_vote(state, "p4");
        assert_eq!(state.winner, Some(Winner::Civilians));
    }

    #[test]
    fn test_results_are_reached_once() {
        let state = voting_state(&[C, C, I]);
        let state = resolve_vote(state, "p2");
        let finished = state.clone();

        let state = resolve_vote(state, "p0");
        assert_eq!(state, finished);
    }

    #[test]
    fn test_reveal_results_escape_hatch() {
        let state = voting_state(&[C, C, I]);
        let state = reveal_results(state);
        assert_eq!(state.game_phase, GamePhase::Results);
        assert_eq!(state.winner, None);

        let mut setup = GameState::default();
        setup = reveal_results(setup);
        assert_eq!(setup.game_phase, GamePhase::Setup);
    }
}
