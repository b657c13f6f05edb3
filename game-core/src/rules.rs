use game_types::{OnlinePlayer, Player, PlayerId, PlayerRole, VoteOutcome, Winner};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// A round needs at least this many active players to keep going.
pub const MIN_ACTIVE_PLAYERS: u32 = 3;

/// Round-level view of a player, shared by the classic roster and the
/// online room document.
pub trait Participant {
    fn id(&self) -> &str;
    fn role(&self) -> PlayerRole;
    fn set_role(&mut self, role: PlayerRole);
    fn is_eliminated(&self) -> bool;
    fn set_eliminated(&mut self, eliminated: bool);
    /// Clear everything that only lives for one round.
    fn prepare_for_round(&mut self);

    fn is_active_impostor(&self) -> bool {
        self.role() == PlayerRole::Impostor && !self.is_eliminated()
    }
}

impl Participant for Player {
    fn id(&self) -> &str {
        &self.id
    }

    fn role(&self) -> PlayerRole {
        self.role
    }

    fn set_role(&mut self, role: PlayerRole) {
        self.role = role;
    }

    fn is_eliminated(&self) -> bool {
        self.is_eliminated
    }

    fn set_eliminated(&mut self, eliminated: bool) {
        self.is_eliminated = eliminated;
    }

    fn prepare_for_round(&mut self) {
        self.has_seen_word = false;
        self.clue = None;
        self.voted_for = None;
        self.is_eliminated = false;
    }
}

impl Participant for OnlinePlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn role(&self) -> PlayerRole {
        self.role.unwrap_or_default()
    }

    fn set_role(&mut self, role: PlayerRole) {
        self.role = Some(role);
    }

    fn is_eliminated(&self) -> bool {
        self.is_eliminated
    }

    fn set_eliminated(&mut self, eliminated: bool) {
        self.is_eliminated = eliminated;
    }

    fn prepare_for_round(&mut self) {
        self.vote = None;
        self.is_eliminated = false;
    }
}

/// Largest impostor count the setup screen accepts for a roster size.
pub fn max_impostors(player_count: usize) -> u32 {
    (player_count.saturating_sub(1) as u32).max(1)
}

/// Uniformly pick `count` distinct ids. A count of zero yields nobody and a
/// count at or above the roster size yields everybody.
pub fn pick_impostors<R: Rng + ?Sized>(ids: &[PlayerId], count: u32, rng: &mut R) -> Vec<PlayerId> {
    let mut shuffled = ids.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count as usize);
    shuffled
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignment<P> {
    pub impostor_ids: Vec<PlayerId>,
    pub players: Vec<P>,
}

/// Deal roles for a new round and reset the per-round player fields.
pub fn assign_roles<P, R>(players: &[P], impostor_count: u32, rng: &mut R) -> RoleAssignment<P>
where
    P: Participant + Clone,
    R: Rng + ?Sized,
{
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id().to_string()).collect();
    let impostor_ids = pick_impostors(&ids, impostor_count, rng);

    let players = players
        .iter()
        .cloned()
        .map(|mut player| {
            let role = if impostor_ids.iter().any(|id| id == player.id()) {
                PlayerRole::Impostor
            } else {
                PlayerRole::Civilian
            };
            player.set_role(role);
            player.prepare_for_round();
            player
        })
        .collect();

    RoleAssignment { impostor_ids, players }
}

pub fn active_players<'a, P, I>(players: I) -> u32
where
    P: Participant + 'a,
    I: IntoIterator<Item = &'a P>,
{
    players.into_iter().filter(|p| !p.is_eliminated()).count() as u32
}

pub fn remaining_impostors<'a, P, I>(players: I) -> u32
where
    P: Participant + 'a,
    I: IntoIterator<Item = &'a P>,
{
    players.into_iter().filter(|p| p.is_active_impostor()).count() as u32
}

/// Judge the roster once `eliminated_id` is out. The eliminated player counts
/// as inactive whether or not its flag has been set yet.
///
/// Removing an impostor hands the win to the civilians once no impostor is
/// left. Removing a civilian hands it to the impostors once fewer than
/// [`MIN_ACTIVE_PLAYERS`] remain. Returns `None` if the id is not on the
/// roster.
pub fn resolve_elimination<'a, P, I>(players: I, eliminated_id: &str) -> Option<VoteOutcome>
where
    P: Participant + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let players: Vec<&P> = players.into_iter().collect();
    let eliminated = players.iter().find(|p| p.id() == eliminated_id)?;
    let was_impostor = eliminated.role() == PlayerRole::Impostor;

    let still_in = || {
        players
            .iter()
            .filter(move |p| p.id() != eliminated_id && !p.is_eliminated())
    };
    let active_players = still_in().count() as u32;
    let remaining_impostors = still_in()
        .filter(|p| p.role() == PlayerRole::Impostor)
        .count() as u32;

    let winner = if was_impostor {
        (remaining_impostors == 0).then_some(Winner::Civilians)
    } else {
        (active_players < MIN_ACTIVE_PLAYERS).then_some(Winner::Impostors)
    };

    Some(VoteOutcome {
        eliminated: eliminated_id.to_string(),
        was_impostor,
        remaining_impostors,
        active_players,
        winner,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    pub counts: HashMap<PlayerId, u32>,
    /// Most voted target, only when nobody ties with it.
    pub leader: Option<PlayerId>,
    pub all_voted: bool,
}

/// Count `(voter, target)` pairs cast by `eligible` voters.
pub fn tally_votes<'a, I>(votes: I, eligible: &[&str]) -> VoteTally
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    let mut voters = 0;

    for (voter, target) in votes {
        if !eligible.contains(&voter) {
            continue;
        }
        voters += 1;
        *counts.entry(target.to_string()).or_insert(0) += 1;
    }

    let top = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, count)| **count == top);
    let leader = match (leaders.next(), leaders.next()) {
        (Some((id, _)), None) => Some(id.clone()),
        _ => None,
    };

    VoteTally {
        counts,
        leader,
        all_voted: !eligible.is_empty() && voters >= eligible.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::Avatar;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roster(names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut player = Player::new(*name, Avatar::clamped(i as u8 + 1));
                player.id = name.to_lowercase();
                player
            })
            .collect()
    }

    #[test]
    fn test_pick_impostors_clamps_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let ids: Vec<PlayerId> = vec!["a".into(), "b".into(), "c".into()];

        assert!(pick_impostors(&ids, 0, &mut rng).is_empty());
        assert_eq!(pick_impostors(&ids, 2, &mut rng).len(), 2);

        let mut all = pick_impostors(&ids, 10, &mut rng);
        all.sort();
        assert_eq!(all, ids);
    }

    #[test]
    fn test_pick_impostors_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let ids: Vec<PlayerId> = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let mut hits: HashMap<PlayerId, u32> = HashMap::new();

        for _ in 0..4000 {
            for id in pick_impostors(&ids, 1, &mut rng) {
                *hits.entry(id).or_insert(0) += 1;
            }
        }

        for id in &ids {
            let count = hits.get(id).copied().unwrap_or(0);
            assert!((800..1200).contains(&count), "{} picked {} times", id, count);
        }
    }

    #[test]
    fn test_assign_roles_resets_round_fields() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut players = roster(&["Ana", "Ben", "Caro", "Dani"]);
        players[0].has_seen_word = true;
        players[1].is_eliminated = true;
        players[2].voted_for = Some("ana".into());

        let assignment = assign_roles(&players, 2, &mut rng);
        assert_eq!(assignment.impostor_ids.len(), 2);
        assert_eq!(
            assignment.players.iter().filter(|p| p.is_impostor()).count(),
            2
        );
        for player in &assignment.players {
            assert!(!player.has_seen_word);
            assert!(!player.is_eliminated);
            assert!(player.voted_for.is_none());
            assert_eq!(
                player.is_impostor(),
                assignment.impostor_ids.contains(&player.id)
            );
        }
    }

    #[test]
    fn test_online_players_get_explicit_roles() {
        let mut rng = StdRng::seed_from_u64(8);
        let players: Vec<OnlinePlayer> = ["h", "p1", "p2"]
            .iter()
            .map(|id| {
                let mut p = OnlinePlayer::new(*id, *id, Avatar::clamped(1), *id == "h");
                p.vote = Some("h".into());
                p.is_eliminated = true;
                p
            })
            .collect();

        let assignment = assign_roles(&players, 1, &mut rng);
        for player in &assignment.players {
            assert!(player.role.is_some());
            assert!(player.vote.is_none());
            assert!(!player.is_eliminated);
        }
    }

    #[test]
    fn test_eliminating_last_impostor_wins_for_civilians() {
        let mut players = roster(&["Ana", "Ben", "Caro"]);
        players[1].role = PlayerRole::Impostor;

        let outcome = resolve_elimination(&players, "ben").unwrap();
        assert!(outcome.was_impostor);
        assert_eq!(outcome.remaining_impostors, 0);
        assert_eq!(outcome.active_players, 2);
        assert_eq!(outcome.winner, Some(Winner::Civilians));
    }

    #[test]
    fn test_eliminating_civilian_below_minimum_wins_for_impostors() {
        let mut players = roster(&["Ana", "Ben", "Caro"]);
        players[1].role = PlayerRole::Impostor;

        let outcome = resolve_elimination(&players, "ana").unwrap();
        assert!(!outcome.was_impostor);
        assert_eq!(outcome.active_players, 2);
        assert_eq!(outcome.winner, Some(Winner::Impostors));
    }

    #[test]
    fn test_game_continues_when_nobody_wins() {
        let mut players = roster(&["Ana", "Ben", "Caro", "Dani", "Eva"]);
        players[0].role = PlayerRole::Impostor;
        players[1].role = PlayerRole::Impostor;

        let outcome = resolve_elimination(&players, "ana").unwrap();
        assert_eq!(outcome.remaining_impostors, 1);
        assert_eq!(outcome.winner, None);

        let outcome = resolve_elimination(&players, "caro").unwrap();
        assert_eq!(outcome.active_players, 4);
        assert_eq!(outcome.winner, None);

        assert!(resolve_elimination(&players, "nobody").is_none());
    }

    #[test]
    fn test_tally_votes() {
        let eligible = ["a", "b", "c"];
        let tally = tally_votes([("a", "c"), ("b", "c"), ("x", "a")], &eligible);
        assert_eq!(tally.counts.get("c"), Some(&2));
        assert_eq!(tally.counts.get("a"), None);
        assert_eq!(tally.leader.as_deref(), Some("c"));
        assert!(!tally.all_voted);

        let tally = tally_votes([("a", "b"), ("b", "a"), ("c", "c")], &eligible);
        assert_eq!(tally.leader, None);
        assert!(tally.all_voted);
    }

    #[test]
    fn test_max_impostors() {
        assert_eq!(max_impostors(0), 1);
        assert_eq!(max_impostors(2), 1);
        assert_eq!(max_impostors(5), 4);
    }
}
