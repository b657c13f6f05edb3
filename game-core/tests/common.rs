#![allow(dead_code)]

use game_core::{GameEvent, GameEventHandler, GameStore, reduce};
use game_types::{GameAction, GamePhase, GameState, PlayerId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

/// Builds a setup-phase state with the given players.
pub fn create_state_with_players(names: &[&str], rng: &mut StdRng) -> GameState {
    names.iter().fold(GameState::default(), |state, name| {
        reduce(state, GameAction::AddPlayer(name.to_string()), rng)
    })
}

/// Builds a store with hydrated preferences and the given players.
pub fn create_store_with_players(names: &[&str]) -> GameStore {
    let mut store = GameStore::with_seed(2024);
    store.hydrate(Default::default());
    for name in names {
        store.dispatch(GameAction::AddPlayer(name.to_string()));
    }
    store
}

/// Starts a round and walks it to the voting phase.
pub fn start_and_reach_voting(store: &mut GameStore) {
    store.dispatch(GameAction::StartGame);
    let ids: Vec<PlayerId> = store.state().settings.players.iter().map(|p| p.id.clone()).collect();
    for id in ids {
        store.dispatch(GameAction::MarkPlayerSeenWord(id));
    }
    store.dispatch(GameAction::SetGamePhase(GamePhase::Discussion));
    store.dispatch(GameAction::SetGamePhase(GamePhase::Voting));
}

pub fn civilians(state: &GameState) -> Vec<PlayerId> {
    state
        .settings
        .players
        .iter()
        .filter(|p| !p.is_impostor())
        .map(|p| p.id.clone())
        .collect()
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl GameEventHandler for EventCollector {
    fn handle_event(&mut self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}
