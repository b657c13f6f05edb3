use crate::entitlements::EntitlementSource;
use crate::game_events::{GameEvent, GameEventBus, GameEventHandler};
use crate::game_state::reduce;
use game_types::{GameAction, GameState, SavedPreferences};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Owns the classic game state and is the single place actions go through.
///
/// Preferences are only reported for persistence once they have been
/// hydrated, so defaults never overwrite what is already saved.
pub struct GameStore {
    state: GameState,
    rng: StdRng,
    event_bus: GameEventBus,
    preferences_loaded: bool,
}

impl GameStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: GameState::default(),
            rng,
            event_bus: GameEventBus::new(),
            preferences_loaded: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler + Send>) {
        self.event_bus.add_handler(handler);
    }

    pub fn dispatch(&mut self, action: GameAction) -> &GameState {
        let touches_preferences = action.touches_preferences();
        let previous = std::mem::take(&mut self.state);
        let next = reduce(previous.clone(), action, &mut self.rng);

        let events = GameEvent::between(&previous, &next);
        let preferences_changed = touches_preferences
            && (previous.custom_categories != next.custom_categories
                || previous.games_played != next.games_played);
        self.state = next;

        for event in events {
            self.event_bus.publish(event);
        }
        if preferences_changed {
            if let Some(preferences) = self.preferences_to_persist() {
                self.event_bus
                    .publish(GameEvent::PreferencesChanged { preferences });
            }
        }

        &self.state
    }

    /// Load saved preferences once at boot and open the persistence gate.
    pub fn hydrate(&mut self, preferences: SavedPreferences) {
        info!(
            "Loaded {} custom categories, {} games played",
            preferences.custom_categories.len(),
            preferences.games_played
        );
        self.dispatch(GameAction::LoadPreferences(preferences));
        self.dispatch(GameAction::SetHasLoaded);
        self.preferences_loaded = true;
    }

    pub fn preferences_loaded(&self) -> bool {
        self.preferences_loaded
    }

    /// Values to write back, `None` until `hydrate` has run.
    pub fn preferences_to_persist(&self) -> Option<SavedPreferences> {
        if !self.preferences_loaded {
            return None;
        }
        Some(SavedPreferences {
            custom_categories: self.state.custom_categories.clone(),
            games_played: self.state.games_played,
        })
    }

    pub fn sync_entitlement(&mut self, source: &dyn EntitlementSource) {
        let is_premium = source.is_premium();
        if is_premium != self.state.is_premium {
            debug!("Entitlement changed, premium: {}", is_premium);
            self.dispatch(GameAction::SetPremium(is_premium));
        }
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
