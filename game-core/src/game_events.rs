use game_types::{GamePhase, GameState, PlayerId, SavedPreferences, VoteOutcome, Winner};

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged {
        phase: GamePhase,
        round_number: u32,
    },
    RoundStarted {
        round_number: u32,
        impostors: Vec<PlayerId>,
    },
    PlayerEliminated {
        outcome: VoteOutcome,
    },
    RoundFinished {
        round_number: u32,
        winner: Option<Winner>,
    },
    PreferencesChanged {
        preferences: SavedPreferences,
    },
}

impl GameEvent {
    /// Events implied by a transition from `before` to `after`.
    pub fn between(before: &GameState, after: &GameState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if before == after {
            return events;
        }

        events.push(GameEvent::StateChanged {
            phase: after.game_phase,
            round_number: after.round_number,
        });

        if after.game_phase == GamePhase::Reveal && before.game_phase != GamePhase::Reveal {
            events.push(GameEvent::RoundStarted {
                round_number: after.round_number,
                impostors: after.current_impostors.clone(),
            });
        }

        if let Some(outcome) = &after.last_vote {
            if before.last_vote.as_ref() != Some(outcome) {
                events.push(GameEvent::PlayerEliminated {
                    outcome: outcome.clone(),
                });
            }
        }

        if after.game_phase == GamePhase::Results && before.game_phase != GamePhase::Results {
            events.push(GameEvent::RoundFinished {
                round_number: after.round_number,
                winner: after.winner,
            });
        }

        events
    }
}

/// Event handler trait for processing game events
pub trait GameEventHandler {
    fn handle_event(&mut self, event: GameEvent);
}

/// Simple event bus for distributing game events
pub struct GameEventBus {
    handlers: Vec<Box<dyn GameEventHandler + Send>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler + Send>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct TestHandler {
        events: Arc<Mutex<Vec<GameEvent>>>,
    }

    impl GameEventHandler for TestHandler {
        fn handle_event(&mut self, event: GameEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_event_bus() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut bus = GameEventBus::new();
        bus.add_handler(Box::new(TestHandler {
            events: events.clone(),
        }));

        bus.publish(GameEvent::RoundFinished {
            round_number: 1,
            winner: Some(Winner::Civilians),
        });

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_no_events_without_change() {
        let state = GameState::default();
        assert!(GameEvent::between(&state, &state.clone()).is_empty());
    }

    #[test]
    fn test_round_start_events() {
        let before = GameState::default();
        let mut after = before.clone();
        after.game_phase = GamePhase::Reveal;
        after.current_impostors = vec!["p1".to_string()];

        let events = GameEvent::between(&before, &after);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            GameEvent::RoundStarted { impostors, .. } if impostors == &vec!["p1".to_string()]
        ));
    }
}
