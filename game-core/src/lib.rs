pub mod avatars;
pub mod entitlements;
pub mod game_events;
pub mod game_state;
pub mod rules;
pub mod store;
pub mod timer;
pub mod validation;
pub mod voting;
pub mod word_bank;

// Re-export main components
pub use avatars::*;
pub use entitlements::*;
pub use game_events::*;
pub use game_state::*;
pub use store::*;
pub use timer::*;
pub use validation::*;
pub use voting::*;
pub use word_bank::*;
