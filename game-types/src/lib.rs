pub mod actions;
pub mod errors;
pub mod game;
pub mod online;

pub type PlayerId = String;
pub type CategoryId = String;

// Re-export all types
pub use actions::*;
pub use errors::*;
pub use game::*;
pub use online::*;
