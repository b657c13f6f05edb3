pub mod client;
pub mod config;
pub mod errors;
pub mod expiry;
pub mod identity;
pub mod room_code;
pub mod store;
pub mod sync;

pub use client::{ROOM_CLOSED, RoomClient};
pub use config::Config;
pub use errors::RoomError;
pub use identity::{IdentityProvider, StaticIdentity};
pub use store::{MemoryRoomStore, RoomStore, StoreError};
