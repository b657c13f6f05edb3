use crate::store::StoreError;
use game_types::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    NotFound,
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Room full, at most {max} players")]
    RoomFull { max: usize },
    #[error("Not in a room")]
    NotInRoom,
    #[error("No free room code after {attempts} attempts")]
    NoFreeCode { attempts: u32 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Malformed room document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No player id: {0}")]
    Identity(String),
}

impl RoomError {
    /// Failures worth retrying once the connection is back.
    pub fn is_transient(&self) -> bool {
        matches!(self, RoomError::Store(StoreError::Unavailable(_)))
    }
}
