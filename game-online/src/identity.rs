use async_trait::async_trait;
use game_persistence::repositories::PreferencesRepository;

use crate::errors::RoomError;

/// Supplies the stable per-device player id used in rooms.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn player_id(&self) -> Result<String, RoomError>;
}

/// Fixed id, mostly for tests and simulations.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn player_id(&self) -> Result<String, RoomError> {
        if self.0.trim().is_empty() {
            return Err(RoomError::Identity("empty player id".to_string()));
        }
        Ok(self.0.clone())
    }
}

#[async_trait]
impl IdentityProvider for PreferencesRepository {
    async fn player_id(&self) -> Result<String, RoomError> {
        self.device_id()
            .await
            .map_err(|e| RoomError::Identity(e.to_string()))
    }
}
