//! Key-value document store shared by every device in a room.
//!
//! Paths are `/`-separated (`rooms/X7K9QA/players/abc`). Writing `null`
//! deletes, and empty objects never exist in the tree.

pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

pub use memory::MemoryRoomStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Push channel for one path. The current value arrives first, then one
/// message per change; `None` means the path holds nothing.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub path: String,
    pub updates: mpsc::UnboundedReceiver<Option<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactOutcome {
    /// Store this value. `Value::Null` deletes the path.
    Commit(Value),
    Abort,
}

pub type Transaction = Box<dyn FnOnce(Option<Value>) -> TransactOutcome + Send>;

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merge `patch` under `path`. Keys may span several segments
    /// (`players/abc/vote`) and `null` values delete.
    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError>;

    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;

    async fn unsubscribe(&self, id: SubscriptionId);

    /// Atomic read-modify-write of one path. Returns whether it committed.
    async fn transact(&self, path: &str, transaction: Transaction) -> Result<bool, StoreError>;
}

pub fn room_path(code: &str) -> String {
    format!("rooms/{}", code)
}

pub(crate) fn parse_path(path: &str) -> Result<Vec<String>, StoreError> {
    let segments: Vec<String> = path.split('/').map(str::to_string).collect();
    if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        assert_eq!(
            parse_path("rooms/ABC/players").unwrap(),
            vec!["rooms", "ABC", "players"]
        );
        assert!(parse_path("").is_err());
        assert!(parse_path("rooms//players").is_err());
        assert!(parse_path("/rooms").is_err());
    }
}
