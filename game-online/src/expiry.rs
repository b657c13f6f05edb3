use game_types::OnlineRoom;
use std::time::Duration;

use crate::config::Config;

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Rooms are never swept in the background; a stale room is deleted by the
/// next player who tries to join it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomExpiry {
    pub ttl: Duration,
}

impl Default for RoomExpiry {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RoomExpiry {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.room_ttl())
    }

    pub fn age(&self, room: &OnlineRoom, now_millis: i64) -> Duration {
        let elapsed = now_millis.saturating_sub(room.created_at).max(0);
        Duration::from_millis(elapsed as u64)
    }

    pub fn is_expired(&self, room: &OnlineRoom, now_millis: i64) -> bool {
        self.age(room, now_millis) > self.ttl
    }
}
