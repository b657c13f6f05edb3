use std::time::{Duration, Instant};

/// Client-side discussion countdown. Time is passed in so callers (and
/// tests) decide what "now" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscussionTimer {
    duration: Option<Duration>,
    ends_at: Option<Instant>,
}

impl DiscussionTimer {
    /// `None` seconds means the discussion has no time limit.
    pub fn new(duration_secs: Option<u32>) -> Self {
        Self {
            duration: duration_secs.map(|secs| Duration::from_secs(u64::from(secs))),
            ends_at: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.ends_at = self.duration.map(|duration| now + duration);
    }

    /// Restart the full countdown when the group decides to keep talking.
    pub fn keep_discussing(&mut self, now: Instant) {
        self.start(now);
    }

    pub fn is_running(&self) -> bool {
        self.ends_at.is_some()
    }

    pub fn is_unlimited(&self) -> bool {
        self.duration.is_none()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match (self.duration, self.ends_at) {
            (None, _) => None,
            (Some(duration), None) => Some(duration),
            (Some(_), Some(end)) => Some(end.saturating_duration_since(now)),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.ends_at {
            Some(end) => now >= end,
            None => false,
        }
    }

    /// `m:ss`, or `--:--` without a limit.
    pub fn format_remaining(&self, now: Instant) -> String {
        match self.remaining(now) {
            Some(remaining) => format_clock(remaining),
            None => "--:--".to_string(),
        }
    }
}

pub fn format_clock(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
