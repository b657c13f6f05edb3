use game_types::Language;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_players_per_room: usize,
    pub min_players_to_start: usize,
    pub room_ttl_hours: u64,
    pub room_code_length: usize,
    pub room_code_attempts: u32,
    pub default_language: Language,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}: {:?}, using the default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let defaults = Self::defaults();
        Self {
            max_players_per_room: env_or(
                "IMPOSTOR_MAX_PLAYERS_PER_ROOM",
                defaults.max_players_per_room,
            ),
            min_players_to_start: env_or(
                "IMPOSTOR_MIN_PLAYERS_TO_START",
                defaults.min_players_to_start,
            ),
            room_ttl_hours: env_or("IMPOSTOR_ROOM_TTL_HOURS", defaults.room_ttl_hours),
            room_code_length: env_or("IMPOSTOR_ROOM_CODE_LENGTH", defaults.room_code_length),
            room_code_attempts: env_or("IMPOSTOR_ROOM_CODE_ATTEMPTS", defaults.room_code_attempts),
            default_language: env_or("IMPOSTOR_DEFAULT_LANGUAGE", defaults.default_language),
        }
    }

    /// Built-in values, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            max_players_per_room: 20,
            min_players_to_start: 3,
            room_ttl_hours: 24,
            room_code_length: 6,
            room_code_attempts: 5,
            default_language: Language::En,
        }
    }

    pub fn room_ttl(&self) -> Duration {
        Duration::from_secs(self.room_ttl_hours * 60 * 60)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.max_players_per_room, 20);
        assert_eq!(config.min_players_to_start, 3);
        assert_eq!(config.room_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.default_language, Language::En);
    }

    #[test]
    fn test_env_or_uses_default_when_unset() {
        assert_eq!(env_or("IMPOSTOR_TEST_UNSET_VARIABLE", 7u32), 7);
    }
}
