use crate::rules::max_impostors;
use game_types::{CustomCategory, GameSettings, ValidationError};
use std::collections::HashSet;

pub const MIN_PLAYERS: u32 = 3;
pub const MAX_PLAYERS: u32 = 20;
pub const MIN_CUSTOM_WORDS: u32 = 3;
pub const FREE_CUSTOM_CATEGORY_LIMIT: u32 = 1;

pub fn validate_player_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Check a name before it is added to a roster of `current_players`.
pub fn validate_new_player(name: &str, current_players: usize) -> Result<String, ValidationError> {
    let name = validate_player_name(name)?;
    if current_players as u32 >= MAX_PLAYERS {
        return Err(ValidationError::TooManyPlayers { max: MAX_PLAYERS });
    }
    Ok(name)
}

pub fn validate_start(settings: &GameSettings) -> Result<(), ValidationError> {
    let players = settings.players.len();
    if (players as u32) < MIN_PLAYERS {
        return Err(ValidationError::NotEnoughPlayers {
            required: MIN_PLAYERS,
            actual: players as u32,
        });
    }
    if settings.selected_categories.is_empty() {
        return Err(ValidationError::NoCategorySelected);
    }

    let max = max_impostors(players);
    if settings.impostor_count < 1 || settings.impostor_count > max {
        return Err(ValidationError::ImpostorCountOutOfRange {
            count: settings.impostor_count,
            max,
        });
    }
    Ok(())
}

/// Trims the name and words, rejecting blanks and case-insensitive repeats.
pub fn validate_custom_category(
    category: &CustomCategory,
) -> Result<CustomCategory, ValidationError> {
    let name = category.name.trim();
    if name.is_empty() {
        return Err(ValidationError::CategoryNameRequired);
    }

    let words: Vec<String> = category
        .words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let mut seen = HashSet::new();
    for word in &words {
        if !seen.insert(word.to_lowercase()) {
            return Err(ValidationError::DuplicateWord { word: word.clone() });
        }
    }
    if (words.len() as u32) < MIN_CUSTOM_WORDS {
        return Err(ValidationError::TooFewWords { min: MIN_CUSTOM_WORDS });
    }

    Ok(CustomCategory {
        name: name.to_string(),
        words,
        ..category.clone()
    })
}

pub fn can_add_custom_category(is_premium: bool, existing: usize) -> Result<(), ValidationError> {
    if !is_premium && existing as u32 >= FREE_CUSTOM_CATEGORY_LIMIT {
        return Err(ValidationError::CustomCategoryLimit {
            max: FREE_CUSTOM_CATEGORY_LIMIT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::{Avatar, CategoryType, Language, Player};

    fn settings_with(players: usize) -> GameSettings {
        GameSettings {
            players: (0..players)
                .map(|i| Player::new(format!("P{}", i), Avatar::clamped(i as u8 + 1)))
                .collect(),
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_player_names() {
        assert_eq!(validate_player_name("  Ana "), Ok("Ana".to_string()));
        assert_eq!(validate_player_name("   "), Err(ValidationError::EmptyName));
        assert_eq!(
            validate_new_player("Ana", 20),
            Err(ValidationError::TooManyPlayers { max: 20 })
        );
    }

    #[test]
    fn test_start_requirements() {
        assert_eq!(
            validate_start(&settings_with(2)),
            Err(ValidationError::NotEnoughPlayers { required: 3, actual: 2 })
        );
        assert!(validate_start(&settings_with(3)).is_ok());

        let mut settings = settings_with(3);
        settings.impostor_count = 3;
        assert_eq!(
            validate_start(&settings),
            Err(ValidationError::ImpostorCountOutOfRange { count: 3, max: 2 })
        );

        settings.impostor_count = 1;
        settings.selected_categories.clear();
        assert_eq!(validate_start(&settings), Err(ValidationError::NoCategorySelected));
    }

    #[test]
    fn test_custom_category_rules() {
        let mut category = CustomCategory::new(
            " Frutas ",
            vec!["Mango".into(), " ".into(), "Pera".into()],
            Language::Es,
            CategoryType::General,
        );
        assert_eq!(
            validate_custom_category(&category),
            Err(ValidationError::TooFewWords { min: 3 })
        );

        category.words.push("mango".into());
        assert_eq!(
            validate_custom_category(&category),
            Err(ValidationError::DuplicateWord { word: "mango".into() })
        );

        category.words.pop();
        category.words.push(" Kiwi".into());
        let cleaned = validate_custom_category(&category).unwrap();
        assert_eq!(cleaned.name, "Frutas");
        assert_eq!(cleaned.words, vec!["Mango", "Pera", "Kiwi"]);
        assert_eq!(cleaned.id, category.id);
    }

    #[test]
    fn test_custom_category_limit() {
        assert!(can_add_custom_category(false, 0).is_ok());
        assert!(can_add_custom_category(false, 1).is_err());
        assert!(can_add_custom_category(true, 5).is_ok());
    }
}
