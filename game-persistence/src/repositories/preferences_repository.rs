use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{preferences, prelude::*};
use game_types::{CustomCategory, SavedPreferences};

pub const CUSTOM_CATEGORIES_KEY: &str = "@impostor_custom_categories";
pub const GAMES_PLAYED_KEY: &str = "@impostor_games_played";
pub const DEVICE_ID_KEY: &str = "impostor_device_id";

/// Durable key-value preferences. Values are stored as JSON text; anything
/// missing or unreadable loads as its default.
#[derive(Clone)]
pub struct PreferencesRepository {
    db: DatabaseConnection,
}

impl PreferencesRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let model = Preferences::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(model.map(|m| m.value))
    }

    pub async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let model = preferences::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        Preferences::insert(model)
            .on_conflict(
                OnConflict::column(preferences::Column::Key)
                    .update_columns([preferences::Column::Value, preferences::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        Preferences::delete_by_id(key.to_string()).exec(&self.db).await?;
        Ok(())
    }

    async fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(raw) = self.get_raw(key).await? else {
            debug!("No stored value for {}", key);
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Ignoring unreadable value for {}: {}", key, e);
                Ok(T::default())
            }
        }
    }

    async fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_raw(key, serde_json::to_string(value)?).await
    }

    pub async fn load_custom_categories(&self) -> Result<Vec<CustomCategory>> {
        self.load_json(CUSTOM_CATEGORIES_KEY).await
    }

    pub async fn save_custom_categories(&self, categories: &[CustomCategory]) -> Result<()> {
        self.save_json(CUSTOM_CATEGORIES_KEY, &categories).await
    }

    pub async fn load_games_played(&self) -> Result<u32> {
        self.load_json(GAMES_PLAYED_KEY).await
    }

    pub async fn save_games_played(&self, games_played: u32) -> Result<()> {
        self.save_json(GAMES_PLAYED_KEY, &games_played).await
    }

    pub async fn load_preferences(&self) -> Result<SavedPreferences> {
        Ok(SavedPreferences {
            custom_categories: self.load_custom_categories().await?,
            games_played: self.load_games_played().await?,
        })
    }

    pub async fn save_preferences(&self, preferences: &SavedPreferences) -> Result<()> {
        self.save_custom_categories(&preferences.custom_categories).await?;
        self.save_games_played(preferences.games_played).await
    }

    /// Stable id of this device, created on first use.
    pub async fn device_id(&self) -> Result<String> {
        let existing: Option<String> = self.load_json(DEVICE_ID_KEY).await?;
        if let Some(id) = existing.filter(|id| !id.is_empty()) {
            return Ok(id);
        }

        let id = Uuid::new_v4().simple().to_string();
        self.save_json(DEVICE_ID_KEY, &id).await?;
        debug!("Generated device id {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use game_types::{CategoryType, Language};
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> PreferencesRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        PreferencesRepository::new(db)
    }

    #[tokio::test]
    async fn test_defaults_when_nothing_saved() {
        let repo = setup_test_db().await;

        let preferences = repo.load_preferences().await.unwrap();
        assert_eq!(preferences, SavedPreferences::default());
    }

    #[tokio::test]
    async fn test_save_and_load_preferences() {
        let repo = setup_test_db().await;

        let category = CustomCategory::new(
            "Frutas",
            vec!["Mango".into(), "Pera".into(), "Kiwi".into()],
            Language::Es,
            CategoryType::General,
        );
        let preferences = SavedPreferences {
            custom_categories: vec![category],
            games_played: 7,
        };

        repo.save_preferences(&preferences).await.unwrap();
        assert_eq!(repo.load_preferences().await.unwrap(), preferences);

        // Saving again overwrites instead of failing on the primary key.
        repo.save_games_played(8).await.unwrap();
        assert_eq!(repo.load_games_played().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_values_load_as_defaults() {
        let repo = setup_test_db().await;

        repo.set_raw(CUSTOM_CATEGORIES_KEY, "{not json".to_string())
            .await
            .unwrap();
        repo.set_raw(GAMES_PLAYED_KEY, "\"many\"".to_string())
            .await
            .unwrap();

        assert!(repo.load_custom_categories().await.unwrap().is_empty());
        assert_eq!(repo.load_games_played().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_device_id_is_stable() {
        let repo = setup_test_db().await;

        let first = repo.device_id().await.unwrap();
        let second = repo.device_id().await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());

        repo.remove(DEVICE_ID_KEY).await.unwrap();
        assert_ne!(repo.device_id().await.unwrap(), first);
    }
}
