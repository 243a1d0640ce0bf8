//! Temp voice channel factory.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for test temp voice channels. Defaults to an `active` unlocked
/// channel owned by user `200`.
pub struct TempVoiceFactory<'a> {
    db: &'a DatabaseConnection,
    channel_id: String,
    guild_id: String,
    owner_id: String,
    category_id: String,
    locked: bool,
    user_limit: i32,
    state: String,
    version: i64,
    expires_at: Option<DateTime<Utc>>,
}

impl<'a> TempVoiceFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            channel_id: (5000 + id).to_string(),
            guild_id: "100".to_string(),
            owner_id: "200".to_string(),
            category_id: "300".to_string(),
            locked: false,
            user_limit: 0,
            state: "active".to_string(),
            version: 1,
            expires_at: None,
        }
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub async fn build(self) -> Result<entity::temp_voice::Model, DbErr> {
        entity::temp_voice::ActiveModel {
            channel_id: ActiveValue::Set(self.channel_id),
            guild_id: ActiveValue::Set(self.guild_id),
            owner_id: ActiveValue::Set(self.owner_id),
            category_id: ActiveValue::Set(self.category_id),
            locked: ActiveValue::Set(self.locked),
            user_limit: ActiveValue::Set(self.user_limit),
            state: ActiveValue::Set(self.state),
            version: ActiveValue::Set(self.version),
            expires_at: ActiveValue::Set(self.expires_at),
            bindings: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active temp voice channel with default values.
pub async fn create_temp_voice(
    db: &DatabaseConnection,
) -> Result<entity::temp_voice::Model, DbErr> {
    TempVoiceFactory::new(db).build().await
}
