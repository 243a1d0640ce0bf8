use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{data::StoreError, model::TempVoiceState};

pub struct TempVoiceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TempVoiceRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a record for a channel that was just created on Discord. The
    /// channel id is the natural key, so unlike tickets there is no pending
    /// write-back step.
    pub async fn create(
        &self,
        channel_id: &str,
        guild_id: &str,
        owner_id: &str,
        category_id: &str,
    ) -> Result<entity::temp_voice::Model, StoreError> {
        let channel = entity::temp_voice::ActiveModel {
            channel_id: ActiveValue::Set(channel_id.to_string()),
            guild_id: ActiveValue::Set(guild_id.to_string()),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            category_id: ActiveValue::Set(category_id.to_string()),
            locked: ActiveValue::Set(false),
            user_limit: ActiveValue::Set(0),
            state: ActiveValue::Set(TempVoiceState::Active.as_str().to_string()),
            version: ActiveValue::Set(1),
            expires_at: ActiveValue::Set(None),
            bindings: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(channel)
    }

    pub async fn load(
        &self,
        channel_id: &str,
    ) -> Result<Option<entity::temp_voice::Model>, StoreError> {
        Ok(entity::prelude::TempVoice::find_by_id(channel_id.to_string())
            .one(self.db)
            .await?)
    }

    pub async fn load_all_non_terminal(
        &self,
    ) -> Result<Vec<entity::temp_voice::Model>, StoreError> {
        Ok(entity::prelude::TempVoice::find()
            .filter(entity::temp_voice::Column::State.is_not_in([
                TempVoiceState::Deleted.as_str(),
                TempVoiceState::Orphaned.as_str(),
            ]))
            .all(self.db)
            .await?)
    }

    /// Version-guarded write. See `TicketRepository::save` for the contract.
    pub async fn save(
        &self,
        mut channel: entity::temp_voice::Model,
        expected_version: i64,
    ) -> Result<entity::temp_voice::Model, StoreError> {
        channel.version = expected_version + 1;

        let update = entity::temp_voice::ActiveModel {
            channel_id: ActiveValue::Unchanged(channel.channel_id.clone()),
            guild_id: ActiveValue::Set(channel.guild_id.clone()),
            owner_id: ActiveValue::Set(channel.owner_id.clone()),
            category_id: ActiveValue::Set(channel.category_id.clone()),
            locked: ActiveValue::Set(channel.locked),
            user_limit: ActiveValue::Set(channel.user_limit),
            state: ActiveValue::Set(channel.state.clone()),
            version: ActiveValue::Set(channel.version),
            expires_at: ActiveValue::Set(channel.expires_at),
            bindings: ActiveValue::Set(channel.bindings.clone()),
            created_at: ActiveValue::Unchanged(channel.created_at),
        };

        let result = entity::prelude::TempVoice::update_many()
            .set(update)
            .filter(entity::temp_voice::Column::ChannelId.eq(channel.channel_id.clone()))
            .filter(entity::temp_voice::Column::Version.eq(expected_version))
            .exec(self.db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(channel);
        }

        match self.load(&channel.channel_id).await? {
            Some(_) => Err(StoreError::VersionConflict {
                entity: "temp_voice",
                id: channel.channel_id.clone(),
                expected: expected_version,
            }),
            None => Err(StoreError::NotFound {
                entity: "temp_voice",
                id: channel.channel_id.clone(),
            }),
        }
    }

    pub async fn delete(&self, channel_id: &str) -> Result<(), StoreError> {
        let result = entity::prelude::TempVoice::delete_by_id(channel_id.to_string())
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "temp_voice",
                id: channel_id.to_string(),
            });
        }

        Ok(())
    }
}
