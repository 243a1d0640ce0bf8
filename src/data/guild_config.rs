use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};

use crate::data::StoreError;

/// Per-guild configuration written by the admin setup commands. Plain
/// upserts; this table is not a lifecycle entity and carries no version.
pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(
        &self,
        guild_id: &str,
    ) -> Result<Option<entity::guild_config::Model>, StoreError> {
        Ok(entity::prelude::GuildConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?)
    }

    pub async fn set_ticket_config(
        &self,
        guild_id: &str,
        category: &str,
        log_channel: &str,
        support_role: Option<String>,
    ) -> Result<entity::guild_config::Model, StoreError> {
        let existing = self.get(guild_id).await?;

        Ok(entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            ticket_category: ActiveValue::Set(Some(category.to_string())),
            ticket_log_channel: ActiveValue::Set(Some(log_channel.to_string())),
            support_role: ActiveValue::Set(
                support_role.or(existing.as_ref().and_then(|c| c.support_role.clone())),
            ),
            temp_voice_creator: ActiveValue::Set(
                existing.as_ref().and_then(|c| c.temp_voice_creator.clone()),
            ),
            temp_voice_category: ActiveValue::Set(
                existing.as_ref().and_then(|c| c.temp_voice_category.clone()),
            ),
            created_at: ActiveValue::Set(
                existing.map(|c| c.created_at).unwrap_or_else(Utc::now),
            ),
        })
        .on_conflict(
            OnConflict::column(entity::guild_config::Column::GuildId)
                .update_columns([
                    entity::guild_config::Column::TicketCategory,
                    entity::guild_config::Column::TicketLogChannel,
                    entity::guild_config::Column::SupportRole,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?)
    }

    pub async fn set_temp_voice_config(
        &self,
        guild_id: &str,
        creator_channel: &str,
        category: &str,
    ) -> Result<entity::guild_config::Model, StoreError> {
        let existing = self.get(guild_id).await?;

        Ok(entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            ticket_category: ActiveValue::Set(
                existing.as_ref().and_then(|c| c.ticket_category.clone()),
            ),
            ticket_log_channel: ActiveValue::Set(
                existing.as_ref().and_then(|c| c.ticket_log_channel.clone()),
            ),
            support_role: ActiveValue::Set(
                existing.as_ref().and_then(|c| c.support_role.clone()),
            ),
            temp_voice_creator: ActiveValue::Set(Some(creator_channel.to_string())),
            temp_voice_category: ActiveValue::Set(Some(category.to_string())),
            created_at: ActiveValue::Set(
                existing.map(|c| c.created_at).unwrap_or_else(Utc::now),
            ),
        })
        .on_conflict(
            OnConflict::column(entity::guild_config::Column::GuildId)
                .update_columns([
                    entity::guild_config::Column::TempVoiceCreator,
                    entity::guild_config::Column::TempVoiceCategory,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?)
    }
}
