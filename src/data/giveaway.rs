use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{data::StoreError, model::GiveawayState};

pub struct GiveawayRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GiveawayRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new giveaway in `pending` state with version 1. The message
    /// id is written back via `save` once the giveaway message is posted.
    pub async fn create(
        &self,
        guild_id: &str,
        channel_id: &str,
        owner_id: &str,
        prize: &str,
        winner_count: i32,
        ends_at: DateTime<Utc>,
    ) -> Result<entity::giveaway::Model, StoreError> {
        let giveaway = entity::giveaway::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(guild_id.to_string()),
            channel_id: ActiveValue::Set(channel_id.to_string()),
            message_id: ActiveValue::Set(None),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            prize: ActiveValue::Set(prize.to_string()),
            winner_count: ActiveValue::Set(winner_count),
            participants: ActiveValue::Set(serde_json::json!([])),
            winners: ActiveValue::Set(serde_json::json!([])),
            state: ActiveValue::Set(GiveawayState::Pending.as_str().to_string()),
            version: ActiveValue::Set(1),
            expires_at: ActiveValue::Set(Some(ends_at)),
            bindings: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(giveaway)
    }

    pub async fn load(&self, id: i32) -> Result<Option<entity::giveaway::Model>, StoreError> {
        Ok(entity::prelude::Giveaway::find_by_id(id)
            .one(self.db)
            .await?)
    }

    pub async fn load_all_non_terminal(
        &self,
    ) -> Result<Vec<entity::giveaway::Model>, StoreError> {
        Ok(entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::State.is_not_in([
                GiveawayState::Drawn.as_str(),
                GiveawayState::Orphaned.as_str(),
            ]))
            .all(self.db)
            .await?)
    }

    /// Finds the running giveaway in a channel, if any. Used by the early-end
    /// command which operates on "the giveaway here".
    pub async fn find_active_by_channel(
        &self,
        guild_id: &str,
        channel_id: &str,
    ) -> Result<Option<entity::giveaway::Model>, StoreError> {
        Ok(entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::GuildId.eq(guild_id))
            .filter(entity::giveaway::Column::ChannelId.eq(channel_id))
            .filter(entity::giveaway::Column::State.eq(GiveawayState::Active.as_str()))
            .one(self.db)
            .await?)
    }

    /// Finds the most recently drawn giveaway in a guild, for reroll.
    pub async fn find_latest_drawn(
        &self,
        guild_id: &str,
    ) -> Result<Option<entity::giveaway::Model>, StoreError> {
        Ok(entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::GuildId.eq(guild_id))
            .filter(entity::giveaway::Column::State.eq(GiveawayState::Drawn.as_str()))
            .order_by_desc(entity::giveaway::Column::Id)
            .one(self.db)
            .await?)
    }

    /// Version-guarded write. See `TicketRepository::save` for the contract.
    pub async fn save(
        &self,
        mut giveaway: entity::giveaway::Model,
        expected_version: i64,
    ) -> Result<entity::giveaway::Model, StoreError> {
        giveaway.version = expected_version + 1;

        let update = entity::giveaway::ActiveModel {
            id: ActiveValue::Unchanged(giveaway.id),
            guild_id: ActiveValue::Set(giveaway.guild_id.clone()),
            channel_id: ActiveValue::Set(giveaway.channel_id.clone()),
            message_id: ActiveValue::Set(giveaway.message_id.clone()),
            owner_id: ActiveValue::Set(giveaway.owner_id.clone()),
            prize: ActiveValue::Set(giveaway.prize.clone()),
            winner_count: ActiveValue::Set(giveaway.winner_count),
            participants: ActiveValue::Set(giveaway.participants.clone()),
            winners: ActiveValue::Set(giveaway.winners.clone()),
            state: ActiveValue::Set(giveaway.state.clone()),
            version: ActiveValue::Set(giveaway.version),
            expires_at: ActiveValue::Set(giveaway.expires_at),
            bindings: ActiveValue::Set(giveaway.bindings.clone()),
            created_at: ActiveValue::Unchanged(giveaway.created_at),
        };

        let result = entity::prelude::Giveaway::update_many()
            .set(update)
            .filter(entity::giveaway::Column::Id.eq(giveaway.id))
            .filter(entity::giveaway::Column::Version.eq(expected_version))
            .exec(self.db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(giveaway);
        }

        match self.load(giveaway.id).await? {
            Some(_) => Err(StoreError::VersionConflict {
                entity: "giveaway",
                id: giveaway.id.to_string(),
                expected: expected_version,
            }),
            None => Err(StoreError::NotFound {
                entity: "giveaway",
                id: giveaway.id.to_string(),
            }),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = entity::prelude::Giveaway::delete_by_id(id)
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "giveaway",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
