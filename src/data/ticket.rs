use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{data::StoreError, model::TicketState};

pub struct TicketRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new ticket in `pending` state with version 1. The Discord
    /// channel id is written back via `save` once the channel exists.
    pub async fn create(
        &self,
        guild_id: &str,
        owner_id: &str,
        log_channel_id: Option<String>,
    ) -> Result<entity::ticket::Model, StoreError> {
        let ticket = entity::ticket::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(guild_id.to_string()),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            channel_id: ActiveValue::Set(None),
            log_channel_id: ActiveValue::Set(log_channel_id),
            state: ActiveValue::Set(TicketState::Pending.as_str().to_string()),
            closed_by: ActiveValue::Set(None),
            close_reason: ActiveValue::Set(None),
            version: ActiveValue::Set(1),
            expires_at: ActiveValue::Set(None),
            bindings: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(ticket)
    }

    pub async fn load(&self, id: i32) -> Result<Option<entity::ticket::Model>, StoreError> {
        Ok(entity::prelude::Ticket::find_by_id(id).one(self.db).await?)
    }

    pub async fn load_all_non_terminal(&self) -> Result<Vec<entity::ticket::Model>, StoreError> {
        Ok(entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::State.is_not_in([
                TicketState::Closed.as_str(),
                TicketState::Orphaned.as_str(),
            ]))
            .all(self.db)
            .await?)
    }

    /// Finds the open (or pending) ticket a user already has in a guild, if
    /// any. Used to stop a user from stacking up tickets.
    pub async fn find_open_by_owner(
        &self,
        guild_id: &str,
        owner_id: &str,
    ) -> Result<Option<entity::ticket::Model>, StoreError> {
        Ok(entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::GuildId.eq(guild_id))
            .filter(entity::ticket::Column::OwnerId.eq(owner_id))
            .filter(entity::ticket::Column::State.is_in([
                TicketState::Pending.as_str(),
                TicketState::Open.as_str(),
            ]))
            .one(self.db)
            .await?)
    }

    /// Maps a Discord channel back to its ticket, for the slash command run
    /// inside the ticket channel.
    pub async fn find_by_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<entity::ticket::Model>, StoreError> {
        Ok(entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::ChannelId.eq(channel_id))
            .filter(entity::ticket::Column::State.is_in([
                TicketState::Pending.as_str(),
                TicketState::Open.as_str(),
            ]))
            .one(self.db)
            .await?)
    }

    /// Version-guarded write of the whole mutable row. Returns the model with
    /// its version bumped on success.
    ///
    /// # Returns
    /// - `Ok(Model)`: the row matched `expected_version` and was updated
    /// - `Err(VersionConflict)`: the row exists with a different version
    /// - `Err(NotFound)`: the row is gone
    pub async fn save(
        &self,
        mut ticket: entity::ticket::Model,
        expected_version: i64,
    ) -> Result<entity::ticket::Model, StoreError> {
        ticket.version = expected_version + 1;

        let update = entity::ticket::ActiveModel {
            id: ActiveValue::Unchanged(ticket.id),
            guild_id: ActiveValue::Set(ticket.guild_id.clone()),
            owner_id: ActiveValue::Set(ticket.owner_id.clone()),
            channel_id: ActiveValue::Set(ticket.channel_id.clone()),
            log_channel_id: ActiveValue::Set(ticket.log_channel_id.clone()),
            state: ActiveValue::Set(ticket.state.clone()),
            closed_by: ActiveValue::Set(ticket.closed_by.clone()),
            close_reason: ActiveValue::Set(ticket.close_reason.clone()),
            version: ActiveValue::Set(ticket.version),
            expires_at: ActiveValue::Set(ticket.expires_at),
            bindings: ActiveValue::Set(ticket.bindings.clone()),
            created_at: ActiveValue::Unchanged(ticket.created_at),
        };

        let result = entity::prelude::Ticket::update_many()
            .set(update)
            .filter(entity::ticket::Column::Id.eq(ticket.id))
            .filter(entity::ticket::Column::Version.eq(expected_version))
            .exec(self.db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(ticket);
        }

        match self.load(ticket.id).await? {
            Some(_) => Err(StoreError::VersionConflict {
                entity: "ticket",
                id: ticket.id.to_string(),
                expected: expected_version,
            }),
            None => Err(StoreError::NotFound {
                entity: "ticket",
                id: ticket.id.to_string(),
            }),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = entity::prelude::Ticket::delete_by_id(id)
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "ticket",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
