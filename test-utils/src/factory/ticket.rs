//! Ticket factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for test tickets. Defaults to an `open` ticket with a channel
/// attached and its close binding registered.
pub struct TicketFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    owner_id: String,
    channel_id: Option<String>,
    log_channel_id: Option<String>,
    state: String,
    version: i64,
    bindings: Vec<String>,
}

impl<'a> TicketFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            guild_id: "100".to_string(),
            owner_id: (1000 + id).to_string(),
            channel_id: Some((2000 + id).to_string()),
            log_channel_id: None,
            state: "open".to_string(),
            version: 1,
            bindings: Vec::new(),
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn channel_id(mut self, channel_id: Option<String>) -> Self {
        self.channel_id = channel_id;
        self
    }

    pub fn log_channel_id(mut self, log_channel_id: Option<String>) -> Self {
        self.log_channel_id = log_channel_id;
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

    pub fn bindings(mut self, bindings: Vec<String>) -> Self {
        self.bindings = bindings;
        self
    }

    pub async fn build(self) -> Result<entity::ticket::Model, DbErr> {
        entity::ticket::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(self.guild_id),
            owner_id: ActiveValue::Set(self.owner_id),
            channel_id: ActiveValue::Set(self.channel_id),
            log_channel_id: ActiveValue::Set(self.log_channel_id),
            state: ActiveValue::Set(self.state),
            closed_by: ActiveValue::Set(None),
            close_reason: ActiveValue::Set(None),
            version: ActiveValue::Set(self.version),
            expires_at: ActiveValue::Set(None),
            bindings: ActiveValue::Set(serde_json::json!(self.bindings)),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an open ticket with default values.
pub async fn create_ticket(db: &DatabaseConnection) -> Result<entity::ticket::Model, DbErr> {
    TicketFactory::new(db).build().await
}
