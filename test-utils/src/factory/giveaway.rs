//! Giveaway factory.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for test giveaways. Defaults to an `active` giveaway ending an
/// hour from now with no participants.
pub struct GiveawayFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    channel_id: String,
    message_id: Option<String>,
    owner_id: String,
    prize: String,
    winner_count: i32,
    participants: serde_json::Value,
    winners: serde_json::Value,
    state: String,
    version: i64,
    expires_at: Option<DateTime<Utc>>,
    bindings: serde_json::Value,
}

impl<'a> GiveawayFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            guild_id: "100".to_string(),
            channel_id: (6000 + id).to_string(),
            message_id: Some((7000 + id).to_string()),
            owner_id: "200".to_string(),
            prize: format!("Prize {id}"),
            winner_count: 1,
            participants: serde_json::json!([]),
            winners: serde_json::json!([]),
            state: "active".to_string(),
            version: 1,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            bindings: serde_json::json!([]),
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn prize(mut self, prize: impl Into<String>) -> Self {
        self.prize = prize.into();
        self
    }

    pub fn winner_count(mut self, winner_count: i32) -> Self {
        self.winner_count = winner_count;
        self
    }

    pub fn participants(mut self, ids: &[&str]) -> Self {
        self.participants = serde_json::json!(ids);
        self
    }

    pub fn winners(mut self, ids: &[&str]) -> Self {
        self.winners = serde_json::json!(ids);
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

    pub fn bindings(mut self, bindings: &[&str]) -> Self {
        self.bindings = serde_json::json!(bindings);
        self
    }

    pub async fn build(self) -> Result<entity::giveaway::Model, DbErr> {
        entity::giveaway::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(self.guild_id),
            channel_id: ActiveValue::Set(self.channel_id),
            message_id: ActiveValue::Set(self.message_id),
            owner_id: ActiveValue::Set(self.owner_id),
            prize: ActiveValue::Set(self.prize),
            winner_count: ActiveValue::Set(self.winner_count),
            participants: ActiveValue::Set(self.participants),
            winners: ActiveValue::Set(self.winners),
            state: ActiveValue::Set(self.state),
            version: ActiveValue::Set(self.version),
            expires_at: ActiveValue::Set(self.expires_at),
            bindings: ActiveValue::Set(self.bindings),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active giveaway with default values.
pub async fn create_giveaway(db: &DatabaseConnection) -> Result<entity::giveaway::Model, DbErr> {
    GiveawayFactory::new(db).build().await
}
