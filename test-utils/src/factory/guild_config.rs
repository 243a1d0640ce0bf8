//! Guild configuration factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for per-guild config rows. Defaults leave every module
/// unconfigured; set the fields a test needs.
pub struct GuildConfigFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    ticket_category: Option<String>,
    ticket_log_channel: Option<String>,
    support_role: Option<String>,
    temp_voice_creator: Option<String>,
    temp_voice_category: Option<String>,
}

impl<'a> GuildConfigFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: "100".to_string(),
            ticket_category: None,
            ticket_log_channel: None,
            support_role: None,
            temp_voice_creator: None,
            temp_voice_category: None,
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn ticket_category(mut self, id: impl Into<String>) -> Self {
        self.ticket_category = Some(id.into());
        self
    }

    pub fn ticket_log_channel(mut self, id: impl Into<String>) -> Self {
        self.ticket_log_channel = Some(id.into());
        self
    }

    pub fn support_role(mut self, id: impl Into<String>) -> Self {
        self.support_role = Some(id.into());
        self
    }

    pub fn temp_voice_creator(mut self, id: impl Into<String>) -> Self {
        self.temp_voice_creator = Some(id.into());
        self
    }

    pub fn temp_voice_category(mut self, id: impl Into<String>) -> Self {
        self.temp_voice_category = Some(id.into());
        self
    }

    pub async fn build(self) -> Result<entity::guild_config::Model, DbErr> {
        entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            ticket_category: ActiveValue::Set(self.ticket_category),
            ticket_log_channel: ActiveValue::Set(self.ticket_log_channel),
            support_role: ActiveValue::Set(self.support_role),
            temp_voice_creator: ActiveValue::Set(self.temp_voice_creator),
            temp_voice_category: ActiveValue::Set(self.temp_voice_category),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}
