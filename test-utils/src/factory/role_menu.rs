//! Role menu factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for test role menus. Defaults to an `active` non-exclusive menu
/// offering two roles (`501` Red, `502` Blue) with its message attached.
pub struct RoleMenuFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    channel_id: String,
    message_id: Option<String>,
    owner_id: String,
    exclusive: bool,
    options: serde_json::Value,
    state: String,
    version: i64,
    bindings: Vec<String>,
}

impl<'a> RoleMenuFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            guild_id: "100".to_string(),
            channel_id: (3000 + id).to_string(),
            message_id: Some((4000 + id).to_string()),
            owner_id: "200".to_string(),
            exclusive: false,
            options: serde_json::json!([
                { "role_id": "501", "label": "Red", "emoji": null },
                { "role_id": "502", "label": "Blue", "emoji": null },
            ]),
            state: "active".to_string(),
            version: 1,
            bindings: Vec::new(),
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn bindings(mut self, bindings: Vec<String>) -> Self {
        self.bindings = bindings;
        self
    }

    pub async fn build(self) -> Result<entity::role_menu::Model, DbErr> {
        entity::role_menu::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(self.guild_id),
            channel_id: ActiveValue::Set(self.channel_id),
            message_id: ActiveValue::Set(self.message_id),
            owner_id: ActiveValue::Set(self.owner_id),
            exclusive: ActiveValue::Set(self.exclusive),
            options: ActiveValue::Set(self.options),
            state: ActiveValue::Set(self.state),
            version: ActiveValue::Set(self.version),
            expires_at: ActiveValue::Set(None),
            bindings: ActiveValue::Set(serde_json::json!(self.bindings)),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active non-exclusive role menu with default values.
pub async fn create_role_menu(db: &DatabaseConnection) -> Result<entity::role_menu::Model, DbErr> {
    RoleMenuFactory::new(db).build().await
}
