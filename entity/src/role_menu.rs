use sea_orm::entity::prelude::*;

/// Self-assign role menu anchored to a Discord message. `options` is a JSON
/// array of `{ role_id, label, emoji }` objects (at most 25, the Discord
/// select-menu limit). `message_id` is null until the menu message is sent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "role_menu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: Option<String>,
    pub owner_id: String,
    /// Exclusive menus allow a user at most one selection, locked until the
    /// user leaves the guild.
    pub exclusive: bool,
    pub options: Json,
    /// One of `pending`, `active`, `orphaned`.
    pub state: String,
    pub version: i64,
    pub expires_at: Option<DateTimeUtc>,
    pub bindings: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
