use sea_orm::entity::prelude::*;

/// Temporary voice channel, keyed by the Discord channel id (the channel is
/// created before the record is inserted, so the id is always known).
/// `expires_at` holds the grace-period deadline while `pending_delete`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "temp_voice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: String,
    pub guild_id: String,
    pub owner_id: String,
    pub category_id: String,
    pub locked: bool,
    pub user_limit: i32,
    /// One of `active`, `pending_delete`, `deleted`, `orphaned`.
    pub state: String,
    pub version: i64,
    pub expires_at: Option<DateTimeUtc>,
    pub bindings: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
