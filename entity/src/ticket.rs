use sea_orm::entity::prelude::*;

/// Support ticket. `channel_id` is null while the record is `pending`
/// (inserted before the Discord channel exists, written back once created).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub owner_id: String,
    pub channel_id: Option<String>,
    pub log_channel_id: Option<String>,
    /// One of `pending`, `open`, `closed`, `orphaned`.
    pub state: String,
    pub closed_by: Option<String>,
    pub close_reason: Option<String>,
    pub version: i64,
    pub expires_at: Option<DateTimeUtc>,
    pub bindings: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
