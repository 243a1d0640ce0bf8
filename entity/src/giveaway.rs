use sea_orm::entity::prelude::*;

/// Giveaway anchored to a Discord message. `participants` and `winners` are
/// JSON arrays of user id strings; `winners` stays empty until the one-shot
/// draw transition runs. `expires_at` is the scheduled end time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "giveaway")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: Option<String>,
    pub owner_id: String,
    pub prize: String,
    pub winner_count: i32,
    pub participants: Json,
    pub winners: Json,
    /// One of `pending`, `active`, `drawn`, `orphaned`.
    pub state: String,
    pub version: i64,
    pub expires_at: Option<DateTimeUtc>,
    pub bindings: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
