use sea_orm::entity::prelude::*;

/// Per-guild module configuration written by the setup commands.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    pub ticket_category: Option<String>,
    pub ticket_log_channel: Option<String>,
    pub support_role: Option<String>,
    pub temp_voice_creator: Option<String>,
    pub temp_voice_category: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
