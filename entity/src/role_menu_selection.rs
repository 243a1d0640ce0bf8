use sea_orm::entity::prelude::*;

/// Per-user selection state for one role menu, keyed by (menu_id, user_id).
/// `role_ids` is a JSON array of role id strings; size 1 for exclusive menus.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "role_menu_selection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub menu_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub role_ids: Json,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
