use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{data::StoreError, model::encode_ids};

/// Per-user selection rows for role menus, keyed by (menu_id, user_id).
///
/// Selections are always mutated while holding the menu/user entity lock, so
/// a plain upsert suffices here; the race-sensitive invariants (the exclusive
/// lock-in check) are enforced by `RoleMenuService` before writing.
pub struct RoleMenuSelectionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleMenuSelectionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(
        &self,
        menu_id: i32,
        user_id: &str,
    ) -> Result<Option<entity::role_menu_selection::Model>, StoreError> {
        Ok(
            entity::prelude::RoleMenuSelection::find_by_id((menu_id, user_id.to_string()))
                .one(self.db)
                .await?,
        )
    }

    pub async fn upsert(
        &self,
        menu_id: i32,
        user_id: &str,
        role_ids: &[String],
    ) -> Result<(), StoreError> {
        entity::prelude::RoleMenuSelection::insert(entity::role_menu_selection::ActiveModel {
            menu_id: ActiveValue::Set(menu_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            role_ids: ActiveValue::Set(encode_ids(role_ids)),
            updated_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                entity::role_menu_selection::Column::MenuId,
                entity::role_menu_selection::Column::UserId,
            ])
            .update_columns([
                entity::role_menu_selection::Column::RoleIds,
                entity::role_menu_selection::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(self.db)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, menu_id: i32, user_id: &str) -> Result<(), StoreError> {
        entity::prelude::RoleMenuSelection::delete_by_id((menu_id, user_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Clears a user's selections across the given menus. Used when a member
    /// leaves the guild, which unlocks exclusive menus for them.
    pub async fn delete_for_user(
        &self,
        menu_ids: &[i32],
        user_id: &str,
    ) -> Result<u64, StoreError> {
        if menu_ids.is_empty() {
            return Ok(0);
        }

        let result = entity::prelude::RoleMenuSelection::delete_many()
            .filter(entity::role_menu_selection::Column::MenuId.is_in(menu_ids.iter().copied()))
            .filter(entity::role_menu_selection::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
