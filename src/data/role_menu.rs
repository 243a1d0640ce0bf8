use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{
    data::StoreError,
    model::{encode_options, MenuOption, RoleMenuState},
};

pub struct RoleMenuRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleMenuRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new menu in `pending` state with version 1. The menu message
    /// id is written back via `save` once the message is posted.
    pub async fn create(
        &self,
        guild_id: &str,
        channel_id: &str,
        owner_id: &str,
        exclusive: bool,
        options: &[MenuOption],
    ) -> Result<entity::role_menu::Model, StoreError> {
        let menu = entity::role_menu::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(guild_id.to_string()),
            channel_id: ActiveValue::Set(channel_id.to_string()),
            message_id: ActiveValue::Set(None),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            exclusive: ActiveValue::Set(exclusive),
            options: ActiveValue::Set(encode_options(options)),
            state: ActiveValue::Set(RoleMenuState::Pending.as_str().to_string()),
            version: ActiveValue::Set(1),
            expires_at: ActiveValue::Set(None),
            bindings: ActiveValue::Set(serde_json::json!([])),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(menu)
    }

    pub async fn load(&self, id: i32) -> Result<Option<entity::role_menu::Model>, StoreError> {
        Ok(entity::prelude::RoleMenu::find_by_id(id)
            .one(self.db)
            .await?)
    }

    pub async fn load_all_non_terminal(
        &self,
    ) -> Result<Vec<entity::role_menu::Model>, StoreError> {
        Ok(entity::prelude::RoleMenu::find()
            .filter(
                entity::role_menu::Column::State.is_not_in([RoleMenuState::Orphaned.as_str()]),
            )
            .all(self.db)
            .await?)
    }

    pub async fn find_by_guild(
        &self,
        guild_id: &str,
    ) -> Result<Vec<entity::role_menu::Model>, StoreError> {
        Ok(entity::prelude::RoleMenu::find()
            .filter(entity::role_menu::Column::GuildId.eq(guild_id))
            .all(self.db)
            .await?)
    }

    /// Version-guarded write. See `TicketRepository::save` for the contract.
    pub async fn save(
        &self,
        mut menu: entity::role_menu::Model,
        expected_version: i64,
    ) -> Result<entity::role_menu::Model, StoreError> {
        menu.version = expected_version + 1;

        let update = entity::role_menu::ActiveModel {
            id: ActiveValue::Unchanged(menu.id),
            guild_id: ActiveValue::Set(menu.guild_id.clone()),
            channel_id: ActiveValue::Set(menu.channel_id.clone()),
            message_id: ActiveValue::Set(menu.message_id.clone()),
            owner_id: ActiveValue::Set(menu.owner_id.clone()),
            exclusive: ActiveValue::Set(menu.exclusive),
            options: ActiveValue::Set(menu.options.clone()),
            state: ActiveValue::Set(menu.state.clone()),
            version: ActiveValue::Set(menu.version),
            expires_at: ActiveValue::Set(menu.expires_at),
            bindings: ActiveValue::Set(menu.bindings.clone()),
            created_at: ActiveValue::Unchanged(menu.created_at),
        };

        let result = entity::prelude::RoleMenu::update_many()
            .set(update)
            .filter(entity::role_menu::Column::Id.eq(menu.id))
            .filter(entity::role_menu::Column::Version.eq(expected_version))
            .exec(self.db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(menu);
        }

        match self.load(menu.id).await? {
            Some(_) => Err(StoreError::VersionConflict {
                entity: "role_menu",
                id: menu.id.to_string(),
                expected: expected_version,
            }),
            None => Err(StoreError::NotFound {
                entity: "role_menu",
                id: menu.id.to_string(),
            }),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = entity::prelude::RoleMenu::delete_by_id(id)
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "role_menu",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
