//! Self-assign role menus.
//!
//! The menu entity owns the posted select component; the per-user selection
//! state lives in its own table, mutated under a `(menu, user)` guard key so
//! two clicks from one user serialize while different users proceed in
//! parallel. Role changes on Discord happen only after the selection row is
//! persisted; if the role change fails, the row is rolled back.

use serenity::all::{
    ChannelId, CreateActionRow, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
    GuildId, ReactionType, UserId,
};
use tracing::warn;

use crate::bot::router::{self, ComponentTarget};
use crate::data::{RoleMenuRepository, RoleMenuSelectionRepository};
use crate::error::AppError;
use crate::model::{decode_ids, decode_options, encode_ids, MenuOption, RoleMenuState};
use crate::service::role_id;
use crate::state::AppState;
use crate::sync::keys;

/// Discord caps string selects at 25 options.
pub const MAX_OPTIONS: usize = 25;

pub enum SelectionOutcome {
    Added { role_id: String },
    Removed { role_id: String },
    /// Exclusive menu and the user already holds a selection; nothing
    /// changes until they leave the guild.
    Locked { role_id: String },
}

pub struct RoleMenuService<'a> {
    state: &'a AppState,
}

impl<'a> RoleMenuService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn menus(&self) -> RoleMenuRepository<'a> {
        RoleMenuRepository::new(&self.state.db)
    }

    fn selections(&self) -> RoleMenuSelectionRepository<'a> {
        RoleMenuSelectionRepository::new(&self.state.db)
    }

    /// Creates a menu and posts its select component: `pending` row first,
    /// message second, then the row is confirmed `active` with the message
    /// id written back.
    pub async fn create(
        &self,
        guild: GuildId,
        channel: ChannelId,
        owner: UserId,
        title: &str,
        exclusive: bool,
        options: Vec<MenuOption>,
    ) -> Result<entity::role_menu::Model, AppError> {
        if options.is_empty() || options.len() > MAX_OPTIONS {
            return Err(AppError::InvalidInput(format!(
                "A role menu needs between 1 and {MAX_OPTIONS} roles."
            )));
        }

        let mut menu = self
            .menus()
            .create(
                &guild.to_string(),
                &channel.to_string(),
                &owner.to_string(),
                exclusive,
                &options,
            )
            .await?;

        let select_id = router::role_menu_select_id(menu.id);
        let select_options = options
            .iter()
            .map(|option| {
                let mut built =
                    CreateSelectMenuOption::new(option.label.clone(), option.role_id.clone());
                if let Some(emoji) = &option.emoji {
                    built = built.emoji(ReactionType::Unicode(emoji.clone()));
                }
                built
            })
            .collect();
        let select = CreateSelectMenu::new(
            select_id.clone(),
            CreateSelectMenuKind::String {
                options: select_options,
            },
        )
        .placeholder("Pick a role")
        .min_values(1)
        .max_values(1);

        let message = match self
            .state
            .discord
            .send_message(channel, title, vec![CreateActionRow::SelectMenu(select)])
            .await
        {
            Ok(message) => message,
            Err(err) => {
                if let Err(cleanup) = self.menus().delete(menu.id).await {
                    warn!(menu = menu.id, %cleanup, "failed to drop pending role menu");
                }
                return Err(err.into());
            }
        };

        menu.message_id = Some(message.to_string());
        menu.state = RoleMenuState::Active.as_str().to_string();
        menu.bindings = encode_ids(std::slice::from_ref(&select_id));
        let menu = self.menus().save(menu, 1).await?;

        self.state.bindings.register(
            &select_id,
            ComponentTarget::RoleMenuSelect { menu_id: menu.id },
        );

        Ok(menu)
    }

    /// Applies one select interaction: toggle on a non-exclusive menu,
    /// lock-in on an exclusive one.
    pub async fn select(
        &self,
        menu_id: i32,
        user: UserId,
        picked_role: &str,
    ) -> Result<SelectionOutcome, AppError> {
        let user_key = user.to_string();
        self.state
            .guard
            .with_lock(&keys::role_menu_user(menu_id, &user_key), async {
                let Some(menu) = self.menus().load(menu_id).await? else {
                    return Err(AppError::NotFound("This menu no longer exists.".to_string()));
                };
                if RoleMenuState::parse(&menu.state) != Some(RoleMenuState::Active) {
                    return Err(AppError::NotFound("This menu no longer exists.".to_string()));
                }

                let options = decode_options(&menu.options);
                if !options.iter().any(|o| o.role_id == picked_role) {
                    return Err(AppError::InvalidInput(
                        "That role is not part of this menu.".to_string(),
                    ));
                }

                let guild = crate::service::guild_id(&menu.guild_id)?;
                let current = match self.selections().get(menu_id, &user_key).await? {
                    Some(row) => decode_ids(&row.role_ids),
                    None => Vec::new(),
                };

                if menu.exclusive {
                    if let Some(held) = current.first() {
                        return Ok(SelectionOutcome::Locked {
                            role_id: held.clone(),
                        });
                    }
                }

                let role = role_id(picked_role)?;
                if current.iter().any(|r| r == picked_role) {
                    // Toggle off.
                    let remaining: Vec<String> = current
                        .iter()
                        .filter(|r| r.as_str() != picked_role)
                        .cloned()
                        .collect();
                    self.persist_selection(menu_id, &user_key, &remaining).await?;

                    if let Err(err) = self.state.discord.revoke_role(guild, user, role).await {
                        self.rollback_selection(menu_id, &user_key, &current).await;
                        return Err(err.into());
                    }

                    Ok(SelectionOutcome::Removed {
                        role_id: picked_role.to_string(),
                    })
                } else {
                    let updated: Vec<String> = current
                        .iter()
                        .cloned()
                        .chain(std::iter::once(picked_role.to_string()))
                        .collect();
                    self.persist_selection(menu_id, &user_key, &updated).await?;

                    if let Err(err) = self.state.discord.assign_role(guild, user, role).await {
                        self.rollback_selection(menu_id, &user_key, &current).await;
                        return Err(err.into());
                    }

                    Ok(SelectionOutcome::Added {
                        role_id: picked_role.to_string(),
                    })
                }
            })
            .await
    }

    /// Clears a departed member's selections across all menus in the guild,
    /// releasing exclusive locks so they can pick anew if they return.
    pub async fn reset_user(&self, guild: GuildId, user: UserId) -> Result<u64, AppError> {
        let menus = self.menus().find_by_guild(&guild.to_string()).await?;
        let ids: Vec<i32> = menus.iter().map(|m| m.id).collect();
        Ok(self
            .selections()
            .delete_for_user(&ids, &user.to_string())
            .await?)
    }

    async fn persist_selection(
        &self,
        menu_id: i32,
        user_key: &str,
        roles: &[String],
    ) -> Result<(), AppError> {
        if roles.is_empty() {
            match self.selections().delete(menu_id, user_key).await {
                Ok(()) | Err(crate::data::StoreError::NotFound { .. }) => Ok(()),
                Err(err) => Err(err.into()),
            }
        } else {
            Ok(self.selections().upsert(menu_id, user_key, roles).await?)
        }
    }

    /// Restores a selection row after a failed role change so persisted
    /// state matches what the member actually holds.
    async fn rollback_selection(&self, menu_id: i32, user_key: &str, previous: &[String]) {
        if let Err(err) = self.persist_selection(menu_id, user_key, previous).await {
            warn!(menu = menu_id, user = user_key, %err, "selection rollback failed");
        }
    }
}
