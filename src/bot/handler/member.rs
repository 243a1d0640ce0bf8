use serenity::all::{GuildId, User};
use tracing::{error, info};

use crate::service::RoleMenuService;
use crate::state::AppState;

/// Clears a departed member's role-menu selections so exclusive locks do
/// not follow them back if they rejoin.
pub async fn handle_member_removal(state: &AppState, guild_id: GuildId, user: User) {
    match RoleMenuService::new(state).reset_user(guild_id, user.id).await {
        Ok(0) => {}
        Ok(cleared) => info!(user = %user.id, %guild_id, cleared, "reset role menu selections"),
        Err(e) => error!(user = %user.id, "failed to reset selections: {e:?}"),
    }
}
