//! Lifecycle services.
//!
//! One service per entity kind, mirroring the repository layout. Each
//! transition follows the same shape: take the entity's guard lock, load the
//! current row, check the state machine, persist through the version-guarded
//! save, then perform the platform side effects. A `VersionConflict` from the
//! save means another mutation won the race; the transition reloads and
//! reassesses up to `CAS_RETRIES` times.

pub mod giveaway;
pub mod reconcile;
pub mod role_menu;
pub mod temp_voice;
pub mod ticket;

pub use giveaway::GiveawayService;
pub use reconcile::Reconciler;
pub use role_menu::RoleMenuService;
pub use temp_voice::TempVoiceService;
pub use ticket::TicketService;

#[cfg(test)]
mod test;

use serenity::all::ChannelId;

use crate::error::AppError;

/// Bounded reload-and-retry budget for version conflicts. Conflicts are
/// rare (two events racing on one entity), so one or two retries settle it.
pub(crate) const CAS_RETRIES: u32 = 3;

/// Parses a persisted Discord id string. Ids are written by us from real
/// snowflakes, so a parse failure means a corrupted row.
pub(crate) fn channel_id(raw: &str) -> Result<ChannelId, AppError> {
    raw.parse::<u64>()
        .map(ChannelId::new)
        .map_err(|_| AppError::InternalError(format!("malformed channel id: {raw}")))
}

pub(crate) fn guild_id(raw: &str) -> Result<serenity::all::GuildId, AppError> {
    raw.parse::<u64>()
        .map(serenity::all::GuildId::new)
        .map_err(|_| AppError::InternalError(format!("malformed guild id: {raw}")))
}

pub(crate) fn role_id(raw: &str) -> Result<serenity::all::RoleId, AppError> {
    raw.parse::<u64>()
        .map(serenity::all::RoleId::new)
        .map_err(|_| AppError::InternalError(format!("malformed role id: {raw}")))
}
