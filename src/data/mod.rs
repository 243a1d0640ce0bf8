//! Database repository layer for all lifecycle entities.
//!
//! One repository per entity kind. Every lifecycle repository exposes the
//! same store contract: `load`, `load_all_non_terminal`, a version-guarded
//! `save`, and `delete`. `save` is a compare-and-set: it updates the row only
//! when the stored `version` still equals the caller's `expected_version`,
//! bumping the version by one in the same statement. A stale write surfaces
//! as `StoreError::VersionConflict` and is never silently applied.

pub mod giveaway;
pub mod guild_config;
pub mod role_menu;
pub mod role_menu_selection;
pub mod temp_voice;
pub mod ticket;

pub use giveaway::GiveawayRepository;
pub use guild_config::GuildConfigRepository;
pub use role_menu::RoleMenuRepository;
pub use role_menu_selection::RoleMenuSelectionRepository;
pub use temp_voice::TempVoiceRepository;
pub use ticket::TicketRepository;

#[cfg(test)]
mod test;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored version no longer matches the version the caller read.
    /// Another mutation won the race; reload and reassess.
    #[error("version conflict on {entity} {id}: expected version {expected}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: i64,
    },

    /// The row is gone (deleted or never persisted).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}
