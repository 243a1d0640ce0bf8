//! SeaORM entity models for the Buddy bot.
//!
//! Each lifecycle entity (ticket, role menu, temp voice channel, giveaway)
//! carries a monotonic `version` column used for compare-and-set writes, a
//! `state` discriminant, a `bindings` JSON column listing the component
//! custom-ids currently live for the entity, and an optional `expires_at`
//! deadline consumed by the timer scheduler.

pub mod giveaway;
pub mod guild_config;
pub mod role_menu;
pub mod role_menu_selection;
pub mod temp_voice;
pub mod ticket;

pub mod prelude;
