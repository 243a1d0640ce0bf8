//! Discord bot integration.
//!
//! The bot is the event-driven edge of the lifecycle engine: slash commands
//! and message components come in through the gateway, get decoded by the
//! router, and are handed to the lifecycle services. All Discord-side writes
//! go back out through the `DiscordActions` facade.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - channel and interaction events
//! - `GUILD_MEMBERS` - member removal (releases exclusive role-menu locks;
//!   privileged, must be enabled in the developer portal)
//! - `GUILD_VOICE_STATES` - occupancy tracking for temporary voice channels

pub mod commands;
pub mod handler;
pub mod registry;
pub mod router;
pub mod start;
