//! Factory methods for creating test data.
//!
//! Each lifecycle entity has a factory with sensible defaults and a builder
//! style interface for overriding fields. All id defaults are numeric
//! strings, matching the Discord snowflakes the services parse.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let ticket = factory::ticket::TicketFactory::new(&db)
//!     .owner_id("42")
//!     .state("pending")
//!     .build()
//!     .await?;
//! ```

pub mod giveaway;
pub mod guild_config;
pub mod helpers;
pub mod role_menu;
pub mod temp_voice;
pub mod ticket;
