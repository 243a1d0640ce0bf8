//! Buddy, a community management bot built around a persistent
//! interactive-entity lifecycle engine.
//!
//! Long-lived stateful entities (support tickets, role menus, temporary
//! voice channels, giveaways) are exposed to users through Discord message
//! components. Component custom-ids use a stable encoding, so buttons and
//! dropdowns posted by a previous process keep working after a restart: the
//! reconciliation pass reloads every non-terminal entity from the database
//! and re-registers its bindings.
//!
//! # Architecture
//!
//! - **Data layer** (`data/`) - per-kind repositories over SeaORM with
//!   version-guarded (compare-and-set) writes
//! - **Sync** (`sync`) - per-entity mutual exclusion for concurrent
//!   interaction events
//! - **Scheduler** (`scheduler/`) - single deadline-ordered timer loop
//!   driving giveaway ends and temp-channel grace periods
//! - **Services** (`service/`) - lifecycle state machines for each entity
//!   kind, plus the startup reconciliation pass
//! - **Discord facade** (`discord/`) - thin trait over the Discord HTTP API
//!   with bounded retry on rate limits
//! - **Bot** (`bot/`) - Serenity event handlers, the component interaction
//!   router, and the slash-command surface

pub mod bot;
pub mod config;
pub mod data;
pub mod discord;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod sync;
