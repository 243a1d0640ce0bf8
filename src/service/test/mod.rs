use std::sync::Arc;

use serenity::all::{ChannelId, GuildId, UserId};
use test_utils::{builder::TestBuilder, factory};

use crate::bot::registry::BindingRegistry;
use crate::discord::mock::{Call, MockDiscord};
use crate::discord::{ActionError, DiscordActions};
use crate::error::AppError;
use crate::scheduler::{CommandReceiver, SchedulerHandle};
use crate::state::AppState;
use crate::sync::EntityGuard;

mod reconcile;
mod ticket;

/// Builds an `AppState` over a fresh in-memory database and a recording
/// Discord mock. The returned receiver keeps the scheduler channel open;
/// tests that exercise timer-driven transitions hand it to
/// `scheduler::spawn`, everyone else just holds it.
async fn harness() -> (AppState, Arc<MockDiscord>, CommandReceiver) {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let discord = Arc::new(MockDiscord::new());
    let (scheduler, rx) = SchedulerHandle::channel();
    let state = AppState {
        db: test.db.unwrap(),
        discord: Arc::clone(&discord) as Arc<dyn DiscordActions>,
        guard: Arc::new(EntityGuard::new()),
        scheduler,
        bindings: Arc::new(BindingRegistry::new()),
    };
    (state, discord, rx)
}
