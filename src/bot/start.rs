use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{Client, GatewayIntents};
use tracing::info;

use crate::bot::handler::Handler;
use crate::bot::registry::BindingRegistry;
use crate::config::Config;
use crate::discord::{DiscordActions, HttpDiscord};
use crate::error::AppError;
use crate::scheduler::{self, SchedulerHandle};
use crate::state::AppState;
use crate::sync::EntityGuard;

/// Builds the Discord client and assembles the shared application state
/// around its HTTP client and cache. The handler is attached before the
/// client exists, so it receives the state through `Handler::attach` once
/// the client's HTTP handle is available.
///
/// Returns the client (to be started) and the state (shared with the timer
/// scheduler, which is spawned here).
pub async fn init_bot(
    config: &Config,
    db: DatabaseConnection,
) -> Result<(Client, AppState), AppError> {
    // GUILD_MEMBERS is privileged and must be enabled in the developer
    // portal.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_VOICE_STATES;

    let (scheduler, scheduler_rx) = SchedulerHandle::channel();
    let handler = Arc::new(Handler::new());

    let client = Client::builder(&config.discord_token, intents)
        .event_handler_arc(Arc::clone(&handler) as _)
        .await?;

    let discord: Arc<dyn DiscordActions> =
        Arc::new(HttpDiscord::new(Arc::clone(&client.http), Arc::clone(&client.cache)));
    let state = AppState {
        db,
        discord,
        guard: Arc::new(EntityGuard::new()),
        scheduler,
        bindings: Arc::new(BindingRegistry::new()),
    };

    handler.attach(state.clone());
    scheduler::spawn(scheduler_rx, Arc::new(state.clone()));

    Ok((client, state))
}

/// Starts the bot. Blocks until shutdown, so callers usually run it as the
/// final await of `main`.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    info!("starting Discord bot");
    client.start().await?;
    Ok(())
}
