//! Shared application state threaded through the bot handlers, the
//! lifecycle services, and the timer scheduler.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::async_trait;
use tracing::error;

use crate::bot::registry::BindingRegistry;
use crate::discord::DiscordActions;
use crate::scheduler::{SchedulerHandle, TimerHandler, TimerKey};
use crate::service::{GiveawayService, TempVoiceService};
use crate::sync::EntityGuard;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub discord: Arc<dyn DiscordActions>,
    pub guard: Arc<EntityGuard>,
    pub scheduler: SchedulerHandle,
    pub bindings: Arc<BindingRegistry>,
}

/// Timer dispatch. Each due timer runs the same service transition a user
/// event would, so guard keys and version checks apply identically.
#[async_trait]
impl TimerHandler for AppState {
    async fn on_due(&self, key: TimerKey) {
        let result = match &key {
            TimerKey::GiveawayEnd { giveaway_id } => {
                GiveawayService::new(self).on_deadline(*giveaway_id).await
            }
            TimerKey::TempVoiceGrace { channel_id } => {
                TempVoiceService::new(self).on_grace_elapsed(channel_id).await
            }
        };

        if let Err(err) = result {
            error!(?key, %err, "timer transition failed");
        }
    }
}
