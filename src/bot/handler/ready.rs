use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{ActivityData, Command, Context, Ready};
use tracing::{error, info};

use crate::bot::commands;
use crate::service::Reconciler;
use crate::state::AppState;

pub async fn handle_ready(
    state: &AppState,
    ctx: &Context,
    ready: Ready,
    reconciling: &AtomicBool,
) {
    info!("{} is connected to Discord", ready.user.name);

    ctx.set_activity(Some(ActivityData::watching("your tickets")));

    if let Err(e) = Command::set_global_commands(&ctx.http, commands::definitions()).await {
        error!("failed to register slash commands: {e:?}");
    }

    reconcile(state, reconciling).await;
}

/// Runs the reconciliation pass unless one is already in flight (a flapping
/// gateway can deliver ready/resume in quick succession).
pub async fn reconcile(state: &AppState, reconciling: &AtomicBool) {
    if reconciling.swap(true, Ordering::SeqCst) {
        info!("reconciliation already running, skipping");
        return;
    }

    if let Err(e) = Reconciler::new(state).run().await {
        error!("reconciliation failed: {e:?}");
    }

    reconciling.store(false, Ordering::SeqCst);
}
