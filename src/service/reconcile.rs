//! Startup reconciliation.
//!
//! Runs after every gateway (re)connect. Walks every non-terminal entity,
//! checks that its platform-side anchor still exists, re-registers component
//! bindings, and re-arms deadline timers from persisted `expires_at` values.
//! Entities whose anchor is gone are marked `orphaned` so nothing keeps
//! acting on them. All writes go through the version-guarded save; losing a
//! race to a live event is fine and the entity is simply skipped.

use tracing::{info, warn};

use crate::bot::router;
use crate::data::{
    GiveawayRepository, RoleMenuRepository, StoreError, TempVoiceRepository, TicketRepository,
};
use crate::error::AppError;
use crate::model::{decode_ids, GiveawayState, RoleMenuState, TempVoiceState, TicketState};
use crate::scheduler::TimerKey;
use crate::service::channel_id;
use crate::service::temp_voice::TempVoiceService;
use crate::state::AppState;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entities whose bindings were re-registered.
    pub restored: usize,
    pub orphaned: usize,
    pub timers_armed: usize,
}

pub struct Reconciler<'a> {
    state: &'a AppState,
}

impl<'a> Reconciler<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn run(&self) -> Result<ReconcileReport, AppError> {
        let mut report = ReconcileReport::default();
        self.reconcile_tickets(&mut report).await?;
        self.reconcile_role_menus(&mut report).await?;
        self.reconcile_temp_voice(&mut report).await?;
        self.reconcile_giveaways(&mut report).await?;
        info!(
            restored = report.restored,
            orphaned = report.orphaned,
            timers = report.timers_armed,
            "reconciliation complete"
        );
        Ok(report)
    }

    async fn reconcile_tickets(&self, report: &mut ReconcileReport) -> Result<(), AppError> {
        let repo = TicketRepository::new(&self.state.db);
        for ticket in repo.load_all_non_terminal().await? {
            let alive = match ticket.channel_id.as_deref() {
                // Stuck in `pending` means the process died between the
                // insert and the channel write-back.
                None => false,
                Some(raw) => self.channel_alive(raw).await?,
            };

            if alive {
                self.register_bindings(&ticket.bindings);
                report.restored += 1;
            } else {
                let id = ticket.id;
                let expected = ticket.version;
                let mut orphan = ticket;
                orphan.state = TicketState::Orphaned.as_str().to_string();
                if self.try_save(repo.save(orphan, expected).await, "ticket", id) {
                    report.orphaned += 1;
                }
            }
        }
        Ok(())
    }

    async fn reconcile_role_menus(&self, report: &mut ReconcileReport) -> Result<(), AppError> {
        let repo = RoleMenuRepository::new(&self.state.db);
        for menu in repo.load_all_non_terminal().await? {
            let alive = match (&menu.message_id, channel_id(&menu.channel_id)) {
                (Some(raw), Ok(channel)) => self.message_alive(channel, raw).await?,
                _ => false,
            };

            if alive && RoleMenuState::parse(&menu.state) == Some(RoleMenuState::Active) {
                self.register_bindings(&menu.bindings);
                report.restored += 1;
            } else {
                let id = menu.id;
                let expected = menu.version;
                let mut orphan = menu;
                orphan.state = RoleMenuState::Orphaned.as_str().to_string();
                if self.try_save(repo.save(orphan, expected).await, "role menu", id) {
                    report.orphaned += 1;
                }
            }
        }
        Ok(())
    }

    async fn reconcile_temp_voice(&self, report: &mut ReconcileReport) -> Result<(), AppError> {
        let repo = TempVoiceRepository::new(&self.state.db);
        let service = TempVoiceService::new(self.state);
        for channel in repo.load_all_non_terminal().await? {
            if self.channel_alive(&channel.channel_id).await? {
                // Occupancy may have changed while we were down; let the
                // regular transition re-derive the state and (re)arm the
                // grace timer.
                let parsed = channel_id(&channel.channel_id)?;
                service.on_occupancy_changed(parsed).await?;
                report.restored += 1;
                // Occupied channels come back `active` with no timer; only
                // a parked channel has a grace deadline armed.
                let parked = repo
                    .load(&channel.channel_id)
                    .await?
                    .and_then(|after| TempVoiceState::parse(&after.state))
                    == Some(TempVoiceState::PendingDelete);
                if parked {
                    report.timers_armed += 1;
                }
            } else {
                let key = channel.channel_id.clone();
                let expected = channel.version;
                let mut orphan = channel;
                orphan.state = TempVoiceState::Orphaned.as_str().to_string();
                orphan.expires_at = None;
                match repo.save(orphan, expected).await {
                    Ok(_) => {
                        self.state
                            .scheduler
                            .cancel(TimerKey::TempVoiceGrace { channel_id: key });
                        report.orphaned += 1;
                    }
                    Err(StoreError::VersionConflict { .. }) => {}
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(())
    }

    async fn reconcile_giveaways(&self, report: &mut ReconcileReport) -> Result<(), AppError> {
        let repo = GiveawayRepository::new(&self.state.db);
        for giveaway in repo.load_all_non_terminal().await? {
            let alive = match (&giveaway.message_id, channel_id(&giveaway.channel_id)) {
                (Some(raw), Ok(channel)) => self.message_alive(channel, raw).await?,
                _ => false,
            };

            if alive && GiveawayState::parse(&giveaway.state) == Some(GiveawayState::Active) {
                self.register_bindings(&giveaway.bindings);
                // An overdue deadline fires immediately and runs the draw.
                let due = giveaway.expires_at.unwrap_or_else(chrono::Utc::now);
                self.state
                    .scheduler
                    .arm(TimerKey::GiveawayEnd { giveaway_id: giveaway.id }, due);
                report.restored += 1;
                report.timers_armed += 1;
            } else {
                let id = giveaway.id;
                let expected = giveaway.version;
                let mut orphan = giveaway;
                orphan.state = GiveawayState::Orphaned.as_str().to_string();
                orphan.expires_at = None;
                if self.try_save(repo.save(orphan, expected).await, "giveaway", id) {
                    self.state
                        .scheduler
                        .cancel(TimerKey::GiveawayEnd { giveaway_id: id });
                    report.orphaned += 1;
                }
            }
        }
        Ok(())
    }

    fn register_bindings(&self, bindings: &serde_json::Value) {
        for custom_id in decode_ids(bindings) {
            match router::decode(&custom_id) {
                Some(target) => self.state.bindings.register(&custom_id, target),
                None => warn!(custom_id, "persisted binding failed to decode, skipping"),
            }
        }
    }

    async fn channel_alive(&self, raw: &str) -> Result<bool, AppError> {
        let channel = channel_id(raw)?;
        Ok(self.state.discord.channel_exists(channel).await?)
    }

    async fn message_alive(
        &self,
        channel: serenity::all::ChannelId,
        raw_message: &str,
    ) -> Result<bool, AppError> {
        let Some(message) = raw_message
            .parse::<u64>()
            .ok()
            .map(serenity::all::MessageId::new)
        else {
            return Ok(false);
        };
        Ok(self.state.discord.message_exists(channel, message).await?)
    }

    /// Lost CAS races during reconcile mean a live event already moved the
    /// entity; skip it. `kind` names the entity kind in logs.
    fn try_save<T>(&self, result: Result<T, StoreError>, kind: &str, id: i32) -> bool {
        match result {
            Ok(_) => true,
            Err(StoreError::VersionConflict { .. }) | Err(StoreError::NotFound { .. }) => {
                warn!(kind, id, "entity moved during reconcile, skipping");
                false
            }
            Err(err) => {
                warn!(kind, id, %err, "failed to orphan entity");
                false
            }
        }
    }
}
