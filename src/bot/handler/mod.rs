use std::sync::atomic::AtomicBool;
use std::sync::OnceLock;

use serenity::all::{
    Context, EventHandler, GuildId, Interaction, Member, Ready, ResumedEvent, User, VoiceState,
};
use serenity::async_trait;
use tracing::warn;

use crate::state::AppState;

pub mod interaction;
pub mod member;
pub mod ready;
pub mod voice;

/// Discord bot event handler. The shared state is attached after the client
/// (and therefore its HTTP handle) exists; gateway events cannot arrive
/// before `attach` because the client has not been started yet.
pub struct Handler {
    state: OnceLock<AppState>,
    reconciling: AtomicBool,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            state: OnceLock::new(),
            reconciling: AtomicBool::new(false),
        }
    }

    pub fn attach(&self, state: AppState) {
        if self.state.set(state).is_err() {
            warn!("handler state attached twice");
        }
    }

    fn state(&self) -> Option<&AppState> {
        self.state.get()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called once per gateway connect. Registers the slash commands and
    /// reconciles persisted entities against the platform.
    async fn ready(&self, ctx: Context, ready: Ready) {
        let Some(state) = self.state() else { return };
        ready::handle_ready(state, &ctx, ready, &self.reconciling).await;
    }

    /// Called after a session resume; entities may have changed while the
    /// gateway was away, so reconcile again.
    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        let Some(state) = self.state() else { return };
        ready::reconcile(state, &self.reconciling).await;
    }

    /// Slash commands and message components.
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(state) = self.state() else { return };
        interaction::handle_interaction(state, &ctx, interaction).await;
    }

    /// Voice occupancy drives the temp-channel state machine.
    async fn voice_state_update(&self, _ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(state) = self.state() else { return };
        voice::handle_voice_state_update(state, old, new).await;
    }

    /// A departed member releases their role-menu selections.
    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        let Some(state) = self.state() else { return };
        member::handle_member_removal(state, guild_id, user).await;
    }
}
