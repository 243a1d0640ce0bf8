use serenity::all::VoiceState;
use tracing::error;

use crate::service::TempVoiceService;
use crate::state::AppState;

/// Feeds gateway voice updates into the temp-channel service: joining the
/// creator channel spawns a personal channel, and every join/leave of a
/// managed channel re-derives its occupancy state.
pub async fn handle_voice_state_update(
    state: &AppState,
    old: Option<VoiceState>,
    new: VoiceState,
) {
    let Some(guild) = new.guild_id else { return };
    let before = old.and_then(|s| s.channel_id);
    let after = new.channel_id;
    let display_name = new
        .member
        .as_ref()
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| new.user_id.to_string());

    if let Err(e) = TempVoiceService::new(state)
        .handle_voice_update(guild, new.user_id, &display_name, before, after)
        .await
    {
        error!(user = %new.user_id, "voice update failed: {e:?}");
    }
}
