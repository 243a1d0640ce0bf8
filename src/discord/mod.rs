//! Platform-action facade over the Discord HTTP API.
//!
//! Lifecycle services never touch Serenity's HTTP client directly; they go
//! through the `DiscordActions` trait so transitions can be exercised in
//! tests with a recording mock. The production implementation (`HttpDiscord`)
//! maps Discord's failure modes onto `ActionError` and retries rate limits
//! with bounded exponential backoff.

pub mod http;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use serenity::all::{
    ChannelId, CreateActionRow, GuildId, MessageId, PermissionOverwrite, RoleId, UserId,
};
use serenity::async_trait;
use thiserror::Error;
use tracing::warn;

pub use http::HttpDiscord;

#[derive(Error, Debug, Clone)]
pub enum ActionError {
    /// The bot lacks permission for the attempted action. Fatal for the
    /// action; entity state is left unchanged.
    #[error("missing permission for Discord action")]
    PermissionDenied,

    /// The platform-side object (channel, message) no longer exists. Callers
    /// mark the owning entity orphaned instead of retrying forever.
    #[error("Discord object not found")]
    NotFound,

    /// Rate limited by Discord. Retried by `with_retry`; surfaces only once
    /// the bounded retries are exhausted.
    #[error("rate limited by Discord")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Discord API error: {0}")]
    Other(String),
}

/// The platform actions the lifecycle engine needs. One method per side
/// effect; every method is idempotence-friendly (deleting a gone channel
/// reports `NotFound`, which callers treat as already-done where sensible).
#[async_trait]
pub trait DiscordActions: Send + Sync {
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: ChannelId,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError>;

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: ChannelId,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ActionError>;

    async fn assign_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError>;

    async fn revoke_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError>;

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        components: Vec<CreateActionRow>,
    ) -> Result<MessageId, ActionError>;

    async fn edit_message_components(
        &self,
        channel: ChannelId,
        message: MessageId,
        components: Vec<CreateActionRow>,
    ) -> Result<(), ActionError>;

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, ActionError>;

    async fn message_exists(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<bool, ActionError>;

    /// Denies (or restores) the `CONNECT` permission for @everyone.
    async fn set_channel_locked(
        &self,
        guild: GuildId,
        channel: ChannelId,
        locked: bool,
    ) -> Result<(), ActionError>;

    async fn set_user_limit(&self, channel: ChannelId, limit: u32) -> Result<(), ActionError>;

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), ActionError>;

    async fn move_member(
        &self,
        guild: GuildId,
        user: UserId,
        channel: ChannelId,
    ) -> Result<(), ActionError>;

    /// Grants a member the owner permission set on a temp voice channel.
    async fn grant_channel_owner(
        &self,
        channel: ChannelId,
        user: UserId,
    ) -> Result<(), ActionError>;

    /// Current occupants of a voice channel, from the gateway cache.
    async fn voice_occupants(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Vec<UserId>, ActionError>;
}

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Runs a Discord call, retrying rate limits with exponential backoff up to
/// `MAX_ATTEMPTS`. All other errors return immediately.
pub async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> Result<T, ActionError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ActionError>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;

    loop {
        match op().await {
            Err(ActionError::RateLimited { retry_after }) if attempt < MAX_ATTEMPTS => {
                let wait = retry_after.unwrap_or(backoff);
                warn!(
                    op = op_name,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                backoff *= 2;
                attempt += 1;
            }
            other => return other,
        }
    }
}
