//! Temporary voice channels.
//!
//! Joining the configured creator channel spawns a personal channel owned by
//! the joiner. Occupancy drives the state machine: an emptied channel enters
//! `pending_delete` with a grace deadline, a join before the deadline cancels
//! it, and the grace timer firing deletes the channel after re-checking that
//! it is still empty.

use chrono::{Duration as ChronoDuration, Utc};
use serenity::all::{ChannelId, GuildId, PermissionOverwrite, PermissionOverwriteType, Permissions, UserId};
use tracing::{info, warn};

use crate::data::{GuildConfigRepository, StoreError, TempVoiceRepository};
use crate::error::AppError;
use crate::model::TempVoiceState;
use crate::scheduler::TimerKey;
use crate::service::{channel_id, guild_id, CAS_RETRIES};
use crate::state::AppState;
use crate::sync::keys;

/// How long an emptied channel survives before deletion.
pub const GRACE_PERIOD_SECS: i64 = 60;

const MAX_NAME_LEN: usize = 100;
pub const MAX_USER_LIMIT: u32 = 99;

pub struct TempVoiceService<'a> {
    state: &'a AppState,
}

impl<'a> TempVoiceService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> TempVoiceRepository<'a> {
        TempVoiceRepository::new(&self.state.db)
    }

    /// Entry point for gateway voice-state updates. Departures are handled
    /// before arrivals so a move between two managed channels settles both.
    pub async fn handle_voice_update(
        &self,
        guild: GuildId,
        user: UserId,
        display_name: &str,
        before: Option<ChannelId>,
        after: Option<ChannelId>,
    ) -> Result<(), AppError> {
        if before == after {
            return Ok(());
        }

        let config = GuildConfigRepository::new(&self.state.db)
            .get(&guild.to_string())
            .await?;
        let creator = config
            .as_ref()
            .and_then(|c| c.temp_voice_creator.as_deref())
            .map(channel_id)
            .transpose()?;

        if let Some(channel) = before {
            self.on_occupancy_changed(channel).await?;
        }

        if let Some(channel) = after {
            if creator == Some(channel) {
                let category = config
                    .as_ref()
                    .and_then(|c| c.temp_voice_category.as_deref())
                    .map(channel_id)
                    .transpose()?;
                match category {
                    Some(category) => {
                        self.spawn_channel(guild, user, display_name, category).await?
                    }
                    None => warn!(%guild, "temp voice creator set but category missing"),
                }
            } else {
                self.on_occupancy_changed(channel).await?;
            }
        }

        Ok(())
    }

    /// Creates a personal channel for `owner` and moves them into it. The
    /// channel exists before the record, so the channel id is the row key.
    async fn spawn_channel(
        &self,
        guild: GuildId,
        owner: UserId,
        display_name: &str,
        category: ChannelId,
    ) -> Result<(), AppError> {
        let mut name = format!("{display_name}'s Channel");
        if name.len() > MAX_NAME_LEN {
            // Byte 100 can land inside a multibyte character; back up to the
            // nearest boundary before cutting.
            let mut cut = MAX_NAME_LEN;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }

        let overwrites = vec![PermissionOverwrite {
            allow: Permissions::CONNECT
                | Permissions::MANAGE_CHANNELS
                | Permissions::MOVE_MEMBERS
                | Permissions::MUTE_MEMBERS
                | Permissions::DEAFEN_MEMBERS,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(owner),
        }];

        let channel = self
            .state
            .discord
            .create_voice_channel(guild, &name, category, overwrites)
            .await?;

        if let Err(err) = self
            .repo()
            .create(
                &channel.to_string(),
                &guild.to_string(),
                &owner.to_string(),
                &category.to_string(),
            )
            .await
        {
            // Without a record the channel would leak forever.
            if let Err(cleanup) = self.state.discord.delete_channel(channel).await {
                warn!(%channel, %cleanup, "failed to delete unrecorded temp channel");
            }
            return Err(err.into());
        }

        info!(%channel, owner = %owner, "spawned temp voice channel");

        // The member may already have left the creator channel; their next
        // join still works, so a failed move is not fatal.
        if let Err(err) = self.state.discord.move_member(guild, owner, channel).await {
            warn!(%channel, %err, "failed to move owner into their channel");
        }

        Ok(())
    }

    /// Re-derives the channel's state from current occupancy: empty arms the
    /// grace timer, occupied cancels it. Called for joins, leaves, and by the
    /// reconciliation pass.
    pub async fn on_occupancy_changed(&self, channel: ChannelId) -> Result<(), AppError> {
        let key = channel.to_string();
        self.state
            .guard
            .with_lock(&keys::temp_voice(&key), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut model) = self.repo().load(&key).await? else {
                        return Ok(());
                    };
                    let state = TempVoiceState::parse(&model.state).ok_or_else(|| {
                        AppError::InternalError(format!("temp voice {key} has unknown state"))
                    })?;
                    if state.is_terminal() {
                        return Ok(());
                    }

                    let guild = guild_id(&model.guild_id)?;
                    let occupants = self.state.discord.voice_occupants(guild, channel).await?;

                    match (state, occupants.is_empty()) {
                        (TempVoiceState::Active, true) => {
                            let deadline = Utc::now() + ChronoDuration::seconds(GRACE_PERIOD_SECS);
                            let expected = model.version;
                            model.state = TempVoiceState::PendingDelete.as_str().to_string();
                            model.expires_at = Some(deadline);
                            match self.repo().save(model, expected).await {
                                Ok(_) => {
                                    self.state.scheduler.arm(
                                        TimerKey::TempVoiceGrace {
                                            channel_id: key.clone(),
                                        },
                                        deadline,
                                    );
                                    return Ok(());
                                }
                                Err(StoreError::VersionConflict { .. }) => continue,
                                Err(err) => return Err(err.into()),
                            }
                        }
                        (TempVoiceState::PendingDelete, false) => {
                            let expected = model.version;
                            model.state = TempVoiceState::Active.as_str().to_string();
                            model.expires_at = None;
                            match self.repo().save(model, expected).await {
                                Ok(_) => {
                                    self.state.scheduler.cancel(TimerKey::TempVoiceGrace {
                                        channel_id: key.clone(),
                                    });
                                    return Ok(());
                                }
                                Err(StoreError::VersionConflict { .. }) => continue,
                                Err(err) => return Err(err.into()),
                            }
                        }
                        (TempVoiceState::PendingDelete, true) => {
                            // Still empty; make sure the timer survives a
                            // restart by re-arming at the persisted deadline.
                            let deadline = model.expires_at.unwrap_or_else(Utc::now);
                            self.state.scheduler.arm(
                                TimerKey::TempVoiceGrace {
                                    channel_id: key.clone(),
                                },
                                deadline,
                            );
                            return Ok(());
                        }
                        _ => return Ok(()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "temp voice {key} kept conflicting during occupancy update"
                )))
            })
            .await
    }

    /// Grace deadline fired. Deletes the channel only if it is still
    /// `pending_delete` and still empty; a join that slipped in between
    /// returns it to `active` instead.
    pub async fn on_grace_elapsed(&self, channel_key: &str) -> Result<(), AppError> {
        let channel = channel_id(channel_key)?;
        self.state
            .guard
            .with_lock(&keys::temp_voice(channel_key), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut model) = self.repo().load(channel_key).await? else {
                        return Ok(());
                    };
                    if TempVoiceState::parse(&model.state) != Some(TempVoiceState::PendingDelete) {
                        return Ok(());
                    }

                    let guild = guild_id(&model.guild_id)?;
                    let occupants = self.state.discord.voice_occupants(guild, channel).await?;
                    let expected = model.version;

                    if occupants.is_empty() {
                        model.state = TempVoiceState::Deleted.as_str().to_string();
                        model.expires_at = None;
                        match self.repo().save(model, expected).await {
                            Ok(_) => {
                                match self.state.discord.delete_channel(channel).await {
                                    Ok(()) | Err(crate::discord::ActionError::NotFound) => {}
                                    Err(err) => {
                                        warn!(%channel, %err, "failed to delete temp channel")
                                    }
                                }
                                info!(%channel, "temp voice channel expired");
                                return Ok(());
                            }
                            Err(StoreError::VersionConflict { .. }) => continue,
                            Err(err) => return Err(err.into()),
                        }
                    } else {
                        model.state = TempVoiceState::Active.as_str().to_string();
                        model.expires_at = None;
                        match self.repo().save(model, expected).await {
                            Ok(_) => return Ok(()),
                            Err(StoreError::VersionConflict { .. }) => continue,
                            Err(err) => return Err(err.into()),
                        }
                    }
                }

                Err(AppError::InternalError(format!(
                    "temp voice {channel_key} kept conflicting during grace expiry"
                )))
            })
            .await
    }

    /// Transfers ownership to `claimant`. Allowed only while the claimant is
    /// in the channel and the current owner is not.
    pub async fn claim(&self, channel: ChannelId, claimant: UserId) -> Result<(), AppError> {
        let key = channel.to_string();
        self.state
            .guard
            .with_lock(&keys::temp_voice(&key), async {
                let Some(mut model) = self.repo().load(&key).await? else {
                    return Err(AppError::NotFound(
                        "This is not a managed voice channel.".to_string(),
                    ));
                };
                let state = TempVoiceState::parse(&model.state).ok_or_else(|| {
                    AppError::InternalError(format!("temp voice {key} has unknown state"))
                })?;
                if state.is_terminal() {
                    return Err(AppError::NotFound(
                        "This is not a managed voice channel.".to_string(),
                    ));
                }

                let guild = guild_id(&model.guild_id)?;
                let occupants = self.state.discord.voice_occupants(guild, channel).await?;
                if !occupants.contains(&claimant) {
                    return Err(AppError::InvalidInput(
                        "Join the channel before claiming it.".to_string(),
                    ));
                }
                let owner = model.owner_id.parse::<u64>().map(UserId::new).map_err(|_| {
                    AppError::InternalError(format!("temp voice {key} has bad owner id"))
                })?;
                if occupants.contains(&owner) {
                    return Err(AppError::InvalidInput(
                        "The owner is still in the channel.".to_string(),
                    ));
                }

                let previous_owner = model.owner_id.clone();
                let expected = model.version;
                model.owner_id = claimant.to_string();
                model.state = TempVoiceState::Active.as_str().to_string();
                model.expires_at = None;
                let saved = self.repo().save(model, expected).await?;

                if state == TempVoiceState::PendingDelete {
                    self.state
                        .scheduler
                        .cancel(TimerKey::TempVoiceGrace { channel_id: key.clone() });
                }

                if let Err(err) = self.state.discord.grant_channel_owner(channel, claimant).await {
                    // Put ownership back so the record matches who actually
                    // controls the channel.
                    let mut restore = saved;
                    let expected = restore.version;
                    restore.owner_id = previous_owner;
                    if let Err(rollback) = self.repo().save(restore, expected).await {
                        warn!(%channel, %rollback, "claim rollback failed");
                    }
                    return Err(err.into());
                }

                Ok(())
            })
            .await
    }

    /// Denies or restores @everyone's `CONNECT`. Owner only.
    pub async fn set_locked(
        &self,
        channel: ChannelId,
        invoker: UserId,
        locked: bool,
    ) -> Result<(), AppError> {
        let key = channel.to_string();
        self.state
            .guard
            .with_lock(&keys::temp_voice(&key), async {
                let mut model = self.load_owned(&key, invoker).await?;
                let previous = model.locked;
                let expected = model.version;
                model.locked = locked;
                let guild = guild_id(&model.guild_id)?;
                let saved = self.repo().save(model, expected).await?;

                if let Err(err) = self
                    .state
                    .discord
                    .set_channel_locked(guild, channel, locked)
                    .await
                {
                    let mut restore = saved;
                    let expected = restore.version;
                    restore.locked = previous;
                    if let Err(rollback) = self.repo().save(restore, expected).await {
                        warn!(%channel, %rollback, "lock rollback failed");
                    }
                    return Err(err.into());
                }

                Ok(())
            })
            .await
    }

    /// Sets the voice user limit (0 means unlimited). Owner only.
    pub async fn set_limit(
        &self,
        channel: ChannelId,
        invoker: UserId,
        limit: u32,
    ) -> Result<(), AppError> {
        if limit > MAX_USER_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "User limit must be between 0 and {MAX_USER_LIMIT}."
            )));
        }

        let key = channel.to_string();
        self.state
            .guard
            .with_lock(&keys::temp_voice(&key), async {
                let mut model = self.load_owned(&key, invoker).await?;
                let previous = model.user_limit;
                let expected = model.version;
                model.user_limit = limit as i32;
                let saved = self.repo().save(model, expected).await?;

                if let Err(err) = self.state.discord.set_user_limit(channel, limit).await {
                    let mut restore = saved;
                    let expected = restore.version;
                    restore.user_limit = previous;
                    if let Err(rollback) = self.repo().save(restore, expected).await {
                        warn!(%channel, %rollback, "limit rollback failed");
                    }
                    return Err(err.into());
                }

                Ok(())
            })
            .await
    }

    /// Renames the channel. Owner only; the name is not persisted.
    pub async fn rename(
        &self,
        channel: ChannelId,
        invoker: UserId,
        name: &str,
    ) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Channel names must be 1 to {MAX_NAME_LEN} characters."
            )));
        }

        let key = channel.to_string();
        self.load_owned(&key, invoker).await?;
        Ok(self.state.discord.rename_channel(channel, name).await?)
    }

    async fn load_owned(
        &self,
        key: &str,
        invoker: UserId,
    ) -> Result<entity::temp_voice::Model, AppError> {
        let Some(model) = self.repo().load(key).await? else {
            return Err(AppError::NotFound(
                "This is not a managed voice channel.".to_string(),
            ));
        };
        let state = TempVoiceState::parse(&model.state).ok_or_else(|| {
            AppError::InternalError(format!("temp voice {key} has unknown state"))
        })?;
        if state.is_terminal() {
            return Err(AppError::NotFound(
                "This is not a managed voice channel.".to_string(),
            ));
        }
        if model.owner_id != invoker.to_string() {
            return Err(AppError::InvalidInput(
                "Only the channel owner can do that.".to_string(),
            ));
        }
        Ok(model)
    }
}
