//! Recording mock of the platform-action facade for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serenity::all::{
    ChannelId, CreateActionRow, GuildId, MessageId, PermissionOverwrite, RoleId, UserId,
};
use serenity::async_trait;

use crate::discord::{ActionError, DiscordActions};

/// One recorded facade call, with the arguments tests care about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CreateTextChannel { guild: GuildId, name: String },
    CreateVoiceChannel { guild: GuildId, name: String },
    DeleteChannel { channel: ChannelId },
    AssignRole { user: UserId, role: RoleId },
    RevokeRole { user: UserId, role: RoleId },
    SendMessage { channel: ChannelId, content: String },
    EditMessageComponents { channel: ChannelId, message: MessageId },
    SetChannelLocked { channel: ChannelId, locked: bool },
    SetUserLimit { channel: ChannelId, limit: u32 },
    RenameChannel { channel: ChannelId, name: String },
    MoveMember { user: UserId, channel: ChannelId },
    GrantChannelOwner { channel: ChannelId, user: UserId },
}

#[derive(Default)]
pub struct MockDiscord {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    fail_ops: Mutex<HashMap<String, ActionError>>,
    missing_channels: Mutex<HashSet<ChannelId>>,
    missing_messages: Mutex<HashSet<(ChannelId, MessageId)>>,
    occupants: Mutex<HashMap<ChannelId, Vec<UserId>>>,
}

impl MockDiscord {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(9000),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    /// Makes every subsequent call of the named operation fail.
    pub fn fail_op(&self, op: &str, err: ActionError) {
        self.fail_ops.lock().unwrap().insert(op.to_string(), err);
    }

    pub fn clear_failure(&self, op: &str) {
        self.fail_ops.lock().unwrap().remove(op);
    }

    /// Marks a channel as gone, so `channel_exists` reports false and
    /// channel-scoped actions fail with `NotFound`.
    pub fn remove_channel(&self, channel: ChannelId) {
        self.missing_channels.lock().unwrap().insert(channel);
    }

    pub fn remove_message(&self, channel: ChannelId, message: MessageId) {
        self.missing_messages.lock().unwrap().insert((channel, message));
    }

    pub fn set_occupants(&self, channel: ChannelId, users: Vec<UserId>) {
        self.occupants.lock().unwrap().insert(channel, users);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &str) -> Result<(), ActionError> {
        if let Some(err) = self.fail_ops.lock().unwrap().get(op) {
            return Err(err.clone());
        }
        Ok(())
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscordActions for MockDiscord {
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        _category: ChannelId,
        _overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError> {
        self.check("create_text_channel")?;
        self.record(Call::CreateTextChannel {
            guild,
            name: name.to_string(),
        });
        Ok(ChannelId::new(self.fresh_id()))
    }

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
        _category: ChannelId,
        _overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError> {
        self.check("create_voice_channel")?;
        self.record(Call::CreateVoiceChannel {
            guild,
            name: name.to_string(),
        });
        Ok(ChannelId::new(self.fresh_id()))
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ActionError> {
        self.check("delete_channel")?;
        if self.missing_channels.lock().unwrap().contains(&channel) {
            return Err(ActionError::NotFound);
        }
        self.record(Call::DeleteChannel { channel });
        Ok(())
    }

    async fn assign_role(
        &self,
        _guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError> {
        self.check("assign_role")?;
        self.record(Call::AssignRole { user, role });
        Ok(())
    }

    async fn revoke_role(
        &self,
        _guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError> {
        self.check("revoke_role")?;
        self.record(Call::RevokeRole { user, role });
        Ok(())
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        _components: Vec<CreateActionRow>,
    ) -> Result<MessageId, ActionError> {
        self.check("send_message")?;
        self.record(Call::SendMessage {
            channel,
            content: content.to_string(),
        });
        Ok(MessageId::new(self.fresh_id()))
    }

    async fn edit_message_components(
        &self,
        channel: ChannelId,
        message: MessageId,
        _components: Vec<CreateActionRow>,
    ) -> Result<(), ActionError> {
        self.check("edit_message_components")?;
        if self
            .missing_messages
            .lock()
            .unwrap()
            .contains(&(channel, message))
        {
            return Err(ActionError::NotFound);
        }
        self.record(Call::EditMessageComponents { channel, message });
        Ok(())
    }

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, ActionError> {
        self.check("channel_exists")?;
        Ok(!self.missing_channels.lock().unwrap().contains(&channel))
    }

    async fn message_exists(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<bool, ActionError> {
        self.check("message_exists")?;
        Ok(!self
            .missing_messages
            .lock()
            .unwrap()
            .contains(&(channel, message)))
    }

    async fn set_channel_locked(
        &self,
        _guild: GuildId,
        channel: ChannelId,
        locked: bool,
    ) -> Result<(), ActionError> {
        self.check("set_channel_locked")?;
        self.record(Call::SetChannelLocked { channel, locked });
        Ok(())
    }

    async fn set_user_limit(&self, channel: ChannelId, limit: u32) -> Result<(), ActionError> {
        self.check("set_user_limit")?;
        self.record(Call::SetUserLimit { channel, limit });
        Ok(())
    }

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), ActionError> {
        self.check("rename_channel")?;
        self.record(Call::RenameChannel {
            channel,
            name: name.to_string(),
        });
        Ok(())
    }

    async fn move_member(
        &self,
        _guild: GuildId,
        user: UserId,
        channel: ChannelId,
    ) -> Result<(), ActionError> {
        self.check("move_member")?;
        self.record(Call::MoveMember { user, channel });
        Ok(())
    }

    async fn grant_channel_owner(
        &self,
        channel: ChannelId,
        user: UserId,
    ) -> Result<(), ActionError> {
        self.check("grant_channel_owner")?;
        self.record(Call::GrantChannelOwner { channel, user });
        Ok(())
    }

    async fn voice_occupants(
        &self,
        _guild: GuildId,
        channel: ChannelId,
    ) -> Result<Vec<UserId>, ActionError> {
        self.check("voice_occupants")?;
        Ok(self
            .occupants
            .lock()
            .unwrap()
            .get(&channel)
            .cloned()
            .unwrap_or_default())
    }
}
