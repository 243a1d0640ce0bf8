use std::sync::Arc;

use serenity::all::{
    ChannelId, ChannelType, CreateActionRow, CreateChannel, CreateMessage, EditChannel,
    EditMember, EditMessage, GuildId, MessageId, PermissionOverwrite, PermissionOverwriteType,
    Permissions, RoleId, UserId,
};
use serenity::async_trait;
use serenity::cache::Cache;
use serenity::http::{Http, HttpError};

use crate::discord::{with_retry, ActionError, DiscordActions};

/// Production facade over Serenity's HTTP client and gateway cache.
pub struct HttpDiscord {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl HttpDiscord {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    /// Permission set granted to the owner of a temp voice channel.
    fn owner_permissions() -> Permissions {
        Permissions::CONNECT
            | Permissions::MANAGE_CHANNELS
            | Permissions::MOVE_MEMBERS
            | Permissions::MUTE_MEMBERS
            | Permissions::DEAFEN_MEMBERS
    }
}

fn map_err(err: serenity::Error) -> ActionError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref response)) = err {
        return match response.status_code.as_u16() {
            403 => ActionError::PermissionDenied,
            404 => ActionError::NotFound,
            429 => ActionError::RateLimited { retry_after: None },
            _ => ActionError::Other(err.to_string()),
        };
    }

    ActionError::Other(err.to_string())
}

#[async_trait]
impl DiscordActions for HttpDiscord {
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: ChannelId,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError> {
        with_retry("create_text_channel", || async {
            guild
                .create_channel(
                    &*self.http,
                    CreateChannel::new(name)
                        .kind(ChannelType::Text)
                        .category(category)
                        .permissions(overwrites.clone()),
                )
                .await
                .map(|channel| channel.id)
                .map_err(map_err)
        })
        .await
    }

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
        category: ChannelId,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, ActionError> {
        with_retry("create_voice_channel", || async {
            guild
                .create_channel(
                    &*self.http,
                    CreateChannel::new(name)
                        .kind(ChannelType::Voice)
                        .category(category)
                        .permissions(overwrites.clone()),
                )
                .await
                .map(|channel| channel.id)
                .map_err(map_err)
        })
        .await
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ActionError> {
        with_retry("delete_channel", || async {
            channel.delete(&*self.http).await.map(|_| ()).map_err(map_err)
        })
        .await
    }

    async fn assign_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError> {
        with_retry("assign_role", || async {
            self.http
                .add_member_role(guild, user, role, Some("role menu selection"))
                .await
                .map_err(map_err)
        })
        .await
    }

    async fn revoke_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), ActionError> {
        with_retry("revoke_role", || async {
            self.http
                .remove_member_role(guild, user, role, Some("role menu deselection"))
                .await
                .map_err(map_err)
        })
        .await
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        components: Vec<CreateActionRow>,
    ) -> Result<MessageId, ActionError> {
        with_retry("send_message", || async {
            let mut message = CreateMessage::new().content(content);
            if !components.is_empty() {
                message = message.components(components.clone());
            }
            channel
                .send_message(&*self.http, message)
                .await
                .map(|sent| sent.id)
                .map_err(map_err)
        })
        .await
    }

    async fn edit_message_components(
        &self,
        channel: ChannelId,
        message: MessageId,
        components: Vec<CreateActionRow>,
    ) -> Result<(), ActionError> {
        with_retry("edit_message_components", || async {
            channel
                .edit_message(
                    &*self.http,
                    message,
                    EditMessage::new().components(components.clone()),
                )
                .await
                .map(|_| ())
                .map_err(map_err)
        })
        .await
    }

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, ActionError> {
        match self.http.get_channel(channel).await {
            Ok(_) => Ok(true),
            Err(err) => match map_err(err) {
                ActionError::NotFound => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn message_exists(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<bool, ActionError> {
        match self.http.get_message(channel, message).await {
            Ok(_) => Ok(true),
            Err(err) => match map_err(err) {
                ActionError::NotFound => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn set_channel_locked(
        &self,
        guild: GuildId,
        channel: ChannelId,
        locked: bool,
    ) -> Result<(), ActionError> {
        // The @everyone role id equals the guild id.
        let everyone = RoleId::new(guild.get());
        let overwrite = if locked {
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::CONNECT,
                kind: PermissionOverwriteType::Role(everyone),
            }
        } else {
            PermissionOverwrite {
                allow: Permissions::CONNECT,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(everyone),
            }
        };

        with_retry("set_channel_locked", || async {
            let fetched = self.http.get_channel(channel).await.map_err(map_err)?;
            let guild_channel = fetched.guild().ok_or(ActionError::NotFound)?;
            guild_channel
                .create_permission(&*self.http, overwrite.clone())
                .await
                .map_err(map_err)
        })
        .await
    }

    async fn set_user_limit(&self, channel: ChannelId, limit: u32) -> Result<(), ActionError> {
        with_retry("set_user_limit", || async {
            channel
                .edit(&*self.http, EditChannel::new().user_limit(limit))
                .await
                .map(|_| ())
                .map_err(map_err)
        })
        .await
    }

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), ActionError> {
        with_retry("rename_channel", || async {
            channel
                .edit(&*self.http, EditChannel::new().name(name))
                .await
                .map(|_| ())
                .map_err(map_err)
        })
        .await
    }

    async fn move_member(
        &self,
        guild: GuildId,
        user: UserId,
        channel: ChannelId,
    ) -> Result<(), ActionError> {
        with_retry("move_member", || async {
            guild
                .edit_member(&*self.http, user, EditMember::new().voice_channel(channel))
                .await
                .map(|_| ())
                .map_err(map_err)
        })
        .await
    }

    async fn grant_channel_owner(
        &self,
        channel: ChannelId,
        user: UserId,
    ) -> Result<(), ActionError> {
        let overwrite = PermissionOverwrite {
            allow: Self::owner_permissions(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(user),
        };

        with_retry("grant_channel_owner", || async {
            let fetched = self.http.get_channel(channel).await.map_err(map_err)?;
            let guild_channel = fetched.guild().ok_or(ActionError::NotFound)?;
            guild_channel
                .create_permission(&*self.http, overwrite.clone())
                .await
                .map_err(map_err)
        })
        .await
    }

    async fn voice_occupants(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Vec<UserId>, ActionError> {
        let Some(guild_ref) = self.cache.guild(guild) else {
            return Ok(Vec::new());
        };

        Ok(guild_ref
            .voice_states
            .iter()
            .filter(|(_, state)| state.channel_id == Some(channel))
            .map(|(user_id, _)| *user_id)
            .collect())
    }
}
