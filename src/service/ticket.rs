//! Support ticket lifecycle.
//!
//! A ticket is born `pending` (row first, channel second), becomes `open`
//! once its channel exists, and closes exactly once no matter how many close
//! requests race. Closing deletes the channel and writes one log line.

use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateButton, GuildId, MessageId,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::warn;

use crate::bot::router::{self, ComponentTarget};
use crate::data::{GuildConfigRepository, StoreError, TicketRepository};
use crate::error::AppError;
use crate::model::{encode_ids, TicketState};
use crate::service::{channel_id, CAS_RETRIES};
use crate::state::AppState;
use crate::sync::keys;

/// Result of a close request. `AlreadyClosed` is the idempotent no-op path:
/// the ticket reached `closed` before this request got the lock.
pub enum CloseOutcome {
    Closed(entity::ticket::Model),
    AlreadyClosed(entity::ticket::Model),
}

pub struct TicketService<'a> {
    state: &'a AppState,
}

impl<'a> TicketService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> TicketRepository<'a> {
        TicketRepository::new(&self.state.db)
    }

    /// Posts the ticket panel (the message with the "Open Ticket" button)
    /// into `channel`. Requires the guild's ticket config to exist.
    pub async fn post_panel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<MessageId, AppError> {
        let config = GuildConfigRepository::new(&self.state.db)
            .get(&guild.to_string())
            .await?;
        if config.and_then(|c| c.ticket_category).is_none() {
            return Err(AppError::InvalidInput(
                "Run /ticket-setup before posting a panel.".to_string(),
            ));
        }

        let button = CreateButton::new(router::ticket_create_id())
            .label("Open Ticket")
            .style(ButtonStyle::Primary);
        let message = self
            .state
            .discord
            .send_message(
                channel,
                "Need help? Press the button below to open a private ticket.",
                vec![CreateActionRow::Buttons(vec![button])],
            )
            .await?;

        self.state
            .bindings
            .register(&router::ticket_create_id(), ComponentTarget::TicketCreate);

        Ok(message)
    }

    /// Opens a ticket for `user`: inserts the `pending` row, creates the
    /// private channel, then confirms the row as `open` with the channel id
    /// written back. One open ticket per user per guild.
    pub async fn create(&self, guild: GuildId, user: UserId) -> Result<ChannelId, AppError> {
        let config = GuildConfigRepository::new(&self.state.db)
            .get(&guild.to_string())
            .await?
            .filter(|c| c.ticket_category.is_some())
            .ok_or_else(|| {
                AppError::InvalidInput("The ticket system is not set up on this server.".to_string())
            })?;
        let category = config
            .ticket_category
            .as_deref()
            .map(channel_id)
            .transpose()?
            .ok_or_else(|| AppError::InternalError("ticket category vanished".to_string()))?;

        if let Some(existing) = self
            .repo()
            .find_open_by_owner(&guild.to_string(), &user.to_string())
            .await?
        {
            let mention = existing
                .channel_id
                .map(|id| format!(" <#{id}>"))
                .unwrap_or_default();
            return Err(AppError::InvalidInput(format!(
                "You already have an open ticket:{mention}"
            )));
        }

        let mut ticket = self
            .repo()
            .create(
                &guild.to_string(),
                &user.to_string(),
                config.ticket_log_channel.clone(),
            )
            .await?;

        let mut overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(guild.get())),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(user),
            },
        ];
        if let Some(role) = config.support_role.as_deref() {
            overwrites.push(PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(crate::service::role_id(role)?),
            });
        }

        let channel = match self
            .state
            .discord
            .create_text_channel(guild, &format!("ticket-{}", ticket.id), category, overwrites)
            .await
        {
            Ok(channel) => channel,
            Err(err) => {
                // The record never left `pending`; drop it rather than
                // leaving a row the reconciler would orphan later.
                if let Err(cleanup) = self.repo().delete(ticket.id).await {
                    warn!(ticket = ticket.id, %cleanup, "failed to drop pending ticket");
                }
                return Err(err.into());
            }
        };

        let close_id = router::ticket_close_id(ticket.id);
        ticket.channel_id = Some(channel.to_string());
        ticket.state = TicketState::Open.as_str().to_string();
        ticket.bindings = encode_ids(std::slice::from_ref(&close_id));
        let ticket = self.repo().save(ticket, 1).await?;

        self.state.bindings.register(
            &close_id,
            ComponentTarget::TicketClose { ticket_id: ticket.id },
        );

        let close_button = CreateButton::new(close_id)
            .label("Close Ticket")
            .style(ButtonStyle::Danger);
        if let Err(err) = self
            .state
            .discord
            .send_message(
                channel,
                &format!("<@{user}> Support will be with you shortly."),
                vec![CreateActionRow::Buttons(vec![close_button])],
            )
            .await
        {
            warn!(ticket = ticket.id, %err, "failed to post ticket greeting");
        }

        self.log(&ticket, &format!("Ticket #{} opened by <@{user}>", ticket.id))
            .await;

        Ok(channel)
    }

    /// Closes a ticket. One-way: once `closed`, every later request is a
    /// no-op reporting `AlreadyClosed`. The channel is deleted and the log
    /// line written only by the request that wins the transition.
    pub async fn close(
        &self,
        ticket_id: i32,
        closed_by: UserId,
        reason: Option<&str>,
        is_staff: bool,
    ) -> Result<CloseOutcome, AppError> {
        self.state
            .guard
            .with_lock(&keys::ticket(ticket_id), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut ticket) = self.repo().load(ticket_id).await? else {
                        return Err(AppError::NotFound("Ticket not found.".to_string()));
                    };
                    let state = TicketState::parse(&ticket.state).ok_or_else(|| {
                        AppError::InternalError(format!("ticket {ticket_id} has unknown state"))
                    })?;

                    match state {
                        TicketState::Closed => return Ok(CloseOutcome::AlreadyClosed(ticket)),
                        TicketState::Orphaned => {
                            return Err(AppError::NotFound("Ticket not found.".to_string()))
                        }
                        TicketState::Pending | TicketState::Open => {}
                    }

                    if closed_by.to_string() != ticket.owner_id && !is_staff {
                        return Err(AppError::InvalidInput(
                            "Only the ticket owner or support staff can close this ticket."
                                .to_string(),
                        ));
                    }

                    let expected = ticket.version;
                    ticket.state = TicketState::Closed.as_str().to_string();
                    ticket.closed_by = Some(closed_by.to_string());
                    ticket.close_reason = reason.map(str::to_string);
                    ticket.bindings = encode_ids(&[]);

                    match self.repo().save(ticket, expected).await {
                        Ok(ticket) => {
                            self.finish_close(&ticket, closed_by, reason).await;
                            return Ok(CloseOutcome::Closed(ticket));
                        }
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "ticket {ticket_id} kept conflicting during close"
                )))
            })
            .await
    }

    /// Side effects of a won close transition. Failures degrade to warnings:
    /// the persisted state is already `closed` and the reconciler can sweep
    /// up a lingering channel.
    async fn finish_close(
        &self,
        ticket: &entity::ticket::Model,
        closed_by: UserId,
        reason: Option<&str>,
    ) {
        self.state
            .bindings
            .unregister(&router::ticket_close_id(ticket.id));

        if let Some(raw) = ticket.channel_id.as_deref() {
            match channel_id(raw) {
                Ok(channel) => match self.state.discord.delete_channel(channel).await {
                    Ok(()) | Err(crate::discord::ActionError::NotFound) => {}
                    Err(err) => {
                        warn!(ticket = ticket.id, %err, "failed to delete ticket channel");
                    }
                },
                Err(err) => warn!(ticket = ticket.id, %err, "bad channel id on close"),
            }
        }

        let line = match reason {
            Some(reason) => format!(
                "Ticket #{} closed by <@{closed_by}>: {reason}",
                ticket.id
            ),
            None => format!("Ticket #{} closed by <@{closed_by}>", ticket.id),
        };
        self.log(ticket, &line).await;
    }

    async fn log(&self, ticket: &entity::ticket::Model, line: &str) {
        let Some(raw) = ticket.log_channel_id.as_deref() else {
            return;
        };
        match channel_id(raw) {
            Ok(channel) => {
                if let Err(err) = self.state.discord.send_message(channel, line, vec![]).await {
                    warn!(ticket = ticket.id, %err, "failed to write ticket log line");
                }
            }
            Err(err) => warn!(ticket = ticket.id, %err, "bad log channel id"),
        }
    }
}
