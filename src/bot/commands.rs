//! Slash command definitions and dispatch.
//!
//! Commands are thin glue: extract options, call the lifecycle service,
//! reply ephemerally with the outcome. Permission gating is twofold: the
//! `default_member_permissions` hint on the definition, and a real check
//! in the handlers that need one (tickets also accept the support role).

use serenity::all::{
    ChannelId, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseMessage, GuildId, Permissions,
    ResolvedOption, ResolvedValue, RoleId, UserId,
};
use tracing::{debug, error};

use crate::bot::handler::interaction::is_staff;
use crate::data::{GuildConfigRepository, TicketRepository};
use crate::error::AppError;
use crate::model::MenuOption;
use crate::service::giveaway::{parse_duration, DrawOutcome, MAX_WINNERS};
use crate::service::temp_voice::MAX_USER_LIMIT;
use crate::service::ticket::CloseOutcome;
use crate::service::{GiveawayService, RoleMenuService, TempVoiceService, TicketService};
use crate::state::AppState;

pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("ticket-setup")
            .description("Configure the ticket system for this server")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "category",
                    "Category that ticket channels are created under",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "log-channel",
                    "Channel that receives open/close log lines",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::Role,
                "support-role",
                "Role that can view and close all tickets",
            )),
        CreateCommand::new("ticket-panel")
            .description("Post the ticket panel with the Open Ticket button here")
            .default_member_permissions(Permissions::MANAGE_GUILD),
        CreateCommand::new("close-ticket")
            .description("Close this ticket")
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "reason",
                "Why the ticket is being closed",
            )),
        CreateCommand::new("rolemenu")
            .description("Post a self-assign role menu")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "title", "Menu title")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "roles",
                    "Role mentions to offer, e.g. @Red @Blue",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Boolean,
                    "exclusive",
                    "Lock members to their first pick until they leave",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::Channel,
                "channel",
                "Where to post the menu (defaults to here)",
            )),
        CreateCommand::new("setup-tempvoice")
            .description("Create the Join-to-Create channel for temporary voice")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "category",
                    "Category that temp channels are created under",
                )
                .required(true),
            ),
        CreateCommand::new("voice-lock").description("Lock your voice channel"),
        CreateCommand::new("voice-unlock").description("Unlock your voice channel"),
        CreateCommand::new("voice-limit")
            .description("Set the user limit of your voice channel")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "0 for unlimited, up to 99",
                )
                .min_int_value(0)
                .max_int_value(MAX_USER_LIMIT as u64)
                .required(true),
            ),
        CreateCommand::new("voice-rename")
            .description("Rename your voice channel")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "New channel name")
                    .required(true),
            ),
        CreateCommand::new("voice-claim")
            .description("Claim this voice channel if its owner has left"),
        CreateCommand::new("giveaway")
            .description("Start a giveaway in this channel")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "prize", "What can be won")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "duration",
                    "How long it runs, e.g. 30m, 2h, 7d",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "winners",
                    "How many winners to draw",
                )
                .min_int_value(1)
                .max_int_value(MAX_WINNERS as u64)
                .required(true),
            ),
        CreateCommand::new("gend")
            .description("End the active giveaway in this channel now")
            .default_member_permissions(Permissions::MANAGE_GUILD),
        CreateCommand::new("greroll")
            .description("Reroll the most recently ended giveaway")
            .default_member_permissions(Permissions::MANAGE_GUILD),
    ]
}

pub async fn handle(state: &AppState, ctx: &Context, command: CommandInteraction) {
    let reply = match run(state, ctx, &command).await {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                AppError::InvalidInput(_) | AppError::NotFound(_) => {
                    debug!(command = %command.data.name, "command rejected: {err}")
                }
                _ => error!(command = %command.data.name, "command failed: {err:?}"),
            }
            err.user_message()
        }
    };

    let message = CreateInteractionResponseMessage::new()
        .content(reply)
        .ephemeral(true);
    if let Err(e) = command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        debug!("failed to respond to command: {e:?}");
    }
}

async fn run(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<String, AppError> {
    let Some(guild) = command.guild_id else {
        return Err(AppError::InvalidInput(
            "This only works inside a server.".to_string(),
        ));
    };
    let user = command.user.id;
    let options = command.data.options();

    match command.data.name.as_str() {
        "ticket-setup" => {
            let category = require_channel(&options, "category")?;
            let log_channel = require_channel(&options, "log-channel")?;
            let support_role = role_option(&options, "support-role");

            GuildConfigRepository::new(&state.db)
                .set_ticket_config(
                    &guild.to_string(),
                    &category.to_string(),
                    &log_channel.to_string(),
                    support_role.map(|r| r.to_string()),
                )
                .await?;
            Ok("Ticket system configured.".to_string())
        }
        "ticket-panel" => {
            TicketService::new(state)
                .post_panel(guild, command.channel_id)
                .await?;
            Ok("Panel posted.".to_string())
        }
        "close-ticket" => {
            let Some(ticket) = TicketRepository::new(&state.db)
                .find_by_channel(&command.channel_id.to_string())
                .await?
            else {
                return Err(AppError::InvalidInput(
                    "Run this inside a ticket channel.".to_string(),
                ));
            };
            let reason = string_option(&options, "reason");
            let staff = is_staff(state, guild, command.member.as_deref()).await?;

            match TicketService::new(state)
                .close(ticket.id, user, reason, staff)
                .await?
            {
                CloseOutcome::Closed(_) => Ok("Ticket closed.".to_string()),
                CloseOutcome::AlreadyClosed(_) => {
                    Ok("This ticket is already closed.".to_string())
                }
            }
        }
        "rolemenu" => {
            let title = require_string(&options, "title")?;
            let roles_raw = require_string(&options, "roles")?;
            let exclusive = bool_option(&options, "exclusive").unwrap_or(false);
            let channel = channel_option(&options, "channel").unwrap_or(command.channel_id);

            let role_ids = parse_role_mentions(roles_raw);
            if role_ids.is_empty() {
                return Err(AppError::InvalidInput(
                    "Mention at least one role to offer.".to_string(),
                ));
            }
            let menu_options = resolve_menu_options(ctx, guild, &role_ids);

            RoleMenuService::new(state)
                .create(guild, channel, user, title, exclusive, menu_options)
                .await?;
            Ok(format!("Role menu posted in <#{channel}>."))
        }
        "setup-tempvoice" => {
            let category = require_channel(&options, "category")?;
            let creator = state
                .discord
                .create_voice_channel(guild, "➕ Join to Create", category, vec![])
                .await?;
            GuildConfigRepository::new(&state.db)
                .set_temp_voice_config(
                    &guild.to_string(),
                    &creator.to_string(),
                    &category.to_string(),
                )
                .await?;
            Ok(format!("Temp voice configured, creator channel <#{creator}>."))
        }
        "voice-lock" => {
            let channel = require_voice_channel(ctx, guild, user)?;
            TempVoiceService::new(state).set_locked(channel, user, true).await?;
            Ok("Channel locked.".to_string())
        }
        "voice-unlock" => {
            let channel = require_voice_channel(ctx, guild, user)?;
            TempVoiceService::new(state).set_locked(channel, user, false).await?;
            Ok("Channel unlocked.".to_string())
        }
        "voice-limit" => {
            let limit = int_option(&options, "limit").unwrap_or(0).clamp(0, i64::MAX) as u32;
            let channel = require_voice_channel(ctx, guild, user)?;
            TempVoiceService::new(state).set_limit(channel, user, limit).await?;
            Ok(if limit == 0 {
                "User limit removed.".to_string()
            } else {
                format!("User limit set to {limit}.")
            })
        }
        "voice-rename" => {
            let name = require_string(&options, "name")?;
            let channel = require_voice_channel(ctx, guild, user)?;
            TempVoiceService::new(state).rename(channel, user, name).await?;
            Ok(format!("Channel renamed to **{}**.", name.trim()))
        }
        "voice-claim" => {
            let channel = require_voice_channel(ctx, guild, user)?;
            TempVoiceService::new(state).claim(channel, user).await?;
            Ok("This channel is yours now.".to_string())
        }
        "giveaway" => {
            let prize = require_string(&options, "prize")?;
            let duration_raw = require_string(&options, "duration")?;
            let winners = int_option(&options, "winners").unwrap_or(1) as i32;

            let Some(duration) = parse_duration(duration_raw) else {
                return Err(AppError::InvalidInput(
                    "Invalid duration; try something like 30m, 2h, or 7d.".to_string(),
                ));
            };

            GiveawayService::new(state)
                .create(guild, command.channel_id, user, prize, winners, duration)
                .await?;
            Ok(format!("Giveaway started for **{}**.", prize.trim()))
        }
        "gend" => {
            match GiveawayService::new(state)
                .end_now(guild, command.channel_id)
                .await?
            {
                DrawOutcome::Drawn { winners } if winners.is_empty() => {
                    Ok("Giveaway ended; no one entered.".to_string())
                }
                DrawOutcome::Drawn { winners } => {
                    Ok(format!("Giveaway ended. Winners: {}", mentions(&winners)))
                }
                DrawOutcome::AlreadyDrawn { .. } => {
                    Ok("That giveaway was already drawn.".to_string())
                }
            }
        }
        "greroll" => {
            let fresh = GiveawayService::new(state).reroll_latest(guild).await?;
            Ok(format!("New winners: {}", mentions(&fresh)))
        }
        other => Err(AppError::InternalError(format!("unknown command {other}"))),
    }
}

fn mentions(users: &[String]) -> String {
    users
        .iter()
        .map(|u| format!("<@{u}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds menu options from the mentioned roles, labelling each with the
/// cached role name when available.
fn resolve_menu_options(ctx: &Context, guild: GuildId, role_ids: &[u64]) -> Vec<MenuOption> {
    let guild_ref = ctx.cache.guild(guild);
    role_ids
        .iter()
        .map(|id| MenuOption {
            role_id: id.to_string(),
            label: guild_ref
                .as_ref()
                .and_then(|g| g.roles.get(&RoleId::new(*id)))
                .map(|r| r.name.clone())
                .unwrap_or_else(|| format!("Role {id}")),
            emoji: None,
        })
        .collect()
}

/// The voice channel the invoker is currently in, from the gateway cache.
fn require_voice_channel(
    ctx: &Context,
    guild: GuildId,
    user: UserId,
) -> Result<ChannelId, AppError> {
    let channel = ctx
        .cache
        .guild(guild)
        .and_then(|g| g.voice_states.get(&user).and_then(|vs| vs.channel_id));
    channel.ok_or_else(|| {
        AppError::InvalidInput("Join a voice channel first.".to_string())
    })
}

/// Extracts role ids from a string of role mentions (`<@&id>`), tolerating
/// raw ids and dropping duplicates while preserving order.
fn parse_role_mentions(input: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    for token in input.split_whitespace() {
        let raw = token.trim_start_matches("<@&").trim_end_matches('>');
        if let Ok(id) = raw.parse::<u64>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

fn string_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find_map(|o| match (&o.value, o.name) {
        (ResolvedValue::String(s), n) if n == name => Some(*s),
        _ => None,
    })
}

fn require_string<'a>(
    options: &'a [ResolvedOption<'a>],
    name: &str,
) -> Result<&'a str, AppError> {
    string_option(options, name)
        .ok_or_else(|| AppError::InvalidInput(format!("Missing option `{name}`.")))
}

fn channel_option(options: &[ResolvedOption<'_>], name: &str) -> Option<ChannelId> {
    options.iter().find_map(|o| match (&o.value, o.name) {
        (ResolvedValue::Channel(c), n) if n == name => Some(c.id),
        _ => None,
    })
}

fn require_channel(options: &[ResolvedOption<'_>], name: &str) -> Result<ChannelId, AppError> {
    channel_option(options, name)
        .ok_or_else(|| AppError::InvalidInput(format!("Missing option `{name}`.")))
}

fn role_option(options: &[ResolvedOption<'_>], name: &str) -> Option<RoleId> {
    options.iter().find_map(|o| match (&o.value, o.name) {
        (ResolvedValue::Role(r), n) if n == name => Some(r.id),
        _ => None,
    })
}

fn int_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find_map(|o| match (&o.value, o.name) {
        (ResolvedValue::Integer(i), n) if n == name => Some(*i),
        _ => None,
    })
}

fn bool_option(options: &[ResolvedOption<'_>], name: &str) -> Option<bool> {
    options.iter().find_map(|o| match (&o.value, o.name) {
        (ResolvedValue::Boolean(b), n) if n == name => Some(*b),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_role_mentions;

    #[test]
    fn parses_role_mentions_and_raw_ids() {
        assert_eq!(
            parse_role_mentions("<@&111> <@&222> 333"),
            vec![111, 222, 333]
        );
    }

    #[test]
    fn drops_duplicates_and_noise() {
        assert_eq!(
            parse_role_mentions("<@&111> words <@&111> @everyone"),
            vec![111]
        );
        assert!(parse_role_mentions("").is_empty());
    }
}
