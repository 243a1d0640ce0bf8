use serenity::all::{
    ComponentInteraction, ComponentInteractionDataKind, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, GuildId, Interaction, Member,
};
use tracing::{debug, error};

use crate::bot::{commands, router, router::ComponentTarget};
use crate::data::GuildConfigRepository;
use crate::error::AppError;
use crate::service::{
    giveaway::EnterOutcome, role_menu::SelectionOutcome, ticket::CloseOutcome, GiveawayService,
    RoleMenuService, TicketService,
};
use crate::state::AppState;

pub async fn handle_interaction(state: &AppState, ctx: &Context, interaction: Interaction) {
    match interaction {
        Interaction::Command(command) => commands::handle(state, ctx, command).await,
        Interaction::Component(component) => handle_component(state, ctx, component).await,
        _ => {}
    }
}

/// Routes a component click to its lifecycle service. The binding registry
/// is the first-line lookup; a decodable id with no live binding still gets
/// dispatched so a click racing a terminal transition lands on the
/// idempotent no-op path instead of erroring.
async fn handle_component(state: &AppState, ctx: &Context, component: ComponentInteraction) {
    let custom_id = component.data.custom_id.clone();
    let target = state
        .bindings
        .resolve(&custom_id)
        .or_else(|| router::decode(&custom_id));

    let Some(target) = target else {
        debug!(custom_id, "unroutable component, acknowledging");
        respond(ctx, &component, "This button is no longer active.").await;
        return;
    };

    let Some(guild) = component.guild_id else {
        respond(ctx, &component, "This only works inside a server.").await;
        return;
    };

    let reply = match dispatch(state, guild, &component, target).await {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                AppError::InvalidInput(_) | AppError::NotFound(_) => {
                    debug!(custom_id, "component rejected: {err}")
                }
                _ => error!(custom_id, "component dispatch failed: {err:?}"),
            }
            err.user_message()
        }
    };

    respond(ctx, &component, &reply).await;
}

async fn dispatch(
    state: &AppState,
    guild: GuildId,
    component: &ComponentInteraction,
    target: ComponentTarget,
) -> Result<String, AppError> {
    let user = component.user.id;

    match target {
        ComponentTarget::TicketCreate => {
            let channel = TicketService::new(state).create(guild, user).await?;
            Ok(format!("Your ticket is ready: <#{channel}>"))
        }
        ComponentTarget::TicketClose { ticket_id } => {
            let staff = is_staff(state, guild, component.member.as_ref()).await?;
            match TicketService::new(state)
                .close(ticket_id, user, None, staff)
                .await?
            {
                CloseOutcome::Closed(_) => Ok("Ticket closed.".to_string()),
                CloseOutcome::AlreadyClosed(_) => {
                    Ok("This ticket is already closed.".to_string())
                }
            }
        }
        ComponentTarget::RoleMenuSelect { menu_id } => {
            let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind
            else {
                return Err(AppError::InvalidInput("Unexpected component type.".to_string()));
            };
            let Some(picked) = values.first() else {
                return Ok("Nothing selected.".to_string());
            };

            match RoleMenuService::new(state).select(menu_id, user, picked).await? {
                SelectionOutcome::Added { role_id } => Ok(format!("Added <@&{role_id}>.")),
                SelectionOutcome::Removed { role_id } => Ok(format!("Removed <@&{role_id}>.")),
                SelectionOutcome::Locked { role_id } => Ok(format!(
                    "This menu is exclusive and you already picked <@&{role_id}>. \
                     It unlocks if you leave the server."
                )),
            }
        }
        ComponentTarget::GiveawayEnter { giveaway_id } => {
            match GiveawayService::new(state).enter(giveaway_id, user).await? {
                EnterOutcome::Entered { total } => {
                    Ok(format!("You're in! {total} entered so far."))
                }
                EnterOutcome::AlreadyEntered => Ok("You're already entered.".to_string()),
                EnterOutcome::Ended => Ok("This giveaway has already ended.".to_string()),
            }
        }
    }
}

/// Staff can close any ticket: server managers, plus holders of the
/// configured support role.
pub async fn is_staff(
    state: &AppState,
    guild: GuildId,
    member: Option<&Member>,
) -> Result<bool, AppError> {
    let Some(member) = member else {
        return Ok(false);
    };

    if member
        .permissions
        .is_some_and(|p| p.administrator() || p.manage_guild())
    {
        return Ok(true);
    }

    let config = GuildConfigRepository::new(&state.db)
        .get(&guild.to_string())
        .await?;
    let Some(support_role) = config.and_then(|c| c.support_role) else {
        return Ok(false);
    };

    Ok(member
        .roles
        .iter()
        .any(|role| role.to_string() == support_role))
}

async fn respond(ctx: &Context, component: &ComponentInteraction, content: &str) {
    let message = CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(true);
    if let Err(e) = component
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        // The channel may already be gone (e.g. a close deleted it).
        debug!("failed to respond to component: {e:?}");
    }
}
