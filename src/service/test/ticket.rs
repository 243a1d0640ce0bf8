use super::*;
use crate::bot::router;
use crate::model::TicketState;
use crate::service::ticket::{CloseOutcome, TicketService};

/// Tests the full open path: pending row, private channel, open write-back.
///
/// Expected: an open version-2 ticket with its channel attached, the close
/// binding registered, and the greeting posted into the new channel
#[tokio::test]
async fn create_opens_channel_and_confirms_row() {
    let (state, discord, _rx) = harness().await;
    factory::guild_config::GuildConfigFactory::new(&state.db)
        .ticket_category("300")
        .ticket_log_channel("900")
        .build()
        .await
        .unwrap();

    let service = TicketService::new(&state);
    let channel = service.create(GuildId::new(100), UserId::new(42)).await.unwrap();

    let ticket = crate::data::TicketRepository::new(&state.db)
        .find_open_by_owner("100", "42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.state, TicketState::Open.as_str());
    assert_eq!(ticket.version, 2);
    assert_eq!(ticket.channel_id, Some(channel.to_string()));

    let close_id = router::ticket_close_id(ticket.id);
    assert!(state.bindings.resolve(&close_id).is_some());

    assert_eq!(
        discord.count(|c| matches!(c, Call::CreateTextChannel { name, .. }
            if *name == format!("ticket-{}", ticket.id))),
        1
    );
    assert_eq!(
        discord.count(|c| matches!(c, Call::SendMessage { channel: ch, .. } if *ch == channel)),
        1
    );
}

/// Tests the one-open-ticket-per-user rule.
///
/// Expected: the second request fails and points at the existing channel
#[tokio::test]
async fn create_rejects_a_second_open_ticket() {
    let (state, _discord, _rx) = harness().await;
    factory::guild_config::GuildConfigFactory::new(&state.db)
        .ticket_category("300")
        .build()
        .await
        .unwrap();

    let service = TicketService::new(&state);
    let channel = service.create(GuildId::new(100), UserId::new(42)).await.unwrap();

    let err = service.create(GuildId::new(100), UserId::new(42)).await.unwrap_err();
    match err {
        AppError::InvalidInput(msg) => assert!(msg.contains(&format!("<#{channel}>"))),
        other => panic!("expected InvalidInput, got {other}"),
    }
}

/// Tests opening a ticket on a guild that never ran setup.
///
/// Expected: Err(InvalidInput), nothing persisted
#[tokio::test]
async fn create_requires_ticket_setup() {
    let (state, discord, _rx) = harness().await;

    let service = TicketService::new(&state);
    let result = service.create(GuildId::new(100), UserId::new(42)).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert!(discord.calls().is_empty());
}

/// Tests the cleanup path when Discord refuses to create the channel.
///
/// The pending row must be dropped so the reconciler never sees a stuck
/// pending ticket for a channel that was never made.
///
/// Expected: Err and no ticket row left behind
#[tokio::test]
async fn create_drops_pending_row_when_channel_creation_fails() {
    let (state, discord, _rx) = harness().await;
    factory::guild_config::GuildConfigFactory::new(&state.db)
        .ticket_category("300")
        .build()
        .await
        .unwrap();
    discord.fail_op("create_text_channel", ActionError::PermissionDenied);

    let service = TicketService::new(&state);
    let result = service.create(GuildId::new(100), UserId::new(42)).await;
    assert!(result.is_err());

    let leftover = crate::data::TicketRepository::new(&state.db)
        .find_open_by_owner("100", "42")
        .await
        .unwrap();
    assert!(leftover.is_none());
}

/// Tests that closing is one-way no matter how many requests arrive.
///
/// The first close deletes the channel and records who closed it; every
/// later close reports `AlreadyClosed` without touching Discord again.
///
/// Expected: one channel deletion total
#[tokio::test]
async fn close_is_idempotent() {
    let (state, discord, _rx) = harness().await;
    let ticket = factory::ticket::TicketFactory::new(&state.db)
        .owner_id("42")
        .channel_id(Some("2222".to_string()))
        .build()
        .await
        .unwrap();

    let service = TicketService::new(&state);
    let first = service
        .close(ticket.id, UserId::new(42), Some("resolved"), false)
        .await
        .unwrap();
    let CloseOutcome::Closed(closed) = first else {
        panic!("first close should win the transition");
    };
    assert_eq!(closed.closed_by, Some("42".to_string()));
    assert_eq!(closed.close_reason, Some("resolved".to_string()));

    let second = service.close(ticket.id, UserId::new(42), None, false).await.unwrap();
    assert!(matches!(second, CloseOutcome::AlreadyClosed(_)));

    assert_eq!(
        discord.count(|c| matches!(c, Call::DeleteChannel { .. })),
        1
    );
}

/// Tests the close permission rule.
///
/// Expected: a non-owner without staff rights is rejected; the same caller
/// flagged as staff succeeds
#[tokio::test]
async fn close_requires_owner_or_staff() {
    let (state, _discord, _rx) = harness().await;
    let ticket = factory::ticket::TicketFactory::new(&state.db)
        .owner_id("42")
        .build()
        .await
        .unwrap();

    let service = TicketService::new(&state);
    let denied = service.close(ticket.id, UserId::new(99), None, false).await;
    assert!(matches!(denied, Err(AppError::InvalidInput(_))));

    let allowed = service.close(ticket.id, UserId::new(99), None, true).await.unwrap();
    assert!(matches!(allowed, CloseOutcome::Closed(_)));
}

/// Tests that a ticket channel deleted out from under us does not block the
/// close transition.
///
/// Expected: Ok(Closed) even though delete_channel reports NotFound
#[tokio::test]
async fn close_tolerates_an_already_deleted_channel() {
    let (state, discord, _rx) = harness().await;
    let ticket = factory::ticket::TicketFactory::new(&state.db)
        .owner_id("42")
        .channel_id(Some("2222".to_string()))
        .build()
        .await
        .unwrap();
    discord.remove_channel(ChannelId::new(2222));

    let service = TicketService::new(&state);
    let outcome = service.close(ticket.id, UserId::new(42), None, false).await.unwrap();
    assert!(matches!(outcome, CloseOutcome::Closed(_)));
}
