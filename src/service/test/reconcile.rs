use super::*;
use serenity::all::MessageId;

use crate::bot::router;
use crate::model::{GiveawayState, RoleMenuState, TempVoiceState, TicketState};
use crate::service::Reconciler;

/// Tests the restart round trip for surviving entities.
///
/// Every live entity gets its bindings re-registered, and a second pass over
/// the same state produces the identical binding table.
///
/// Expected: all four kinds restored, identical snapshots across runs
#[tokio::test]
async fn restores_bindings_for_live_entities() {
    let (state, discord, _rx) = harness().await;

    factory::ticket::TicketFactory::new(&state.db)
        .channel_id(Some("2222".to_string()))
        .bindings(vec![router::ticket_close_id(7)])
        .build()
        .await
        .unwrap();
    let menu = factory::role_menu::create_role_menu(&state.db).await.unwrap();
    let menu_binding = router::role_menu_select_id(menu.id);
    crate::data::RoleMenuRepository::new(&state.db)
        .save(
            {
                let mut m = menu.clone();
                m.bindings = serde_json::json!([menu_binding.clone()]);
                m
            },
            menu.version,
        )
        .await
        .unwrap();
    let enter_binding = router::giveaway_enter_id(3);
    factory::giveaway::GiveawayFactory::new(&state.db)
        .bindings(&[enter_binding.as_str()])
        .build()
        .await
        .unwrap();
    let voice = factory::temp_voice::create_temp_voice(&state.db).await.unwrap();
    discord.set_occupants(
        ChannelId::new(voice.channel_id.parse().unwrap()),
        vec![UserId::new(42)],
    );

    let report = Reconciler::new(&state).run().await.unwrap();
    assert_eq!(report.restored, 4);
    assert_eq!(report.orphaned, 0);
    // Only the giveaway deadline counts; the occupied voice channel comes
    // back active with no grace timer.
    assert_eq!(report.timers_armed, 1);

    assert!(state.bindings.resolve(&router::ticket_close_id(7)).is_some());
    assert!(state.bindings.resolve(&menu_binding).is_some());
    assert!(state.bindings.resolve(&enter_binding).is_some());

    // A second pass over unchanged state rebuilds the same table.
    let first = state.bindings.snapshot();
    state.bindings.clear();
    Reconciler::new(&state).run().await.unwrap();
    assert_eq!(state.bindings.snapshot(), first);
}

/// Tests orphaning of entities whose platform anchor is gone.
///
/// Expected: each dead entity marked orphaned exactly once
#[tokio::test]
async fn orphans_entities_with_missing_anchors() {
    let (state, discord, _rx) = harness().await;

    let ticket = factory::ticket::TicketFactory::new(&state.db)
        .channel_id(Some("2222".to_string()))
        .build()
        .await
        .unwrap();
    discord.remove_channel(ChannelId::new(2222));

    let menu = factory::role_menu::RoleMenuFactory::new(&state.db)
        .message_id(Some("4444".to_string()))
        .build()
        .await
        .unwrap();
    discord.remove_message(
        ChannelId::new(menu.channel_id.parse().unwrap()),
        MessageId::new(4444),
    );

    let giveaway = factory::giveaway::GiveawayFactory::new(&state.db)
        .message_id(Some("7777".to_string()))
        .build()
        .await
        .unwrap();
    discord.remove_message(
        ChannelId::new(giveaway.channel_id.parse().unwrap()),
        MessageId::new(7777),
    );

    let voice = factory::temp_voice::create_temp_voice(&state.db).await.unwrap();
    discord.remove_channel(ChannelId::new(voice.channel_id.parse().unwrap()));

    let report = Reconciler::new(&state).run().await.unwrap();
    assert_eq!(report.orphaned, 4);
    assert_eq!(report.restored, 0);

    let db = &state.db;
    assert_eq!(
        crate::data::TicketRepository::new(db).load(ticket.id).await.unwrap().unwrap().state,
        TicketState::Orphaned.as_str()
    );
    assert_eq!(
        crate::data::RoleMenuRepository::new(db).load(menu.id).await.unwrap().unwrap().state,
        RoleMenuState::Orphaned.as_str()
    );
    assert_eq!(
        crate::data::GiveawayRepository::new(db).load(giveaway.id).await.unwrap().unwrap().state,
        GiveawayState::Orphaned.as_str()
    );
    assert_eq!(
        crate::data::TempVoiceRepository::new(db)
            .load(&voice.channel_id)
            .await
            .unwrap()
            .unwrap()
            .state,
        TempVoiceState::Orphaned.as_str()
    );
}

/// Tests the crash window between the pending insert and the channel
/// write-back: a ticket with no channel cannot be recovered.
///
/// Expected: the stuck pending ticket is orphaned
#[tokio::test]
async fn orphans_tickets_stuck_in_pending() {
    let (state, _discord, _rx) = harness().await;
    let ticket = factory::ticket::TicketFactory::new(&state.db)
        .state("pending")
        .channel_id(None)
        .build()
        .await
        .unwrap();

    let report = Reconciler::new(&state).run().await.unwrap();
    assert_eq!(report.orphaned, 1);

    let stored = crate::data::TicketRepository::new(&state.db)
        .load(ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, TicketState::Orphaned.as_str());
}

/// Tests that a parked temp channel found empty after a restart stays in
/// its grace period rather than being deleted or revived.
///
/// Expected: still pending_delete with its persisted deadline intact
#[tokio::test]
async fn keeps_parked_channels_in_their_grace_period() {
    let (state, discord, _rx) = harness().await;
    let deadline = chrono::Utc::now() + chrono::Duration::seconds(30);
    let voice = factory::temp_voice::TempVoiceFactory::new(&state.db)
        .state("pending_delete")
        .expires_at(Some(deadline))
        .build()
        .await
        .unwrap();
    discord.set_occupants(ChannelId::new(voice.channel_id.parse().unwrap()), vec![]);

    let report = Reconciler::new(&state).run().await.unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(report.timers_armed, 1);

    let stored = crate::data::TempVoiceRepository::new(&state.db)
        .load(&voice.channel_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, TempVoiceState::PendingDelete.as_str());
    assert_eq!(
        stored.expires_at.map(|t| t.timestamp()),
        Some(deadline.timestamp())
    );
}
