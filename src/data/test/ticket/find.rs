use super::*;

/// Tests the duplicate-ticket lookup.
///
/// A user with an open ticket is found; once that ticket is closed the
/// lookup comes back empty, so the user may open a new one.
///
/// Expected: Some while open, None after close
#[tokio::test]
async fn find_open_by_owner_ignores_closed_tickets() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .owner_id("42")
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    let found = repo.find_open_by_owner("100", "42").await?;
    assert_eq!(found.map(|t| t.id), Some(ticket.id));

    let mut closed = repo.load(ticket.id).await?.unwrap();
    closed.state = TicketState::Closed.as_str().to_string();
    repo.save(closed, ticket.version).await?;

    assert!(repo.find_open_by_owner("100", "42").await?.is_none());

    Ok(())
}

/// Tests that the owner lookup is scoped to the guild.
///
/// Expected: None for a different guild id
#[tokio::test]
async fn find_open_by_owner_is_guild_scoped() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::TicketFactory::new(db)
        .guild_id("100")
        .owner_id("42")
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(repo.find_open_by_owner("999", "42").await?.is_none());

    Ok(())
}

/// Tests mapping a Discord channel back to its live ticket.
///
/// Expected: Some for the open ticket's channel, None for an unknown channel
#[tokio::test]
async fn find_by_channel_resolves_live_tickets_only() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .channel_id(Some("2222".to_string()))
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    let found = repo.find_by_channel("2222").await?;
    assert_eq!(found.map(|t| t.id), Some(ticket.id));

    assert!(repo.find_by_channel("3333").await?.is_none());

    Ok(())
}

/// Tests the startup scan over surviving tickets.
///
/// Closed and orphaned rows are terminal and must not be reloaded; pending
/// and open rows must be.
///
/// Expected: only the pending and open tickets come back
#[tokio::test]
async fn load_all_non_terminal_skips_terminal_states() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let pending = factory::ticket::TicketFactory::new(db)
        .state("pending")
        .channel_id(None)
        .build()
        .await?;
    let open = factory::ticket::create_ticket(db).await?;
    factory::ticket::TicketFactory::new(db).state("closed").build().await?;
    factory::ticket::TicketFactory::new(db).state("orphaned").build().await?;

    let repo = TicketRepository::new(db);
    let mut ids: Vec<i32> = repo
        .load_all_non_terminal()
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    ids.sort_unstable();

    let mut expected = vec![pending.id, open.id];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    Ok(())
}
