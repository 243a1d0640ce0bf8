use super::*;

/// Tests the version-guarded save on the happy path.
///
/// Verifies that saving against the version the caller read applies the
/// mutation and bumps the stored version by one.
///
/// Expected: Ok with version bumped and fields persisted
#[tokio::test]
async fn save_applies_mutation_and_bumps_version() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let mut changed = ticket.clone();
    changed.state = TicketState::Closed.as_str().to_string();
    changed.closed_by = Some("777".to_string());

    let saved = repo.save(changed, ticket.version).await?;
    assert_eq!(saved.version, ticket.version + 1);

    let reloaded = repo.load(ticket.id).await?.unwrap();
    assert_eq!(reloaded.state, TicketState::Closed.as_str());
    assert_eq!(reloaded.closed_by, Some("777".to_string()));
    assert_eq!(reloaded.version, ticket.version + 1);

    Ok(())
}

/// Tests that a stale write is rejected.
///
/// Two callers load the same ticket; the first save wins, the second save
/// still carries the old version and must not be applied.
///
/// Expected: Err(VersionConflict) and the first write intact
#[tokio::test]
async fn stale_save_is_a_version_conflict() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let mut first = ticket.clone();
    first.closed_by = Some("111".to_string());
    repo.save(first, ticket.version).await?;

    let mut second = ticket.clone();
    second.closed_by = Some("222".to_string());
    let result = repo.save(second, ticket.version).await;

    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

    let reloaded = repo.load(ticket.id).await?.unwrap();
    assert_eq!(reloaded.closed_by, Some("111".to_string()));

    Ok(())
}

/// Tests saving a ticket whose row was deleted underneath the caller.
///
/// Expected: Err(NotFound), not VersionConflict
#[tokio::test]
async fn save_of_deleted_row_is_not_found() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    repo.delete(ticket.id).await?;

    let result = repo.save(ticket.clone(), ticket.version).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));

    Ok(())
}

/// Tests that deleting an already-deleted ticket reports NotFound.
///
/// Expected: first delete Ok, second delete Err(NotFound)
#[tokio::test]
async fn double_delete_is_not_found() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    repo.delete(ticket.id).await?;
    let result = repo.delete(ticket.id).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));

    Ok(())
}
