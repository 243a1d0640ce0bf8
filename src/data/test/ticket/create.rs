use super::*;

/// Tests creating a fresh ticket row.
///
/// Verifies that `create` inserts a `pending` ticket at version 1 with no
/// channel attached and no bindings.
///
/// Expected: Ok with a pending version-1 ticket
#[tokio::test]
async fn creates_pending_ticket_at_version_one() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let ticket = repo.create("100", "1000", Some("900".to_string())).await?;

    assert_eq!(ticket.state, TicketState::Pending.as_str());
    assert_eq!(ticket.version, 1);
    assert_eq!(ticket.channel_id, None);
    assert_eq!(ticket.log_channel_id, Some("900".to_string()));
    assert_eq!(ticket.bindings, serde_json::json!([]));

    Ok(())
}
