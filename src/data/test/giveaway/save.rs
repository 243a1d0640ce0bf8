use super::*;

/// Tests that participant list writes go through the version guard.
///
/// Two entries race from the same loaded row; only the first lands, the
/// second must reload before retrying.
///
/// Expected: first save Ok, second Err(VersionConflict), one participant stored
#[tokio::test]
async fn concurrent_entry_writes_conflict() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let giveaway = factory::giveaway::create_giveaway(db).await?;
    let repo = GiveawayRepository::new(db);

    let mut first = giveaway.clone();
    first.participants = serde_json::json!(["1001"]);
    repo.save(first, giveaway.version).await?;

    let mut second = giveaway.clone();
    second.participants = serde_json::json!(["1002"]);
    let result = repo.save(second, giveaway.version).await;
    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

    let reloaded = repo.load(giveaway.id).await?.unwrap();
    assert_eq!(reloaded.participants, serde_json::json!(["1001"]));

    Ok(())
}

/// Tests persisting the draw transition.
///
/// Expected: winners recorded, state drawn, deadline cleared
#[tokio::test]
async fn save_records_draw() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let giveaway = factory::giveaway::GiveawayFactory::new(db)
        .participants(&["1", "2", "3"])
        .build()
        .await?;
    let repo = GiveawayRepository::new(db);

    let mut drawn = giveaway.clone();
    drawn.state = GiveawayState::Drawn.as_str().to_string();
    drawn.winners = serde_json::json!(["2"]);
    drawn.expires_at = None;
    repo.save(drawn, giveaway.version).await?;

    let reloaded = repo.load(giveaway.id).await?.unwrap();
    assert_eq!(reloaded.state, GiveawayState::Drawn.as_str());
    assert_eq!(reloaded.winners, serde_json::json!(["2"]));
    assert_eq!(reloaded.expires_at, None);

    Ok(())
}
