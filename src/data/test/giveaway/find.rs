use super::*;

/// Tests resolving "the giveaway in this channel".
///
/// Expected: the active giveaway is found; a drawn one in the same channel
/// is not
#[tokio::test]
async fn find_active_by_channel_ignores_drawn_giveaways() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::giveaway::GiveawayFactory::new(db)
        .channel_id("6100")
        .state("drawn")
        .build()
        .await?;
    let active = factory::giveaway::GiveawayFactory::new(db)
        .channel_id("6100")
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    let found = repo.find_active_by_channel("100", "6100").await?;
    assert_eq!(found.map(|g| g.id), Some(active.id));

    assert!(repo.find_active_by_channel("100", "6200").await?.is_none());

    Ok(())
}

/// Tests resolving the reroll target.
///
/// Expected: the most recently drawn giveaway in the guild, not an older one
/// and not one from another guild
#[tokio::test]
async fn find_latest_drawn_picks_the_newest() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::giveaway::GiveawayFactory::new(db)
        .state("drawn")
        .build()
        .await?;
    let newest = factory::giveaway::GiveawayFactory::new(db)
        .state("drawn")
        .build()
        .await?;
    factory::giveaway::GiveawayFactory::new(db)
        .guild_id("999")
        .state("drawn")
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    let found = repo.find_latest_drawn("100").await?;
    assert_eq!(found.map(|g| g.id), Some(newest.id));

    Ok(())
}
