use super::*;

/// Tests the grace-period round trip on the channel row.
///
/// The channel is parked in `pending_delete` with a deadline, then pulled
/// back to `active` with the deadline cleared, each step a version-guarded
/// save.
///
/// Expected: both saves apply in order with the version rising each time
#[tokio::test]
async fn save_round_trips_grace_period_state() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let channel = factory::temp_voice::create_temp_voice(db).await?;
    let repo = TempVoiceRepository::new(db);

    let deadline = Utc::now() + Duration::seconds(60);
    let mut parked = channel.clone();
    parked.state = TempVoiceState::PendingDelete.as_str().to_string();
    parked.expires_at = Some(deadline);
    let parked = repo.save(parked, 1).await?;
    assert_eq!(parked.version, 2);

    let mut revived = repo.load(&channel.channel_id).await?.unwrap();
    revived.state = TempVoiceState::Active.as_str().to_string();
    revived.expires_at = None;
    repo.save(revived, 2).await?;

    let reloaded = repo.load(&channel.channel_id).await?.unwrap();
    assert_eq!(reloaded.state, TempVoiceState::Active.as_str());
    assert_eq!(reloaded.expires_at, None);
    assert_eq!(reloaded.version, 3);

    Ok(())
}

/// Tests that a stale write against the channel row is rejected.
///
/// Expected: Err(VersionConflict)
#[tokio::test]
async fn stale_save_is_a_version_conflict() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let channel = factory::temp_voice::create_temp_voice(db).await?;
    let repo = TempVoiceRepository::new(db);

    let mut first = channel.clone();
    first.locked = true;
    repo.save(first, channel.version).await?;

    let mut second = channel.clone();
    second.user_limit = 5;
    let result = repo.save(second, channel.version).await;

    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

    let reloaded = repo.load(&channel.channel_id).await?.unwrap();
    assert!(reloaded.locked);
    assert_eq!(reloaded.user_limit, 0);

    Ok(())
}

/// Tests the startup scan for temp voice channels.
///
/// Expected: deleted and orphaned rows are skipped
#[tokio::test]
async fn load_all_non_terminal_skips_terminal_states() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let active = factory::temp_voice::create_temp_voice(db).await?;
    let pending = factory::temp_voice::TempVoiceFactory::new(db)
        .state("pending_delete")
        .expires_at(Some(Utc::now() + Duration::seconds(30)))
        .build()
        .await?;
    factory::temp_voice::TempVoiceFactory::new(db)
        .state("deleted")
        .build()
        .await?;
    factory::temp_voice::TempVoiceFactory::new(db)
        .state("orphaned")
        .build()
        .await?;

    let repo = TempVoiceRepository::new(db);
    let mut ids: Vec<String> = repo
        .load_all_non_terminal()
        .await?
        .into_iter()
        .map(|c| c.channel_id)
        .collect();
    ids.sort();

    let mut expected = vec![active.channel_id, pending.channel_id];
    expected.sort();
    assert_eq!(ids, expected);

    Ok(())
}
