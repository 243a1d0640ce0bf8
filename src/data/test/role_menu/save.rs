use super::*;

/// Tests the pending-then-attach flow for menus.
///
/// A menu is inserted pending, then the posted message id is written back in
/// the same version-guarded save that activates it.
///
/// Expected: Ok with message id attached and version bumped
#[tokio::test]
async fn save_attaches_message_and_activates() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RoleMenuRepository::new(db);
    let menu = repo.create("100", "3000", "200", false, &[]).await?;
    assert_eq!(menu.state, RoleMenuState::Pending.as_str());
    assert_eq!(menu.version, 1);

    let mut activated = menu.clone();
    activated.message_id = Some("4000".to_string());
    activated.state = RoleMenuState::Active.as_str().to_string();
    let saved = repo.save(activated, 1).await?;
    assert_eq!(saved.version, 2);

    let reloaded = repo.load(menu.id).await?.unwrap();
    assert_eq!(reloaded.message_id, Some("4000".to_string()));
    assert_eq!(reloaded.state, RoleMenuState::Active.as_str());

    Ok(())
}

/// Tests that a save carrying a stale version loses cleanly.
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

    let menu = factory::role_menu::create_role_menu(db).await?;
    let repo = RoleMenuRepository::new(db);

    repo.save(menu.clone(), menu.version).await?;
    let result = repo.save(menu.clone(), menu.version).await;

    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

    Ok(())
}

/// Tests the startup scan for menus.
///
/// Expected: active and pending menus come back, orphaned menus do not
#[tokio::test]
async fn load_all_non_terminal_skips_orphaned_menus() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let active = factory::role_menu::create_role_menu(db).await?;
    factory::role_menu::RoleMenuFactory::new(db)
        .state("orphaned")
        .build()
        .await?;

    let repo = RoleMenuRepository::new(db);
    let menus = repo.load_all_non_terminal().await?;

    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].id, active.id);

    Ok(())
}
