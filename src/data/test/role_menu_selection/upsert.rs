use super::*;

/// Tests that a second upsert for the same (menu, user) replaces the stored
/// role list instead of inserting a duplicate row.
///
/// Expected: one row with the latest role ids
#[tokio::test]
async fn upsert_replaces_existing_selection() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let menu = factory::role_menu::create_role_menu(db).await?;
    let repo = RoleMenuSelectionRepository::new(db);

    repo.upsert(menu.id, "42", &["501".to_string()]).await?;
    repo.upsert(menu.id, "42", &["501".to_string(), "502".to_string()])
        .await?;

    let selection = repo.get(menu.id, "42").await?.unwrap();
    assert_eq!(selection.role_ids, serde_json::json!(["501", "502"]));

    Ok(())
}

/// Tests that selections are isolated per user.
///
/// Expected: deleting one user's row leaves the other's intact
#[tokio::test]
async fn delete_only_touches_the_given_user() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let menu = factory::role_menu::create_role_menu(db).await?;
    let repo = RoleMenuSelectionRepository::new(db);

    repo.upsert(menu.id, "42", &["501".to_string()]).await?;
    repo.upsert(menu.id, "43", &["502".to_string()]).await?;

    repo.delete(menu.id, "42").await?;

    assert!(repo.get(menu.id, "42").await?.is_none());
    assert!(repo.get(menu.id, "43").await?.is_some());

    Ok(())
}

/// Tests the member-leave sweep across menus.
///
/// Expected: every selection the user held in the listed menus is removed,
/// with the removed count reported
#[tokio::test]
async fn delete_for_user_clears_across_menus() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let menu_a = factory::role_menu::create_role_menu(db).await?;
    let menu_b = factory::role_menu::create_role_menu(db).await?;
    let repo = RoleMenuSelectionRepository::new(db);

    repo.upsert(menu_a.id, "42", &["501".to_string()]).await?;
    repo.upsert(menu_b.id, "42", &["502".to_string()]).await?;
    repo.upsert(menu_a.id, "43", &["501".to_string()]).await?;

    let removed = repo.delete_for_user(&[menu_a.id, menu_b.id], "42").await?;
    assert_eq!(removed, 2);

    assert!(repo.get(menu_a.id, "42").await?.is_none());
    assert!(repo.get(menu_b.id, "42").await?.is_none());
    assert!(repo.get(menu_a.id, "43").await?.is_some());

    Ok(())
}
