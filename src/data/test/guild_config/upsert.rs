use super::*;

/// Tests that the two setup commands do not clobber each other's fields.
///
/// Ticket setup runs first, then temp voice setup; both halves of the row
/// must survive, and re-running ticket setup without a support role must
/// keep the existing one.
///
/// Expected: one row carrying both module configs
#[tokio::test]
async fn setup_commands_preserve_each_others_fields() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);

    repo.set_ticket_config("100", "300", "900", Some("800".to_string()))
        .await?;
    let config = repo.set_temp_voice_config("100", "310", "320").await?;

    assert_eq!(config.ticket_category, Some("300".to_string()));
    assert_eq!(config.ticket_log_channel, Some("900".to_string()));
    assert_eq!(config.support_role, Some("800".to_string()));
    assert_eq!(config.temp_voice_creator, Some("310".to_string()));
    assert_eq!(config.temp_voice_category, Some("320".to_string()));

    let config = repo.set_ticket_config("100", "301", "901", None).await?;
    assert_eq!(config.ticket_category, Some("301".to_string()));
    assert_eq!(config.support_role, Some("800".to_string()));
    assert_eq!(config.temp_voice_creator, Some("310".to_string()));

    Ok(())
}

/// Tests reading config for a guild that never ran setup.
///
/// Expected: Ok(None)
#[tokio::test]
async fn get_returns_none_for_unknown_guild() -> Result<(), StoreError> {
    let test = TestBuilder::new()
        .with_lifecycle_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    assert!(repo.get("100").await?.is_none());

    Ok(())
}
