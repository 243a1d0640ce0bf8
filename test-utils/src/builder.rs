use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for test contexts with customizable database schemas.
///
/// Generates CREATE TABLE statements from entity models and executes them
/// against a fresh in-memory SQLite database.
///
/// # Example
///
/// ```rust,ignore
/// let test = TestBuilder::new()
///     .with_table(Ticket)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    tables: Vec<TableCreateStatement>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds an entity table to the test schema. Tables with foreign keys
    /// should be added after the tables they reference.
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds every lifecycle table in dependency order. Most service and
    /// repository tests want the full set.
    pub fn with_lifecycle_tables(self) -> Self {
        self.with_table(GuildConfig)
            .with_table(Ticket)
            .with_table(RoleMenu)
            .with_table(RoleMenuSelection)
            .with_table(TempVoice)
            .with_table(Giveaway)
    }

    /// Creates the in-memory database and executes the configured CREATE
    /// TABLE statements.
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut context = TestContext::new();
        context.with_tables(self.tables).await?;
        Ok(context)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
