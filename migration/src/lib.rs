pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_guild_config_table;
mod m20260110_000002_create_ticket_table;
mod m20260110_000003_create_role_menu_table;
mod m20260110_000004_create_role_menu_selection_table;
mod m20260110_000005_create_temp_voice_table;
mod m20260110_000006_create_giveaway_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_guild_config_table::Migration),
            Box::new(m20260110_000002_create_ticket_table::Migration),
            Box::new(m20260110_000003_create_role_menu_table::Migration),
            Box::new(m20260110_000004_create_role_menu_selection_table::Migration),
            Box::new(m20260110_000005_create_temp_voice_table::Migration),
            Box::new(m20260110_000006_create_giveaway_table::Migration),
        ]
    }
}
