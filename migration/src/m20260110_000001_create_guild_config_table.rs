use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GuildConfig::Table)
                    .if_not_exists()
                    .col(string(GuildConfig::GuildId).primary_key())
                    .col(string_null(GuildConfig::TicketCategory))
                    .col(string_null(GuildConfig::TicketLogChannel))
                    .col(string_null(GuildConfig::SupportRole))
                    .col(string_null(GuildConfig::TempVoiceCreator))
                    .col(string_null(GuildConfig::TempVoiceCategory))
                    .col(
                        timestamp(GuildConfig::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuildConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GuildConfig {
    Table,
    GuildId,
    TicketCategory,
    TicketLogChannel,
    SupportRole,
    TempVoiceCreator,
    TempVoiceCategory,
    CreatedAt,
}
