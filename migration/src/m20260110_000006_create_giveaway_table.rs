use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Giveaway::Table)
                    .if_not_exists()
                    .col(pk_auto(Giveaway::Id))
                    .col(string(Giveaway::GuildId))
                    .col(string(Giveaway::ChannelId))
                    .col(string_null(Giveaway::MessageId))
                    .col(string(Giveaway::OwnerId))
                    .col(string(Giveaway::Prize))
                    .col(integer(Giveaway::WinnerCount))
                    .col(json(Giveaway::Participants))
                    .col(json(Giveaway::Winners))
                    .col(string(Giveaway::State))
                    .col(big_integer(Giveaway::Version))
                    .col(timestamp_null(Giveaway::ExpiresAt))
                    .col(json(Giveaway::Bindings))
                    .col(
                        timestamp(Giveaway::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Giveaway::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Giveaway {
    Table,
    Id,
    GuildId,
    ChannelId,
    MessageId,
    OwnerId,
    Prize,
    WinnerCount,
    Participants,
    Winners,
    State,
    Version,
    ExpiresAt,
    Bindings,
    CreatedAt,
}
