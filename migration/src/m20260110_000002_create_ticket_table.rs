use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(pk_auto(Ticket::Id))
                    .col(string(Ticket::GuildId))
                    .col(string(Ticket::OwnerId))
                    .col(string_null(Ticket::ChannelId))
                    .col(string_null(Ticket::LogChannelId))
                    .col(string(Ticket::State))
                    .col(string_null(Ticket::ClosedBy))
                    .col(string_null(Ticket::CloseReason))
                    .col(big_integer(Ticket::Version))
                    .col(timestamp_null(Ticket::ExpiresAt))
                    .col(json(Ticket::Bindings))
                    .col(
                        timestamp(Ticket::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    GuildId,
    OwnerId,
    ChannelId,
    LogChannelId,
    State,
    ClosedBy,
    CloseReason,
    Version,
    ExpiresAt,
    Bindings,
    CreatedAt,
}
