use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TempVoice::Table)
                    .if_not_exists()
                    .col(string(TempVoice::ChannelId).primary_key())
                    .col(string(TempVoice::GuildId))
                    .col(string(TempVoice::OwnerId))
                    .col(string(TempVoice::CategoryId))
                    .col(boolean(TempVoice::Locked))
                    .col(integer(TempVoice::UserLimit))
                    .col(string(TempVoice::State))
                    .col(big_integer(TempVoice::Version))
                    .col(timestamp_null(TempVoice::ExpiresAt))
                    .col(json(TempVoice::Bindings))
                    .col(
                        timestamp(TempVoice::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TempVoice::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TempVoice {
    Table,
    ChannelId,
    GuildId,
    OwnerId,
    CategoryId,
    Locked,
    UserLimit,
    State,
    Version,
    ExpiresAt,
    Bindings,
    CreatedAt,
}
