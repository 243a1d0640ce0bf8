use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleMenu::Table)
                    .if_not_exists()
                    .col(pk_auto(RoleMenu::Id))
                    .col(string(RoleMenu::GuildId))
                    .col(string(RoleMenu::ChannelId))
                    .col(string_null(RoleMenu::MessageId))
                    .col(string(RoleMenu::OwnerId))
                    .col(boolean(RoleMenu::Exclusive))
                    .col(json(RoleMenu::Options))
                    .col(string(RoleMenu::State))
                    .col(big_integer(RoleMenu::Version))
                    .col(timestamp_null(RoleMenu::ExpiresAt))
                    .col(json(RoleMenu::Bindings))
                    .col(
                        timestamp(RoleMenu::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleMenu::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoleMenu {
    Table,
    Id,
    GuildId,
    ChannelId,
    MessageId,
    OwnerId,
    Exclusive,
    Options,
    State,
    Version,
    ExpiresAt,
    Bindings,
    CreatedAt,
}
