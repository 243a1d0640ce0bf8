use sea_orm_migration::{prelude::*, schema::*};

use super::m20260110_000003_create_role_menu_table::RoleMenu;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleMenuSelection::Table)
                    .if_not_exists()
                    .col(integer(RoleMenuSelection::MenuId))
                    .col(string(RoleMenuSelection::UserId))
                    .col(json(RoleMenuSelection::RoleIds))
                    .col(
                        timestamp(RoleMenuSelection::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(RoleMenuSelection::MenuId)
                            .col(RoleMenuSelection::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_menu_selection_menu_id")
                            .from(RoleMenuSelection::Table, RoleMenuSelection::MenuId)
                            .to(RoleMenu::Table, RoleMenu::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleMenuSelection::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoleMenuSelection {
    Table,
    MenuId,
    UserId,
    RoleIds,
    UpdatedAt,
}
