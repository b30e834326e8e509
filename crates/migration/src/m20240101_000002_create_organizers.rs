//! Create `organizers` table.
use sea_orm_migration::{prelude::*, schema::*};

use crate::enum_values::USER_ROLE;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizers::Table)
                    .if_not_exists()
                    .col(string_len(Organizers::Id, 36).primary_key())
                    .col(string_len(Organizers::Username, 128).unique_key().not_null())
                    .col(string_len(Organizers::Email, 255).unique_key().not_null())
                    .col(string_len(Organizers::Password, 255).not_null())
                    .col(
                        string_len(Organizers::Role, 16)
                            .not_null()
                            .default("ORGANIZER")
                            .check(Expr::col(Organizers::Role).is_in(USER_ROLE.iter().copied())),
                    )
                    .col(string_len(Organizers::ProfilePicture, 512).not_null().default(""))
                    .col(timestamp_with_time_zone(Organizers::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Organizers::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(Organizers::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Organizers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Organizers {
    Table,
    Id,
    Username,
    Email,
    Password,
    Role,
    ProfilePicture,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
