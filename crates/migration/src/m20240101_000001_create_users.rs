//! Create `users` table.
//!
//! Buyers of tickets; carries a point balance and a unique referral code.
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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string_len(Users::Id, 36).primary_key())
                    .col(string_len(Users::Username, 128).not_null())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(string_len(Users::Password, 255).not_null())
                    .col(
                        string_len(Users::Role, 16)
                            .not_null()
                            .default("USER")
                            .check(Expr::col(Users::Role).is_in(USER_ROLE.iter().copied())),
                    )
                    .col(integer(Users::Point).not_null().default(0).check(Expr::col(Users::Point).gte(0)))
                    .col(string_len(Users::RefCode, 32).unique_key().not_null())
                    .col(string_len(Users::ProfilePicture, 512).not_null().default(""))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Users::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    // Explicitly define nullable deleted_at to avoid conflicting NULL/NOT NULL
                    .col(
                        ColumnDef::new(Users::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Password,
    Role,
    Point,
    RefCode,
    ProfilePicture,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
