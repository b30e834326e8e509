//! Create `transactions` table.
//!
//! A purchase by a user for one event; the voucher reference is the only
//! optional foreign key.
use sea_orm_migration::{prelude::*, schema::*};

use crate::enum_values::TRANSACTION_STATUS;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(string_len(Transactions::Id, 36).primary_key())
                    .col(ColumnDef::new(Transactions::PointUsed).integer().null().check(Expr::col(Transactions::PointUsed).gte(0)))
                    .col(integer(Transactions::TotalPrice).not_null().check(Expr::col(Transactions::TotalPrice).gte(0)))
                    .col(ColumnDef::new(Transactions::PaymentProof).string_len(512).null())
                    .col(
                        string_len(Transactions::Status, 32)
                            .not_null()
                            .default("WAITING_PAYMENT")
                            .check(Expr::col(Transactions::Status).is_in(TRANSACTION_STATUS.iter().copied())),
                    )
                    .col(timestamp_with_time_zone(Transactions::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Transactions::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(Transactions::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(Transactions::UserId, 36).not_null())
                    .col(string_len(Transactions::EventId, 36).not_null())
                    .col(string_len(Transactions::OrganizerId, 36).not_null())
                    .col(ColumnDef::new(Transactions::VoucherCode).string_len(64).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_event")
                            .from(Transactions::Table, Transactions::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_organizer")
                            .from(Transactions::Table, Transactions::OrganizerId)
                            .to(Organizers::Table, Organizers::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_voucher")
                            .from(Transactions::Table, Transactions::VoucherCode)
                            .to(Vouchers::Table, Vouchers::Code)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    PointUsed,
    TotalPrice,
    PaymentProof,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    UserId,
    EventId,
    OrganizerId,
    VoucherCode,
}

#[derive(DeriveIden)]
enum Users { Table, Id }

#[derive(DeriveIden)]
enum Events { Table, Id }

#[derive(DeriveIden)]
enum Organizers { Table, Id }

#[derive(DeriveIden)]
enum Vouchers { Table, Code }
