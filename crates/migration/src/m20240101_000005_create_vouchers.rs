//! Create `vouchers` table keyed by the voucher code itself.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(string_len(Vouchers::Code, 64).primary_key())
                    .col(integer(Vouchers::Discount).not_null().check(Expr::col(Vouchers::Discount).gte(0)))
                    .col(integer(Vouchers::Quota).not_null().check(Expr::col(Vouchers::Quota).gte(0)))
                    .col(timestamp_with_time_zone(Vouchers::ExpiredDate).not_null())
                    .col(timestamp_with_time_zone(Vouchers::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Vouchers::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(Vouchers::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(Vouchers::EventId, 36).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_event")
                            .from(Vouchers::Table, Vouchers::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vouchers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vouchers {
    Table,
    Code,
    Discount,
    Quota,
    ExpiredDate,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    EventId,
}

#[derive(DeriveIden)]
enum Events { Table, Id }
