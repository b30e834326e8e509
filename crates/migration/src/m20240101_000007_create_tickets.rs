//! Create `tickets` table: one issued admission per purchased seat.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(string_len(Tickets::Id, 36).primary_key())
                    .col(string_len(Tickets::QrCode, 255).not_null())
                    .col(timestamp_with_time_zone(Tickets::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Tickets::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(Tickets::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(Tickets::EventTicketId, 36).not_null())
                    .col(string_len(Tickets::TransactionId, 36).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_event_ticket")
                            .from(Tickets::Table, Tickets::EventTicketId)
                            .to(EventTickets::Table, EventTickets::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_transaction")
                            .from(Tickets::Table, Tickets::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Tickets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    QrCode,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    EventTicketId,
    TransactionId,
}

#[derive(DeriveIden)]
enum EventTickets { Table, Id }

#[derive(DeriveIden)]
enum Transactions { Table, Id }
