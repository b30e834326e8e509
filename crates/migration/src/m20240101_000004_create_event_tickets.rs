//! Create `event_tickets` table: the ticket tiers sold for an event.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventTickets::Table)
                    .if_not_exists()
                    .col(string_len(EventTickets::Id, 36).primary_key())
                    .col(string_len(EventTickets::Title, 255).unique_key().not_null())
                    .col(integer(EventTickets::Price).not_null().check(Expr::col(EventTickets::Price).gte(0)))
                    .col(text(EventTickets::Description).not_null())
                    .col(integer(EventTickets::Limit).not_null().check(Expr::col(EventTickets::Limit).gte(0)))
                    .col(timestamp_with_time_zone(EventTickets::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(EventTickets::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(EventTickets::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(EventTickets::EventId, 36).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_ticket_event")
                            .from(EventTickets::Table, EventTickets::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EventTickets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum EventTickets {
    Table,
    Id,
    Title,
    Price,
    Description,
    Limit,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    EventId,
}

#[derive(DeriveIden)]
enum Events { Table, Id }
