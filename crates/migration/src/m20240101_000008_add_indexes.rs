use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, column)
const FK_INDEXES: &[(&str, &str, &str)] = &[
    ("idx_event_organizer", "events", "organizer_id"),
    ("idx_event_deleted_at", "events", "deleted_at"),
    ("idx_event_ticket_event", "event_tickets", "event_id"),
    ("idx_voucher_event", "vouchers", "event_id"),
    ("idx_transaction_user", "transactions", "user_id"),
    ("idx_transaction_event", "transactions", "event_id"),
    ("idx_transaction_organizer", "transactions", "organizer_id"),
    ("idx_transaction_voucher", "transactions", "voucher_code"),
    ("idx_transaction_status", "transactions", "status"),
    ("idx_transaction_deleted_at", "transactions", "deleted_at"),
    ("idx_ticket_event_ticket", "tickets", "event_ticket_id"),
    ("idx_ticket_transaction", "tickets", "transaction_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in FK_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(*name)
                        .table(Alias::new(*table))
                        .col(Alias::new(*column))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in FK_INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
