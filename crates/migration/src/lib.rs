//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_organizers;
mod m20240101_000003_create_events;
mod m20240101_000004_create_event_tickets;
mod m20240101_000005_create_vouchers;
mod m20240101_000006_create_transactions;
mod m20240101_000007_create_tickets;
mod m20240101_000008_add_indexes;

/// Closed value sets enforced by `CHECK` constraints.
pub mod enum_values {
    pub const USER_ROLE: &[&str] = &["USER", "ORGANIZER"];

    pub const EVENT_CATEGORY: &[&str] = &[
        "CONCERT", "THEATRE", "TALKSHOW", "ANIME", "IDOL", "WEBINAR", "SPORT", "ESPORT", "FASHION",
    ];

    pub const EVENT_LOCATION: &[&str] = &[
        "ONLINE", "JAKARTA", "BANDUNG", "BOGOR", "DEPOK", "TANGERANG", "BEKASI", "SEMARANG",
        "YOGYAKARTA", "SOLO", "SURABAYA", "MALANG", "BALI", "MEDAN", "MAKASSAR", "MOJOKERTO",
    ];

    pub const TRANSACTION_STATUS: &[&str] = &[
        "WAITING_PAYMENT",
        "WAITING_FOR_CONFIRMATION",
        "DONE",
        "REJECTED",
        "EXPIRED",
        "CANCELLED",
    ];
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_organizers::Migration),
            Box::new(m20240101_000003_create_events::Migration),
            Box::new(m20240101_000004_create_event_tickets::Migration),
            Box::new(m20240101_000005_create_vouchers::Migration),
            Box::new(m20240101_000006_create_transactions::Migration),
            Box::new(m20240101_000007_create_tickets::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000008_add_indexes::Migration),
        ]
    }
}
