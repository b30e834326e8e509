#![cfg(test)]
use chrono::{Duration, Utc};
use tokio::sync::OnceCell;
use sea_orm::prelude::Time;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::{event, event_ticket, organizer, transaction, user, voucher, EventCategory, EventLocation};

use crate::crud;
use crate::services::event_service::NewEvent;
use crate::services::event_ticket_service::NewEventTicket;
use crate::services::organizer_service::NewOrganizer;
use crate::services::transaction_service::NewTransaction;
use crate::services::user_service::NewUser;
use crate::services::voucher_service::NewVoucher;

// Shared databases are migrated once per test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    DatabaseConfig { url, max_connections: 5, min_connections: 1, acquire_timeout_secs: 10, ..Default::default() }
}

/// A migrated database for one test.
///
/// Without `TEST_DATABASE_URL` every call gets its own in-memory SQLite
/// database holding a single connection, so a test must not use `db` while it
/// keeps a transaction open.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = test_config();
    if cfg.is_sqlite() {
        let db = connect_with_config(&cfg).await?;
        migration::Migrator::up(&db, None).await?;
        return Ok(db);
    }

    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    connect_with_config(&cfg).await
}

pub fn uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn unique_suffix() -> String {
    uid().replace('-', "")[..10].to_string()
}

pub async fn seed_user(db: &DatabaseConnection) -> Result<user::Model, anyhow::Error> {
    let tag = unique_suffix();
    let input = NewUser {
        username: format!("buyer {tag}"),
        email: format!("buyer-{tag}@example.com"),
        password: "argon2-placeholder".into(),
        ..Default::default()
    };
    Ok(crud::create::<user::Entity, _>(db, input).await?)
}

pub async fn seed_organizer(db: &DatabaseConnection) -> Result<organizer::Model, anyhow::Error> {
    let tag = unique_suffix();
    let input = NewOrganizer {
        username: format!("org-{tag}"),
        email: format!("org-{tag}@example.com"),
        password: "argon2-placeholder".into(),
        ..Default::default()
    };
    Ok(crud::create::<organizer::Entity, _>(db, input).await?)
}

/// A valid event a week from now with a unique title.
pub fn new_event(organizer_id: &str) -> NewEvent {
    let start = Utc::now() + Duration::days(7);
    NewEvent {
        id: None,
        slug: None,
        title: format!("Live Session {}", unique_suffix()),
        category: EventCategory::Concert,
        location: EventLocation::Jakarta,
        content: "Full line-up and venue rules".into(),
        description: "An evening show".into(),
        thumbnail: "https://cdn.example.com/thumb.png".into(),
        start_date: start.into(),
        end_date: (start + Duration::days(1)).into(),
        start_time: Time::from_hms_opt(19, 0, 0).expect("valid time"),
        end_time: Time::from_hms_opt(22, 30, 0).expect("valid time"),
        organizer_id: organizer_id.to_string(),
    }
}

pub async fn seed_event(db: &DatabaseConnection, organizer_id: &str) -> Result<event::Model, anyhow::Error> {
    Ok(crud::create::<event::Entity, _>(db, new_event(organizer_id)).await?)
}

pub async fn seed_ticket_tier(db: &DatabaseConnection, event_id: &str, price: i32) -> Result<event_ticket::Model, anyhow::Error> {
    let input = NewEventTicket {
        id: None,
        title: format!("Tier {}", unique_suffix()),
        price,
        description: "General admission".into(),
        limit: 100,
        event_id: event_id.to_string(),
    };
    Ok(crud::create::<event_ticket::Entity, _>(db, input).await?)
}

/// A voucher worth 10 000 that expires in a month.
pub fn new_voucher(event_id: &str, code: &str, quota: i32) -> NewVoucher {
    NewVoucher {
        code: code.to_string(),
        discount: 10_000,
        quota,
        expired_date: (Utc::now() + Duration::days(30)).into(),
        event_id: event_id.to_string(),
    }
}

pub async fn seed_voucher(db: &DatabaseConnection, event_id: &str, quota: i32) -> Result<voucher::Model, anyhow::Error> {
    let code = format!("PROMO{}", unique_suffix().to_uppercase());
    Ok(crud::create::<voucher::Entity, _>(db, new_voucher(event_id, &code, quota)).await?)
}

/// A pending transaction by a freshly seeded buyer.
pub async fn seed_transaction(db: &DatabaseConnection, organizer_id: &str, event_id: &str) -> Result<transaction::Model, anyhow::Error> {
    let buyer = seed_user(db).await?;
    let input = NewTransaction {
        total_price: 0,
        user_id: buyer.id,
        event_id: event_id.to_string(),
        organizer_id: organizer_id.to_string(),
        ..Default::default()
    };
    Ok(crud::create::<transaction::Entity, _>(db, input).await?)
}
