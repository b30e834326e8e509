/// Database connection and configuration tests
pub mod db_tests;


use anyhow::Result;
use chrono::{Duration, NaiveTime, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::db::{connect_with_config, DatabaseConfig};
use crate::{event, organizer, user, EventCategory, EventLocation, UserRole};

/// Fresh migrated database: `TEST_DATABASE_URL` when set, otherwise in-memory SQLite.
pub(crate) async fn setup_test_db() -> Result<DatabaseConnection> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let cfg = DatabaseConfig { url, max_connections: 1, min_connections: 1, ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub(crate) fn uid() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn ref_code() -> String {
    uid().replace('-', "")[..8].to_uppercase()
}

pub(crate) fn user_am(email: &str, ref_code: &str) -> user::ActiveModel {
    let now = Utc::now().into();
    user::ActiveModel {
        id: Set(uid()),
        username: Set("buyer".into()),
        email: Set(email.into()),
        password: Set("hash".into()),
        role: Set(UserRole::User),
        point: Set(0),
        ref_code: Set(ref_code.into()),
        profile_picture: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
}

pub(crate) async fn insert_organizer(db: &DatabaseConnection, username: &str) -> Result<organizer::Model> {
    let now = Utc::now().into();
    let am = organizer::ActiveModel {
        id: Set(uid()),
        username: Set(username.into()),
        email: Set(format!("{username}@organizer.test")),
        password: Set("hash".into()),
        role: Set(UserRole::Organizer),
        profile_picture: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub(crate) fn event_am(organizer_id: &str, title: &str) -> event::ActiveModel {
    let now = Utc::now();
    event::ActiveModel {
        id: Set(uid()),
        slug: Set(event::slugify(title)),
        title: Set(title.into()),
        category: Set(EventCategory::Concert),
        location: Set(EventLocation::Jakarta),
        content: Set("content".into()),
        description: Set("description".into()),
        thumbnail: Set("thumb.png".into()),
        start_date: Set((now + Duration::days(7)).into()),
        end_date: Set((now + Duration::days(8)).into()),
        start_time: Set(NaiveTime::from_hms_opt(19, 0, 0).unwrap()),
        end_time: Set(NaiveTime::from_hms_opt(22, 0, 0).unwrap()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
        organizer_id: Set(organizer_id.into()),
    }
}
