use anyhow::Result;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait};

use super::{ref_code, setup_test_db, uid, user_am};
use crate::db::{connect_with_config, ping, DatabaseConfig};
use crate::user;

#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let db = setup_test_db().await?;
    ping(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_in_memory_pool_keeps_data_between_queries() -> Result<()> {
    // a larger pool would hand out fresh, empty databases
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), max_connections: 8, min_connections: 2, ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    assert_eq!(db.get_database_backend(), DbBackend::Sqlite);

    use migration::MigratorTrait;
    migration::Migrator::up(&db, None).await?;

    user_am(&format!("{}@example.com", uid()), &ref_code()).insert(&db).await?;
    user_am(&format!("{}@example.com", uid()), &ref_code()).insert(&db).await?;
    assert_eq!(user::Entity::find().count(&db).await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_migrations_are_reversible() -> Result<()> {
    use migration::MigratorTrait;
    // private database so dropping tables cannot disturb concurrent tests
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), max_connections: 1, min_connections: 1, ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    migration::Migrator::down(&db, None).await?;
    assert!(user::Entity::find().count(&db).await.is_err(), "tables dropped");
    migration::Migrator::up(&db, None).await?;
    assert_eq!(user::Entity::find().count(&db).await?, 0);
    Ok(())
}
