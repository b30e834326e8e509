//! Interactive and batch transactions with acquire/run deadlines.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use configs::{IsolationLevelSetting, TransactionConfig};
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};
use tracing::{debug, instrument, warn};

use crate::errors::{Result, ServiceError};

/// Deadlines and isolation for one transaction.
#[derive(Clone, Debug)]
pub struct TransactionOptions {
    /// Longest wait for a connection before giving up.
    pub max_wait: Duration,
    /// Longest time the callback may run before the transaction is rolled back.
    pub timeout: Duration,
    /// `None` keeps the database default.
    pub isolation_level: Option<IsolationLevel>,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self { max_wait: Duration::from_millis(2000), timeout: Duration::from_millis(5000), isolation_level: None }
    }
}

impl From<&TransactionConfig> for TransactionOptions {
    fn from(cfg: &TransactionConfig) -> Self {
        Self {
            max_wait: Duration::from_millis(cfg.max_wait_ms),
            timeout: Duration::from_millis(cfg.timeout_ms),
            isolation_level: cfg.isolation_level.map(|lvl| match lvl {
                IsolationLevelSetting::ReadUncommitted => IsolationLevel::ReadUncommitted,
                IsolationLevelSetting::ReadCommitted => IsolationLevel::ReadCommitted,
                IsolationLevelSetting::RepeatableRead => IsolationLevel::RepeatableRead,
                IsolationLevelSetting::Serializable => IsolationLevel::Serializable,
            }),
        }
    }
}

pub type TxnFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>;

/// One unit of work inside `batch`.
pub type BatchOp<T> = Box<dyn for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send>;

/// Box a closure as a `BatchOp`, pinning down its higher-ranked signature.
pub fn batch_op<T, F>(f: F) -> BatchOp<T>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send + 'static,
{
    Box::new(f)
}

/// Run `f` inside a transaction: commit on `Ok`, roll back on `Err` or when a
/// deadline passes.
///
/// ```ignore
/// let user = run_in_transaction(&db, &TransactionOptions::default(), |txn| {
///     Box::pin(async move { crud::create::<user::Entity, _>(txn, input).await })
/// })
/// .await?;
/// ```
#[instrument(skip_all, fields(timeout_ms = opts.timeout.as_millis() as u64))]
pub async fn run_in_transaction<T, F>(db: &DatabaseConnection, opts: &TransactionOptions, f: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, T> + Send,
{
    let txn = match tokio::time::timeout(opts.max_wait, db.begin_with_config(opts.isolation_level, None)).await {
        Ok(txn) => txn?,
        Err(_) => {
            warn!(max_wait_ms = opts.max_wait.as_millis() as u64, "transaction start timed out");
            return Err(ServiceError::TransactionAborted(format!(
                "could not start a transaction within {} ms",
                opts.max_wait.as_millis()
            )));
        }
    };

    let outcome = tokio::time::timeout(opts.timeout, f(&txn)).await;
    match outcome {
        Ok(Ok(value)) => {
            txn.commit()
                .await
                .map_err(|e| ServiceError::TransactionAborted(format!("commit failed: {e}")))?;
            debug!("transaction committed");
            Ok(value)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "rolling back transaction");
            txn.rollback().await?;
            Err(err)
        }
        Err(_) => {
            warn!("transaction timed out, rolling back");
            txn.rollback().await?;
            Err(ServiceError::TransactionAborted(format!(
                "transaction exceeded {} ms",
                opts.timeout.as_millis()
            )))
        }
    }
}

/// Run independent operations in order inside one transaction; all commit or none do.
pub async fn batch<T>(db: &DatabaseConnection, opts: &TransactionOptions, ops: Vec<BatchOp<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    run_in_transaction(db, opts, move |txn| {
        Box::pin(async move {
            let mut out = Vec::with_capacity(ops.len());
            for op in ops {
                out.push(op(txn).await?);
            }
            Ok(out)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud;
    use crate::query::FindManyArgs;
    use crate::services::user_service::NewUser;
    use crate::test_support::{get_db, uid};
    use models::user;
    use sea_orm::{ColumnTrait, ConnectionTrait};

    fn buyer(email: &str) -> NewUser {
        NewUser { username: "buyer".into(), email: email.to_string(), password: "hash".into(), ..Default::default() }
    }

    fn with_email(email: &str) -> FindManyArgs<user::Entity> {
        FindManyArgs::new().filter(user::Column::Email.eq(email))
    }

    fn short(ms: u64) -> TransactionOptions {
        TransactionOptions { max_wait: Duration::from_millis(ms), timeout: Duration::from_millis(ms), isolation_level: None }
    }

    #[tokio::test]
    async fn commits_on_ok_and_rolls_back_on_err() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let input = buyer(&format!("{}@example.com", uid()));
        let created = run_in_transaction(&db, &TransactionOptions::default(), move |txn| {
            Box::pin(async move { crud::create::<user::Entity, _>(txn, input).await })
        })
        .await?;
        assert!(crud::find_unique::<user::Entity, _>(&db, &crate::services::user_service::UserKey::Id(created.id)).await?.is_some());

        let email = format!("{}@example.com", uid());
        let input = buyer(&email);
        let failed: Result<()> = run_in_transaction(&db, &TransactionOptions::default(), move |txn| {
            Box::pin(async move {
                crud::create::<user::Entity, _>(txn, input).await?;
                Err(ServiceError::validation("changed my mind"))
            })
        })
        .await;
        assert!(matches!(failed, Err(ServiceError::Validation(_))));
        assert_eq!(crud::count::<user::Entity, _>(&db, &with_email(&email)).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn slow_callback_is_aborted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let email = format!("{}@example.com", uid());
        let input = buyer(&email);
        let res: Result<()> = run_in_transaction(&db, &short(50), move |txn| {
            Box::pin(async move {
                crud::create::<user::Entity, _>(txn, input).await?;
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(())
            })
        })
        .await;
        assert!(matches!(res, Err(ServiceError::TransactionAborted(_))));
        assert_eq!(crud::count::<user::Entity, _>(&db, &with_email(&email)).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn busy_pool_hits_max_wait() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        if db.get_database_backend() != sea_orm::DbBackend::Sqlite {
            return Ok(());
        }
        // the in-memory pool has a single connection
        let held = db.begin().await?;
        let res: Result<()> = run_in_transaction(&db, &short(100), |_txn| Box::pin(async { Ok(()) })).await;
        assert!(matches!(res, Err(ServiceError::TransactionAborted(_))));
        held.rollback().await?;
        Ok(())
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let email = format!("{}@example.com", uid());
        let op = |input: NewUser| batch_op(move |txn| Box::pin(async move { crud::create::<user::Entity, _>(txn, input).await }));

        let err = batch(&db, &TransactionOptions::default(), vec![op(buyer(&email)), op(buyer(&email))]).await.unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(crud::count::<user::Entity, _>(&db, &with_email(&email)).await?, 0);

        let other = format!("{}@example.com", uid());
        let users = batch(&db, &TransactionOptions::default(), vec![op(buyer(&email)), op(buyer(&other))]).await?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].email, other);
        Ok(())
    }

    #[test]
    fn options_follow_config() {
        let cfg = TransactionConfig {
            max_wait_ms: 100,
            timeout_ms: 250,
            isolation_level: Some(IsolationLevelSetting::Serializable),
        };
        let opts = TransactionOptions::from(&cfg);
        assert_eq!(opts.max_wait, Duration::from_millis(100));
        assert_eq!(opts.timeout, Duration::from_millis(250));
        assert!(matches!(opts.isolation_level, Some(IsolationLevel::Serializable)));
    }

    #[test]
    fn defaults() {
        let opts = TransactionOptions::default();
        assert_eq!(opts.max_wait, Duration::from_secs(2));
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert!(opts.isolation_level.is_none());
    }
}
