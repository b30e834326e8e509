//! Generic read/write operations over any `CrudEntity`.
//!
//! Every function accepts either a `DatabaseConnection` or an open
//! `DatabaseTransaction`; writes that touch several statements open their own
//! (nested) transaction so a failure leaves nothing behind.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, IntoActiveModel, PaginatorTrait, QueryFilter, TransactionTrait};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, instrument, warn};

use crate::errors::{Result, ServiceError};
use crate::pagination::{Paged, Pagination};
use crate::query::{fetch, pk_condition, CreateInput, CrudEntity, FindManyArgs, UniqueKey, UpdateInput};

/// Affected-row count reported by bulk writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchPayload {
    pub count: u64,
}

/// Field selection for `find_many_projected`; `select` and `omit` are exclusive.
#[derive(Clone, Debug)]
pub struct Projection<C> {
    pub select: Option<Vec<C>>,
    pub omit: Option<Vec<C>>,
}

impl<C> Projection<C> {
    pub fn select(cols: Vec<C>) -> Self { Self { select: Some(cols), omit: None } }
    pub fn omit(cols: Vec<C>) -> Self { Self { select: None, omit: Some(cols) } }
}

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn find_unique<E, C>(db: &C, key: &E::Unique) -> Result<Option<E::Model>>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    debug!(?key, "find_unique");
    Ok(E::find().filter(key.condition()).one(db).await?)
}

pub async fn find_unique_or_throw<E, C>(db: &C, key: &E::Unique) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    find_unique::<E, C>(db, key).await?.ok_or_else(|| ServiceError::not_found(E::NAME))
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn find_many<E, C>(db: &C, args: &FindManyArgs<E>) -> Result<Vec<E::Model>>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let rows = fetch(db, E::find(), args).await?;
    debug!(rows = rows.len(), "find_many");
    Ok(rows)
}

pub async fn find_first<E, C>(db: &C, args: &FindManyArgs<E>) -> Result<Option<E::Model>>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let args = args.clone().take(1);
    Ok(find_many(db, &args).await?.into_iter().next())
}

pub async fn find_first_or_throw<E, C>(db: &C, args: &FindManyArgs<E>) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    find_first(db, args).await?.ok_or_else(|| ServiceError::not_found(E::NAME))
}

/// Rows as JSON objects restricted to the selected (or minus the omitted) fields.
pub async fn find_many_projected<E, C>(
    db: &C,
    args: &FindManyArgs<E>,
    projection: &Projection<E::Column>,
) -> Result<Vec<Map<String, JsonValue>>>
where
    E: CrudEntity,
    E::Model: serde::Serialize,
    C: ConnectionTrait,
{
    match (&projection.select, &projection.omit) {
        (Some(_), Some(_)) => return Err(ServiceError::validation("select and omit cannot be combined")),
        (Some(cols), None) if cols.is_empty() => return Err(ServiceError::validation("select needs at least one field")),
        _ => {}
    }
    let rows = find_many(db, args).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let JsonValue::Object(mut obj) = serde_json::to_value(&row).map_err(|e| ServiceError::Db(e.to_string()))? else {
            return Err(ServiceError::Db(format!("{} did not serialize to an object", E::NAME)));
        };
        if let Some(cols) = &projection.select {
            obj.retain(|k, _| cols.iter().any(|c| c.as_str() == k));
        }
        if let Some(cols) = &projection.omit {
            obj.retain(|k, _| !cols.iter().any(|c| c.as_str() == k));
        }
        out.push(obj);
    }
    Ok(out)
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn count<E, C>(db: &C, args: &FindManyArgs<E>) -> Result<u64>
where
    E: CrudEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    if args.is_plain() {
        return Ok(E::find().filter(args.predicate()).count(db).await?);
    }
    Ok(find_many(db, args).await?.len() as u64)
}

/// `find_many` for one page, with the total over the same filter.
pub async fn find_page<E, C>(db: &C, args: &FindManyArgs<E>, p: Pagination) -> Result<Paged<E::Model>>
where
    E: CrudEntity,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = count(db, &args.clone().unpaged()).await?;
    let items = find_many(db, &args.clone().page(p)).await?;
    Ok(Paged::new(items, total, p))
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn create<E, C>(db: &C, input: E::Create) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    input.validate()?;
    input.check_parents(db).await?;
    let res = E::insert(input.into_active_model(now())).exec(db).await?;
    let row = E::find_by_id(res.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(E::NAME))?;
    info!("created");
    Ok(row)
}

/// Insert all rows in one transaction. With `skip_duplicates`, rows that hit a
/// unique constraint are skipped and not counted.
#[instrument(skip_all, fields(entity = E::NAME, rows = inputs.len(), skip_duplicates = skip_duplicates))]
pub async fn create_many<E, C>(db: &C, inputs: Vec<E::Create>, skip_duplicates: bool) -> Result<BatchPayload>
where
    E: CrudEntity,
    E::Model: IntoActiveModel<E::Active>,
    C: ConnectionTrait + TransactionTrait,
{
    if inputs.is_empty() {
        return Ok(BatchPayload::default());
    }
    for input in &inputs {
        input.validate()?;
    }
    let txn = db.begin().await?;
    for input in &inputs {
        input.check_parents(&txn).await?;
    }
    let ts = now();
    let count = if skip_duplicates {
        let mut count = 0;
        for input in inputs {
            let savepoint = txn.begin().await?;
            match E::insert(input.into_active_model(ts)).exec_without_returning(&savepoint).await {
                Ok(n) => {
                    savepoint.commit().await?;
                    count += n;
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    let err = ServiceError::from(e);
                    if !err.is_unique_violation() {
                        return Err(err);
                    }
                    debug!(error = %err, "duplicate skipped");
                }
            }
        }
        count
    } else {
        let rows: Vec<E::Active> = inputs.into_iter().map(|i| i.into_active_model(ts)).collect();
        E::insert_many(rows).exec_without_returning(&txn).await?
    };
    txn.commit().await?;
    info!(count, "created_many");
    Ok(BatchPayload { count })
}

async fn apply_changes<E, C>(db: &C, cond: Condition, changes: Vec<(E::Column, SimpleExpr)>, ts: DateTimeWithTimeZone) -> Result<u64>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let mut stmt = E::update_many().col_expr(E::updated_at(), Expr::value(ts));
    for (col, expr) in changes {
        stmt = stmt.col_expr(col, expr);
    }
    Ok(stmt.filter(cond).exec(db).await?.rows_affected)
}

async fn reload<E, C>(db: &C, row: &E::Model) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    E::find()
        .filter(pk_condition::<E>(row))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(E::NAME))
}

/// Partial update of one row; `updated_at` is always refreshed.
#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn update<E, C>(db: &C, key: &E::Unique, changes: &E::Update) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait + TransactionTrait,
{
    changes.validate()?;
    let txn = db.begin().await?;
    let existing = find_unique_or_throw::<E, _>(&txn, key).await?;
    changes.check_parents(&txn).await?;
    apply_changes::<E, _>(&txn, pk_condition::<E>(&existing), changes.changes(), now()).await?;
    let row = reload::<E, _>(&txn, &existing).await?;
    txn.commit().await?;
    info!(?key, "updated");
    Ok(row)
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn update_many<E, C>(db: &C, filter: Condition, changes: &E::Update) -> Result<BatchPayload>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    changes.validate()?;
    changes.check_parents(db).await?;
    let count = apply_changes::<E, _>(db, filter, changes.changes(), now()).await?;
    info!(count, "updated_many");
    Ok(BatchPayload { count })
}

/// Update the row addressed by `key`, or create it when absent.
#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn upsert<E, C>(db: &C, key: &E::Unique, create_input: E::Create, update_input: &E::Update) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let row = match find_unique::<E, _>(&txn, key).await? {
        Some(existing) => {
            update_input.validate()?;
            update_input.check_parents(&txn).await?;
            apply_changes::<E, _>(&txn, pk_condition::<E>(&existing), update_input.changes(), now()).await?;
            reload::<E, _>(&txn, &existing).await?
        }
        None => create::<E, _>(&txn, create_input).await?,
    };
    txn.commit().await?;
    Ok(row)
}

/// Hard delete; fails with a foreign-key violation while children reference the row.
#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn delete<E, C>(db: &C, key: &E::Unique) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let existing = find_unique_or_throw::<E, _>(db, key).await?;
    if let Err(e) = E::delete_many().filter(pk_condition::<E>(&existing)).exec(db).await {
        let err = ServiceError::from(e);
        warn!(?key, error = %err, "delete rejected");
        return Err(err);
    }
    info!(?key, "deleted");
    Ok(existing)
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn delete_many<E, C>(db: &C, filter: Condition) -> Result<BatchPayload>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let res = E::delete_many().filter(filter).exec(db).await?;
    info!(count = res.rows_affected, "deleted_many");
    Ok(BatchPayload { count: res.rows_affected })
}

async fn set_deleted_at<E, C>(db: &C, key: &E::Unique, deleted: bool) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let existing = find_unique_or_throw::<E, _>(&txn, key).await?;
    let ts = now();
    let stamp = deleted.then_some(ts);
    apply_changes::<E, _>(&txn, pk_condition::<E>(&existing), vec![(E::deleted_at(), Expr::value(stamp))], ts).await?;
    let row = reload::<E, _>(&txn, &existing).await?;
    txn.commit().await?;
    Ok(row)
}

/// Mark the row deleted without removing it.
#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn soft_delete<E, C>(db: &C, key: &E::Unique) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait + TransactionTrait,
{
    let row = set_deleted_at::<E, _>(db, key, true).await?;
    info!(?key, "soft_deleted");
    Ok(row)
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn restore<E, C>(db: &C, key: &E::Unique) -> Result<E::Model>
where
    E: CrudEntity,
    C: ConnectionTrait + TransactionTrait,
{
    let row = set_deleted_at::<E, _>(db, key, false).await?;
    info!(?key, "restored");
    Ok(row)
}
