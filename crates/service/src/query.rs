//! Entity contract and query arguments shared by every access operation.
//!
//! `CrudEntity` ties an entity to its unique keys and its create/update
//! inputs; `FindManyArgs` carries filtering, ordering, cursor paging,
//! distinct and skip/take in one value.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, NullOrdering, SimpleExpr};
use sea_orm::{
    ActiveModelBehavior, Condition, ConnectionTrait, DbBackend, Iterable, Order, PrimaryKeyToColumn, QueryFilter,
    QueryOrder, QuerySelect, Select, Value,
};

use crate::errors::{Result, ServiceError};
use crate::pagination::Pagination;

/// An entity the generic access layer can operate on.
pub trait CrudEntity: EntityTrait {
    /// Human-readable name used in errors and log fields.
    const NAME: &'static str;

    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + Sync;
    type Unique: UniqueKey<Self>;
    type Create: CreateInput<Self>;
    type Update: UpdateInput<Self>;

    fn updated_at() -> Self::Column;
    fn deleted_at() -> Self::Column;
}

/// One way of addressing a single row: the primary key or a unique column.
pub trait UniqueKey<E: EntityTrait>: Clone + std::fmt::Debug + Send + Sync {
    fn condition(&self) -> Condition;
}

#[async_trait]
pub trait CreateInput<E: CrudEntity>: Send + Sync + Sized {
    fn validate(&self) -> Result<()> { Ok(()) }

    /// Reject references to missing or soft-deleted parents.
    async fn check_parents<C: ConnectionTrait>(&self, _db: &C) -> Result<()> { Ok(()) }

    /// Fill defaults and produce the row to insert.
    fn into_active_model(self, now: DateTimeWithTimeZone) -> E::Active;
}

#[async_trait]
pub trait UpdateInput<E: CrudEntity>: Send + Sync {
    fn validate(&self) -> Result<()> { Ok(()) }

    async fn check_parents<C: ConnectionTrait>(&self, _db: &C) -> Result<()> { Ok(()) }

    /// Column assignments; `updated_at` is added by the caller.
    fn changes(&self) -> Vec<(E::Column, SimpleExpr)>;
}

/// Assignment for an integer column, applied in SQL so concurrent writers compose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericUpdate {
    Set(i32),
    Increment(i32),
    Decrement(i32),
}

impl NumericUpdate {
    pub fn expr<C: ColumnTrait>(self, col: C) -> SimpleExpr {
        match self {
            NumericUpdate::Set(v) => Expr::value(v),
            NumericUpdate::Increment(v) => Expr::col(col).add(v),
            NumericUpdate::Decrement(v) => Expr::col(col).sub(v),
        }
    }

    /// Absolute values must respect the non-negative column rules.
    pub fn validate(self, field: &str) -> Result<()> {
        match self {
            NumericUpdate::Set(v) => Ok(models::errors::require_non_negative(field, v)?),
            NumericUpdate::Increment(_) | NumericUpdate::Decrement(_) => Ok(()),
        }
    }
}

/// Fresh primary key for rows whose id the caller left unset.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fails with a foreign-key violation unless `id` names a live row of `P`.
pub async fn ensure_live_parent<P, C>(db: &C, id: &str) -> Result<()>
where
    P: CrudEntity,
    C: ConnectionTrait,
    <P::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    let parent = P::find_by_id(id.to_owned())
        .filter(P::deleted_at().is_null())
        .one(db)
        .await?;
    match parent {
        Some(_) => Ok(()),
        None => Err(ServiceError::foreign_key(format!("{} {} does not exist or is deleted", P::NAME, id))),
    }
}

/// Sort key: column, direction and optional null placement.
pub type OrderSpec<C> = (C, Order, Option<NullOrdering>);

/// Arguments for `find_many` and friends.
///
/// The cursor is exclusive: results start strictly after the cursor row.
pub struct FindManyArgs<E: CrudEntity> {
    pub filter: Condition,
    pub order_by: Vec<OrderSpec<E::Column>>,
    pub cursor: Option<E::Unique>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub distinct: Vec<E::Column>,
    pub live_only: bool,
}

impl<E: CrudEntity> Default for FindManyArgs<E> {
    fn default() -> Self {
        Self {
            filter: Condition::all(),
            order_by: Vec::new(),
            cursor: None,
            skip: None,
            take: None,
            distinct: Vec::new(),
            live_only: false,
        }
    }
}

impl<E: CrudEntity> Clone for FindManyArgs<E> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            cursor: self.cursor.clone(),
            skip: self.skip,
            take: self.take,
            distinct: self.distinct.clone(),
            live_only: self.live_only,
        }
    }
}

impl<E: CrudEntity> std::fmt::Debug for FindManyArgs<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindManyArgs")
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("cursor", &self.cursor)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("distinct", &self.distinct)
            .field("live_only", &self.live_only)
            .finish()
    }
}

impl<E: CrudEntity> FindManyArgs<E> {
    pub fn new() -> Self { Self::default() }

    /// AND another predicate into the filter.
    pub fn filter(mut self, cond: impl sea_orm::sea_query::IntoCondition) -> Self {
        self.filter = self.filter.add(cond.into_condition());
        self
    }

    pub fn order_by(mut self, col: E::Column, order: Order) -> Self {
        self.order_by.push((col, order, None));
        self
    }

    pub fn order_by_nulls(mut self, col: E::Column, order: Order, nulls: NullOrdering) -> Self {
        self.order_by.push((col, order, Some(nulls)));
        self
    }

    pub fn cursor(mut self, key: E::Unique) -> Self {
        self.cursor = Some(key);
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: u64) -> Self {
        self.take = Some(n);
        self
    }

    pub fn distinct(mut self, cols: impl IntoIterator<Item = E::Column>) -> Self {
        self.distinct.extend(cols);
        self
    }

    /// Hide soft-deleted rows.
    pub fn live_only(mut self) -> Self {
        self.live_only = true;
        self
    }

    /// Map a 1-based page onto skip/take.
    pub fn page(mut self, p: Pagination) -> Self {
        self.skip = Some(p.skip());
        self.take = Some(p.take());
        self
    }

    /// Drop cursor, skip and take, keeping filter, ordering and distinct.
    pub fn unpaged(mut self) -> Self {
        self.cursor = None;
        self.skip = None;
        self.take = None;
        self
    }

    /// True when nothing beyond the predicate shapes the result set.
    pub(crate) fn is_plain(&self) -> bool {
        self.cursor.is_none() && self.skip.is_none() && self.take.is_none() && self.distinct.is_empty()
    }

    pub(crate) fn predicate(&self) -> Condition {
        let mut cond = Condition::all().add(self.filter.clone());
        if self.live_only {
            cond = cond.add(E::deleted_at().is_null());
        }
        cond
    }
}

/// Primary-key equality for a loaded row.
pub(crate) fn pk_condition<E: CrudEntity>(model: &E::Model) -> Condition {
    E::PrimaryKey::iter().fold(Condition::all(), |cond, pk| {
        let col = pk.into_column();
        cond.add(col.eq(model.get(col)))
    })
}

/// Requested ordering with the primary key appended as a tie-breaker.
fn sort_keys<E: CrudEntity>(order_by: &[OrderSpec<E::Column>]) -> Vec<OrderSpec<E::Column>> {
    let mut keys = order_by.to_vec();
    for pk in E::PrimaryKey::iter() {
        let col = pk.into_column();
        if !keys.iter().any(|(c, _, _)| c.as_str() == col.as_str()) {
            keys.push((col, Order::Asc, None));
        }
    }
    keys
}

/// Where NULLs land for `order` when no placement is given: SQLite and MySQL
/// sort them as the smallest value, Postgres as the largest.
fn default_nulls(backend: DbBackend, order: &Order) -> NullOrdering {
    let nulls_small = !matches!(backend, DbBackend::Postgres);
    let asc = !matches!(order, Order::Desc);
    if asc == nulls_small { NullOrdering::First } else { NullOrdering::Last }
}

fn is_null(v: &Value) -> bool {
    *v == v.as_null()
}

/// Rows sorting strictly after `row` under `keys`, NULLs included.
fn after_row<E: CrudEntity>(keys: &[OrderSpec<E::Column>], row: &E::Model, backend: DbBackend) -> Condition {
    let mut any = Condition::any();
    for (i, (col, order, nulls)) in keys.iter().enumerate() {
        let mut branch = Condition::all();
        for (prev, _, _) in &keys[..i] {
            let v = row.get(*prev);
            branch = branch.add(if is_null(&v) { prev.is_null() } else { prev.eq(v) });
        }
        let value = row.get(*col);
        let placement = nulls.clone().unwrap_or_else(|| default_nulls(backend, order));
        let nulls_last = matches!(placement, NullOrdering::Last);
        let step = match (is_null(&value), nulls_last) {
            // nothing sorts after a trailing NULL within this column
            (true, true) => continue,
            (true, false) => Condition::all().add(col.is_not_null()),
            (false, last) => {
                let past = match order {
                    Order::Desc => col.lt(value),
                    _ => col.gt(value),
                };
                let step = Condition::any().add(past);
                if last { step.add(col.is_null()) } else { step }
            }
        };
        any = any.add(branch.add(step));
    }
    any
}

/// Run `select` under `args`.
pub(crate) async fn fetch<E, C>(db: &C, select: Select<E>, args: &FindManyArgs<E>) -> Result<Vec<E::Model>>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let keys = sort_keys::<E>(&args.order_by);
    let mut select = select.filter(args.predicate());

    if let Some(cursor) = &args.cursor {
        let Some(anchor) = E::find().filter(cursor.condition()).one(db).await? else {
            return Ok(Vec::new());
        };
        select = select.filter(after_row::<E>(&keys, &anchor, db.get_database_backend()));
    }

    for (col, order, nulls) in &keys {
        select = match nulls {
            Some(n) => select.order_by_with_nulls(*col, order.clone(), n.clone()),
            None => select.order_by(*col, order.clone()),
        };
    }

    if args.distinct.is_empty() {
        return Ok(select.offset(args.skip).limit(args.take).all(db).await?);
    }

    let rows = select.all(db).await?;
    let mut seen: Vec<Vec<Value>> = Vec::new();
    let mut kept = Vec::new();
    for row in rows {
        let key: Vec<Value> = args.distinct.iter().map(|c| row.get(*c)).collect();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        kept.push(row);
    }
    let skip = args.skip.unwrap_or(0) as usize;
    let take = args.take.map(|t| t as usize).unwrap_or(usize::MAX);
    Ok(kept.into_iter().skip(skip).take(take).collect())
}
