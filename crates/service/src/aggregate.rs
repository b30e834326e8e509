//! Aggregates over a filtered row set, optionally grouped.

use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, Order, QueryFilter, QueryOrder, QueryResult, QuerySelect, QueryTrait, Select};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::errors::{Result, ServiceError};
use crate::query::CrudEntity;

/// One aggregate over one column (or over rows for `CountAll`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFn<C> {
    CountAll,
    Count(C),
    Sum(C),
    Avg(C),
    Min(C),
    Max(C),
}

impl<C: ColumnTrait> AggregateFn<C> {
    fn alias(&self) -> String {
        match self {
            AggregateFn::CountAll => "_count".to_string(),
            AggregateFn::Count(c) => format!("_count_{}", c.as_str()),
            AggregateFn::Sum(c) => format!("_sum_{}", c.as_str()),
            AggregateFn::Avg(c) => format!("_avg_{}", c.as_str()),
            AggregateFn::Min(c) => format!("_min_{}", c.as_str()),
            AggregateFn::Max(c) => format!("_max_{}", c.as_str()),
        }
    }

    fn expr(&self) -> SimpleExpr {
        let bigint = || Alias::new("bigint");
        match self {
            AggregateFn::CountAll => Func::cast_as(Func::count(Expr::col(Asterisk)), bigint()).into(),
            AggregateFn::Count(c) => Func::cast_as(Func::count(Expr::col(*c)), bigint()).into(),
            AggregateFn::Sum(c) => Func::cast_as(Func::sum(Expr::col(*c)), bigint()).into(),
            AggregateFn::Avg(c) => Func::cast_as(Func::avg(Expr::col(*c)), Alias::new("float8")).into(),
            AggregateFn::Min(c) => Func::cast_as(Func::min(Expr::col(*c)), bigint()).into(),
            AggregateFn::Max(c) => Func::cast_as(Func::max(Expr::col(*c)), bigint()).into(),
        }
    }

    /// Sums and averages only make sense over numbers; counts work on anything.
    fn validate(&self) -> Result<()> {
        let col = match self {
            AggregateFn::CountAll | AggregateFn::Count(_) => return Ok(()),
            AggregateFn::Sum(c) | AggregateFn::Avg(c) | AggregateFn::Min(c) | AggregateFn::Max(c) => c,
        };
        match col.def().get_column_type() {
            ColumnType::Integer | ColumnType::BigInteger | ColumnType::SmallInteger | ColumnType::TinyInteger => Ok(()),
            other => Err(ServiceError::validation(format!("cannot aggregate {} of type {:?}", col.as_str(), other))),
        }
    }
}

/// Aggregate values keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    pub count: Option<i64>,
    pub count_fields: BTreeMap<String, i64>,
    pub sum: BTreeMap<String, Option<i64>>,
    pub avg: BTreeMap<String, Option<f64>>,
    pub min: BTreeMap<String, Option<i64>>,
    pub max: BTreeMap<String, Option<i64>>,
}

impl AggregateResult {
    fn read<C: ColumnTrait>(row: &QueryResult, fns: &[AggregateFn<C>]) -> Result<Self> {
        let mut out = AggregateResult::default();
        for f in fns {
            let alias = f.alias();
            match f {
                AggregateFn::CountAll => out.count = Some(row.try_get::<Option<i64>>("", &alias)?.unwrap_or(0)),
                AggregateFn::Count(c) => {
                    out.count_fields.insert(c.as_str().to_string(), row.try_get::<Option<i64>>("", &alias)?.unwrap_or(0));
                }
                AggregateFn::Sum(c) => {
                    out.sum.insert(c.as_str().to_string(), row.try_get("", &alias)?);
                }
                AggregateFn::Avg(c) => {
                    out.avg.insert(c.as_str().to_string(), row.try_get("", &alias)?);
                }
                AggregateFn::Min(c) => {
                    out.min.insert(c.as_str().to_string(), row.try_get("", &alias)?);
                }
                AggregateFn::Max(c) => {
                    out.max.insert(c.as_str().to_string(), row.try_get("", &alias)?);
                }
            }
        }
        Ok(out)
    }
}

pub struct AggregateArgs<E: CrudEntity> {
    pub filter: Condition,
    pub live_only: bool,
    pub aggregates: Vec<AggregateFn<E::Column>>,
}

impl<E: CrudEntity> Default for AggregateArgs<E> {
    fn default() -> Self { Self { filter: Condition::all(), live_only: false, aggregates: Vec::new() } }
}

impl<E: CrudEntity> AggregateArgs<E> {
    pub fn new(aggregates: Vec<AggregateFn<E::Column>>) -> Self { Self { aggregates, ..Default::default() } }

    pub fn filter(mut self, cond: impl sea_orm::sea_query::IntoCondition) -> Self {
        self.filter = self.filter.add(cond.into_condition());
        self
    }

    pub fn live_only(mut self) -> Self {
        self.live_only = true;
        self
    }

    fn predicate(&self) -> Condition {
        let mut cond = Condition::all().add(self.filter.clone());
        if self.live_only {
            cond = cond.add(E::deleted_at().is_null());
        }
        cond
    }
}

fn select_aggregates<E: CrudEntity>(mut select: Select<E>, fns: &[AggregateFn<E::Column>]) -> Result<Select<E>> {
    if fns.is_empty() {
        return Err(ServiceError::validation("at least one aggregate is required"));
    }
    for f in fns {
        f.validate()?;
        select = select.expr_as(f.expr(), f.alias());
    }
    Ok(select)
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn aggregate<E, C>(db: &C, args: &AggregateArgs<E>) -> Result<AggregateResult>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    let select = select_aggregates(E::find().select_only().filter(args.predicate()), &args.aggregates)?;
    let stmt = select.build(db.get_database_backend());
    debug!(sql = %stmt.sql, "aggregate");
    let Some(row) = db.query_one(stmt).await? else {
        return Ok(AggregateResult::default());
    };
    AggregateResult::read(&row, &args.aggregates)
}

/// Comparison used in `having`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HavingOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Left-hand side of a `having` predicate.
#[derive(Clone, Copy, Debug)]
pub enum HavingTarget<C> {
    Field(C),
    Aggregate(AggregateFn<C>),
}

#[derive(Clone, Debug)]
pub struct Having<C> {
    pub target: HavingTarget<C>,
    pub op: HavingOp,
    pub value: Value,
}

impl<C> Having<C> {
    pub fn new(target: HavingTarget<C>, op: HavingOp, value: impl Into<Value>) -> Self {
        Self { target, op, value: value.into() }
    }
}

/// Sort key for grouped rows.
#[derive(Clone, Debug)]
pub enum GroupOrder<C> {
    Field(C, Order),
    Aggregate(AggregateFn<C>, Order),
}

pub struct GroupByArgs<E: CrudEntity> {
    pub by: Vec<E::Column>,
    pub filter: Condition,
    pub live_only: bool,
    pub aggregates: Vec<AggregateFn<E::Column>>,
    pub having: Vec<Having<E::Column>>,
    pub order_by: Vec<GroupOrder<E::Column>>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<E: CrudEntity> GroupByArgs<E> {
    pub fn new(by: Vec<E::Column>, aggregates: Vec<AggregateFn<E::Column>>) -> Self {
        Self {
            by,
            filter: Condition::all(),
            live_only: false,
            aggregates,
            having: Vec::new(),
            order_by: Vec::new(),
            skip: None,
            take: None,
        }
    }

    pub fn filter(mut self, cond: impl sea_orm::sea_query::IntoCondition) -> Self {
        self.filter = self.filter.add(cond.into_condition());
        self
    }

    pub fn having(mut self, h: Having<E::Column>) -> Self {
        self.having.push(h);
        self
    }

    pub fn order_by(mut self, o: GroupOrder<E::Column>) -> Self {
        self.order_by.push(o);
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

    fn is_grouped(&self, col: &E::Column) -> bool {
        self.by.iter().any(|c| c.as_str() == col.as_str())
    }
}

/// One group: the grouping values plus the requested aggregates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: serde_json::Map<String, JsonValue>,
    #[serde(flatten)]
    pub aggregates: AggregateResult,
}

fn having_expr<C: ColumnTrait>(h: &Having<C>) -> Result<SimpleExpr> {
    let lhs = match &h.target {
        HavingTarget::Field(c) => Expr::col(*c),
        HavingTarget::Aggregate(f) => {
            f.validate()?;
            Expr::expr(f.expr())
        }
    };
    let v = h.value.clone();
    Ok(match h.op {
        HavingOp::Eq => lhs.eq(v),
        HavingOp::Ne => lhs.ne(v),
        HavingOp::Gt => lhs.gt(v),
        HavingOp::Gte => lhs.gte(v),
        HavingOp::Lt => lhs.lt(v),
        HavingOp::Lte => lhs.lte(v),
    })
}

fn read_group_key<C: ColumnTrait>(row: &QueryResult, col: C) -> Result<JsonValue> {
    let name = col.as_str();
    let value = match col.def().get_column_type() {
        ColumnType::Integer | ColumnType::SmallInteger | ColumnType::TinyInteger => {
            serde_json::to_value(row.try_get::<Option<i32>>("", name)?)
        }
        ColumnType::BigInteger => serde_json::to_value(row.try_get::<Option<i64>>("", name)?),
        ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_) => {
            serde_json::to_value(row.try_get::<Option<String>>("", name)?)
        }
        ColumnType::TimestampWithTimeZone => {
            serde_json::to_value(row.try_get::<Option<DateTimeWithTimeZone>>("", name)?)
        }
        ColumnType::Time => serde_json::to_value(row.try_get::<Option<chrono::NaiveTime>>("", name)?),
        other => return Err(ServiceError::validation(format!("cannot group by {} of type {:?}", name, other))),
    };
    value.map_err(|e| ServiceError::Db(e.to_string()))
}

#[instrument(skip_all, fields(entity = E::NAME))]
pub async fn group_by<E, C>(db: &C, args: &GroupByArgs<E>) -> Result<Vec<GroupRow>>
where
    E: CrudEntity,
    C: ConnectionTrait,
{
    if args.by.is_empty() {
        return Err(ServiceError::validation("group_by needs at least one column"));
    }
    let mut cond = Condition::all().add(args.filter.clone());
    if args.live_only {
        cond = cond.add(E::deleted_at().is_null());
    }

    let mut select = E::find().select_only().filter(cond);
    for col in &args.by {
        select = select.column(*col).group_by(*col);
    }
    if !args.aggregates.is_empty() {
        select = select_aggregates(select, &args.aggregates)?;
    }
    for h in &args.having {
        if let HavingTarget::Field(c) = &h.target {
            if !args.is_grouped(c) {
                return Err(ServiceError::validation(format!("having on {} requires grouping by it", c.as_str())));
            }
        }
        select = select.having(having_expr(h)?);
    }
    for o in &args.order_by {
        select = match o {
            GroupOrder::Field(c, ord) => {
                if !args.is_grouped(c) {
                    return Err(ServiceError::validation(format!("cannot order groups by ungrouped {}", c.as_str())));
                }
                select.order_by(*c, ord.clone())
            }
            GroupOrder::Aggregate(f, ord) => {
                f.validate()?;
                select.order_by(f.expr(), ord.clone())
            }
        };
    }
    let stmt = select.offset(args.skip).limit(args.take).build(db.get_database_backend());
    debug!(sql = %stmt.sql, "group_by");

    let rows = db.query_all(stmt).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut keys = serde_json::Map::new();
        for col in &args.by {
            keys.insert(col.as_str().to_string(), read_group_key(&row, *col)?);
        }
        out.push(GroupRow { keys, aggregates: AggregateResult::read(&row, &args.aggregates)? });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::event_ticket;

    #[test]
    fn numeric_only_for_sum() {
        assert!(AggregateFn::Sum(event_ticket::Column::Price).validate().is_ok());
        assert!(AggregateFn::Sum(event_ticket::Column::Title).validate().is_err());
        assert!(AggregateFn::Count(event_ticket::Column::Title).validate().is_ok());
    }

    #[test]
    fn aliases_are_per_column() {
        assert_eq!(AggregateFn::Avg(event_ticket::Column::Price).alias(), "_avg_price");
        assert_eq!(AggregateFn::<event_ticket::Column>::CountAll.alias(), "_count");
    }
}
