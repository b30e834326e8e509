use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::{event, transaction, voucher};

use crate::crud;
use crate::errors::{Result, ServiceError};
use crate::query::{ensure_live_parent, CreateInput, CrudEntity, FindManyArgs, NumericUpdate, UniqueKey, UpdateInput};
use crate::relations::{load_children, load_parent};

impl CrudEntity for voucher::Entity {
    const NAME: &'static str = "Voucher";
    type Active = voucher::ActiveModel;
    type Unique = VoucherKey;
    type Create = NewVoucher;
    type Update = VoucherUpdate;

    fn updated_at() -> voucher::Column { voucher::Column::UpdatedAt }
    fn deleted_at() -> voucher::Column { voucher::Column::DeletedAt }
}

/// Vouchers are addressed by their code, which is also the primary key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoucherKey {
    Code(String),
}

impl UniqueKey<voucher::Entity> for VoucherKey {
    fn condition(&self) -> Condition {
        let VoucherKey::Code(code) = self;
        Condition::all().add(voucher::Column::Code.eq(code.as_str()))
    }
}

#[derive(Clone, Debug)]
pub struct NewVoucher {
    pub code: String,
    pub discount: i32,
    pub quota: i32,
    pub expired_date: DateTimeWithTimeZone,
    pub event_id: String,
}

#[async_trait]
impl CreateInput<voucher::Entity> for NewVoucher {
    fn validate(&self) -> Result<()> {
        voucher::validate_code(&self.code)?;
        voucher::validate_terms(self.discount, self.quota)?;
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        ensure_live_parent::<event::Entity, _>(db, &self.event_id).await
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> voucher::ActiveModel {
        voucher::ActiveModel {
            code: Set(self.code),
            discount: Set(self.discount),
            quota: Set(self.quota),
            expired_date: Set(self.expired_date),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            event_id: Set(self.event_id),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VoucherUpdate {
    pub discount: Option<NumericUpdate>,
    pub quota: Option<NumericUpdate>,
    pub expired_date: Option<DateTimeWithTimeZone>,
    pub event_id: Option<String>,
}

#[async_trait]
impl UpdateInput<voucher::Entity> for VoucherUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(discount) = self.discount {
            discount.validate("discount")?;
        }
        if let Some(quota) = self.quota {
            quota.validate("quota")?;
        }
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        match &self.event_id {
            Some(id) => ensure_live_parent::<event::Entity, _>(db, id).await,
            None => Ok(()),
        }
    }

    fn changes(&self) -> Vec<(voucher::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = self.discount { out.push((voucher::Column::Discount, v.expr(voucher::Column::Discount))); }
        if let Some(v) = self.quota { out.push((voucher::Column::Quota, v.expr(voucher::Column::Quota))); }
        if let Some(v) = self.expired_date { out.push((voucher::Column::ExpiredDate, Expr::value(v))); }
        if let Some(v) = &self.event_id { out.push((voucher::Column::EventId, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct VoucherInclude {
    pub event: bool,
    pub transactions: Option<FindManyArgs<transaction::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VoucherWithRelations {
    #[serde(flatten)]
    pub voucher: voucher::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<event::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<transaction::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(db: &C, voucher: voucher::Model, include: &VoucherInclude) -> Result<VoucherWithRelations> {
    let event = if include.event {
        load_parent::<voucher::Entity, event::Entity, _>(db, &voucher).await?
    } else {
        None
    };
    let transactions = match &include.transactions {
        Some(args) => Some(load_children::<voucher::Entity, _, _>(db, &voucher, args).await?),
        None => None,
    };
    Ok(VoucherWithRelations { voucher, event, transactions })
}

pub async fn find_with_relations<C: ConnectionTrait>(
    db: &C,
    key: &VoucherKey,
    include: &VoucherInclude,
) -> Result<Option<VoucherWithRelations>> {
    match crud::find_unique::<voucher::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}

/// Take one use of a voucher for `event_id`.
///
/// The quota decrement is conditional in SQL, so two buyers racing for the
/// last use cannot both succeed.
pub async fn redeem<C: ConnectionTrait>(db: &C, code: &str, event_id: &str) -> Result<voucher::Model> {
    let key = VoucherKey::Code(code.to_string());
    let found = crud::find_unique_or_throw::<voucher::Entity, _>(db, &key).await?;
    if found.event_id != event_id {
        return Err(ServiceError::validation(format!("voucher {code} is not valid for this event")));
    }
    let now = crud::now();
    if !found.is_redeemable(now) {
        return Err(ServiceError::validation(format!("voucher {code} is expired or used up")));
    }
    let cond = key
        .condition()
        .add(voucher::Column::Quota.gt(0))
        .add(voucher::Column::DeletedAt.is_null());
    let taken = crud::update_many::<voucher::Entity, _>(
        db,
        cond,
        &VoucherUpdate { quota: Some(NumericUpdate::Decrement(1)), ..Default::default() },
    )
    .await?;
    if taken.count == 0 {
        return Err(ServiceError::validation(format!("voucher {code} is used up")));
    }
    crud::find_unique_or_throw::<voucher::Entity, _>(db, &key).await
}
