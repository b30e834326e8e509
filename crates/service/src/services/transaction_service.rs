use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveEnum, Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, Set};
use serde::Serialize;
use tracing::info;

use models::{event, event_ticket, organizer, ticket, transaction, user, voucher, TransactionStatus};

use crate::crud;
use crate::errors::{Result, ServiceError};
use crate::query::{ensure_live_parent, new_id, CreateInput, CrudEntity, FindManyArgs, NumericUpdate, UniqueKey, UpdateInput};
use crate::relations::{load_children, load_parent};
use crate::services::event_ticket_service::{EventTicketKey, EventTicketUpdate};
use crate::services::ticket_service::NewTicket;
use crate::services::user_service::UserUpdate;
use crate::services::voucher_service;
use crate::transaction::{run_in_transaction, TransactionOptions};

impl CrudEntity for transaction::Entity {
    const NAME: &'static str = "Transaction";
    type Active = transaction::ActiveModel;
    type Unique = TransactionKey;
    type Create = NewTransaction;
    type Update = TransactionUpdate;

    fn updated_at() -> transaction::Column { transaction::Column::UpdatedAt }
    fn deleted_at() -> transaction::Column { transaction::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionKey {
    Id(String),
}

impl UniqueKey<transaction::Entity> for TransactionKey {
    fn condition(&self) -> Condition {
        let TransactionKey::Id(id) = self;
        Condition::all().add(transaction::Column::Id.eq(id.as_str()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewTransaction {
    pub id: Option<String>,
    pub point_used: Option<i32>,
    pub total_price: i32,
    pub payment_proof: Option<String>,
    pub status: Option<TransactionStatus>,
    pub user_id: String,
    pub event_id: String,
    pub organizer_id: String,
    pub voucher_code: Option<String>,
}

#[async_trait]
impl CreateInput<transaction::Entity> for NewTransaction {
    fn validate(&self) -> Result<()> {
        transaction::validate_amounts(self.total_price, self.point_used)?;
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        ensure_live_parent::<user::Entity, _>(db, &self.user_id).await?;
        ensure_live_parent::<event::Entity, _>(db, &self.event_id).await?;
        ensure_live_parent::<organizer::Entity, _>(db, &self.organizer_id).await?;
        if let Some(code) = &self.voucher_code {
            ensure_live_parent::<voucher::Entity, _>(db, code).await?;
        }
        Ok(())
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> transaction::ActiveModel {
        transaction::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            point_used: Set(self.point_used),
            total_price: Set(self.total_price),
            payment_proof: Set(self.payment_proof),
            status: Set(self.status.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            user_id: Set(self.user_id),
            event_id: Set(self.event_id),
            organizer_id: Set(self.organizer_id),
            voucher_code: Set(self.voucher_code),
        }
    }
}

/// `Some(None)` clears a nullable column.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub point_used: Option<Option<i32>>,
    pub total_price: Option<NumericUpdate>,
    pub payment_proof: Option<Option<String>>,
    pub status: Option<TransactionStatus>,
    pub voucher_code: Option<Option<String>>,
}

#[async_trait]
impl UpdateInput<transaction::Entity> for TransactionUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(Some(points)) = self.point_used {
            models::errors::require_non_negative("point_used", points)?;
        }
        if let Some(total) = self.total_price {
            total.validate("total_price")?;
        }
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        match &self.voucher_code {
            Some(Some(code)) => ensure_live_parent::<voucher::Entity, _>(db, code).await,
            _ => Ok(()),
        }
    }

    fn changes(&self) -> Vec<(transaction::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = self.point_used { out.push((transaction::Column::PointUsed, Expr::value(v))); }
        if let Some(v) = self.total_price { out.push((transaction::Column::TotalPrice, v.expr(transaction::Column::TotalPrice))); }
        if let Some(v) = &self.payment_proof { out.push((transaction::Column::PaymentProof, Expr::value(v.clone()))); }
        if let Some(v) = &self.status { out.push((transaction::Column::Status, Expr::value(v.into_value()))); }
        if let Some(v) = &self.voucher_code { out.push((transaction::Column::VoucherCode, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionInclude {
    pub user: bool,
    pub event: bool,
    pub organizer: bool,
    pub voucher: bool,
    pub tickets: Option<FindManyArgs<ticket::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TransactionWithRelations {
    #[serde(flatten)]
    pub transaction: transaction::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<user::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<event::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<organizer::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<voucher::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<ticket::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(
    db: &C,
    transaction: transaction::Model,
    include: &TransactionInclude,
) -> Result<TransactionWithRelations> {
    let user = match include.user {
        true => load_parent::<transaction::Entity, user::Entity, _>(db, &transaction).await?,
        false => None,
    };
    let event = match include.event {
        true => load_parent::<transaction::Entity, event::Entity, _>(db, &transaction).await?,
        false => None,
    };
    let organizer = match include.organizer {
        true => load_parent::<transaction::Entity, organizer::Entity, _>(db, &transaction).await?,
        false => None,
    };
    // optional relation: no code, no voucher
    let voucher = match (include.voucher, &transaction.voucher_code) {
        (true, Some(_)) => load_parent::<transaction::Entity, voucher::Entity, _>(db, &transaction).await?,
        _ => None,
    };
    let tickets = match &include.tickets {
        Some(args) => Some(load_children::<transaction::Entity, _, _>(db, &transaction, args).await?),
        None => None,
    };
    Ok(TransactionWithRelations { transaction, user, event, organizer, voucher, tickets })
}

pub async fn find_with_relations<C: ConnectionTrait>(
    db: &C,
    key: &TransactionKey,
    include: &TransactionInclude,
) -> Result<Option<TransactionWithRelations>> {
    match crud::find_unique::<transaction::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}

/// A purchase request: which tiers, how many seats of each, and what discounts.
#[derive(Clone, Debug, Default)]
pub struct Checkout {
    pub user_id: String,
    pub event_id: String,
    pub items: Vec<(String, i32)>,
    pub voucher_code: Option<String>,
    pub points: Option<i32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutReceipt {
    pub transaction: transaction::Model,
    pub tickets: Vec<ticket::Model>,
}

async fn checkout_in(txn: &DatabaseTransaction, req: Checkout) -> Result<CheckoutReceipt> {
    if req.items.is_empty() || req.items.iter().any(|(_, qty)| *qty <= 0) {
        return Err(ServiceError::validation("checkout needs at least one item with a positive quantity"));
    }
    let ev = crud::find_unique_or_throw::<event::Entity, _>(txn, &crate::services::event_service::EventKey::Id(req.event_id.clone())).await?;

    let mut subtotal: i64 = 0;
    for (tier_id, qty) in &req.items {
        let key = EventTicketKey::Id(tier_id.clone());
        let tier = crud::find_unique_or_throw::<event_ticket::Entity, _>(txn, &key).await?;
        if tier.event_id != ev.id {
            return Err(ServiceError::validation(format!("ticket tier {tier_id} belongs to another event")));
        }
        let cond = key.condition().add(event_ticket::Column::Limit.gte(*qty));
        let seats = EventTicketUpdate { limit: Some(NumericUpdate::Decrement(*qty)), ..Default::default() };
        if crud::update_many::<event_ticket::Entity, _>(txn, cond, &seats).await?.count == 0 {
            return Err(ServiceError::validation(format!("not enough seats left for {}", tier.title)));
        }
        subtotal += tier.price as i64 * *qty as i64;
    }

    if let Some(code) = &req.voucher_code {
        let v = voucher_service::redeem(txn, code, &ev.id).await?;
        subtotal -= v.discount as i64;
    }
    // points cover at most what is left to pay
    let spend = req.points.unwrap_or(0).clamp(0, i32::try_from(subtotal.max(0)).unwrap_or(i32::MAX));
    if spend > 0 {
        let cond = crate::services::user_service::UserKey::Id(req.user_id.clone())
            .condition()
            .add(user::Column::Point.gte(spend));
        let debit = UserUpdate { point: Some(NumericUpdate::Decrement(spend)), ..Default::default() };
        if crud::update_many::<user::Entity, _>(txn, cond, &debit).await?.count == 0 {
            return Err(ServiceError::validation("not enough points"));
        }
        subtotal -= spend as i64;
    }
    let total_price = i32::try_from(subtotal.max(0)).map_err(|_| ServiceError::validation("total price out of range"))?;

    let trx = crud::create::<transaction::Entity, _>(
        txn,
        NewTransaction {
            point_used: (spend > 0).then_some(spend),
            total_price,
            user_id: req.user_id.clone(),
            event_id: ev.id.clone(),
            organizer_id: ev.organizer_id.clone(),
            voucher_code: req.voucher_code.clone(),
            ..Default::default()
        },
    )
    .await?;

    let mut tickets = Vec::new();
    for (tier_id, qty) in &req.items {
        for _ in 0..*qty {
            let input = NewTicket { event_ticket_id: tier_id.clone(), transaction_id: trx.id.clone(), ..Default::default() };
            tickets.push(crud::create::<ticket::Entity, _>(txn, input).await?);
        }
    }
    info!(transaction_id = %trx.id, tickets = tickets.len(), total_price, "checkout completed");
    Ok(CheckoutReceipt { transaction: trx, tickets })
}

/// Reserve seats, apply voucher and points, record the transaction and issue
/// tickets, all in one transaction.
pub async fn checkout(db: &DatabaseConnection, opts: &TransactionOptions, req: Checkout) -> Result<CheckoutReceipt> {
    run_in_transaction(db, opts, move |txn| Box::pin(checkout_in(txn, req))).await
}

/// Move a transaction to a new status, optionally attaching payment proof.
pub async fn set_status<C>(db: &C, id: &str, status: TransactionStatus, payment_proof: Option<String>) -> Result<transaction::Model>
where
    C: ConnectionTrait + sea_orm::TransactionTrait,
{
    let changes = TransactionUpdate {
        status: Some(status),
        payment_proof: payment_proof.map(Some),
        ..Default::default()
    };
    crud::update::<transaction::Entity, _>(db, &TransactionKey::Id(id.to_string()), &changes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{self, AggregateFn, GroupByArgs};
    use crate::errors::ConstraintKind;
    use crate::services::user_service::UserKey;
    use crate::services::voucher_service::VoucherKey;
    use crate::test_support::{get_db, seed_event, seed_organizer, seed_ticket_tier, seed_user, seed_voucher};

    #[tokio::test]
    async fn status_defaults_and_optional_voucher() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let buyer = seed_user(&db).await?;
        let input = NewTransaction {
            total_price: 50_000,
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            organizer_id: org.id.clone(),
            ..Default::default()
        };
        let trx = crud::create::<transaction::Entity, _>(&db, input.clone()).await?;
        assert_eq!(trx.status, TransactionStatus::WaitingPayment);
        assert!(trx.voucher_code.is_none());

        let bad_voucher = NewTransaction { voucher_code: Some("NOPE".into()), ..input.clone() };
        let err = crud::create::<transaction::Entity, _>(&db, bad_voucher).await.unwrap_err();
        assert!(matches!(err, ServiceError::ConstraintViolation { kind: ConstraintKind::ForeignKey, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn missing_parents_are_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let buyer = seed_user(&db).await?;
        let input = NewTransaction {
            total_price: 1,
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            organizer_id: org.id.clone(),
            ..Default::default()
        };
        let missing = new_id();
        for bad in [
            NewTransaction { user_id: missing.clone(), ..input.clone() },
            NewTransaction { event_id: missing.clone(), ..input.clone() },
            NewTransaction { organizer_id: missing.clone(), ..input.clone() },
        ] {
            let err = crud::create::<transaction::Entity, _>(&db, bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::ConstraintViolation { kind: ConstraintKind::ForeignKey, .. }));
        }
        let mine = FindManyArgs::new().filter(transaction::Column::UserId.eq(buyer.id.as_str()));
        assert_eq!(crud::count::<transaction::Entity, _>(&db, &mine).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn status_flow_and_clearing_nullable_fields() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let buyer = seed_user(&db).await?;
        let trx = crud::create::<transaction::Entity, _>(
            &db,
            NewTransaction { total_price: 10, user_id: buyer.id, event_id: ev.id, organizer_id: org.id, ..Default::default() },
        )
        .await?;

        let paid = set_status(&db, &trx.id, TransactionStatus::WaitingForConfirmation, Some("proof.png".into())).await?;
        assert_eq!(paid.payment_proof.as_deref(), Some("proof.png"));
        let done = set_status(&db, &trx.id, TransactionStatus::Done, None).await?;
        assert_eq!(done.status, TransactionStatus::Done);
        assert_eq!(done.payment_proof.as_deref(), Some("proof.png"));

        let cleared = crud::update::<transaction::Entity, _>(
            &db,
            &TransactionKey::Id(trx.id.clone()),
            &TransactionUpdate { payment_proof: Some(None), ..Default::default() },
        )
        .await?;
        assert!(cleared.payment_proof.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn checkout_issues_tickets_and_spends_discounts() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 100_000).await?;
        let v = seed_voucher(&db, &ev.id, 1).await?;
        let buyer = seed_user(&db).await?;
        crud::update::<user::Entity, _>(
            &db,
            &UserKey::Id(buyer.id.clone()),
            &UserUpdate { point: Some(NumericUpdate::Set(5_000)), ..Default::default() },
        )
        .await?;

        let req = Checkout {
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            items: vec![(tier.id.clone(), 2)],
            voucher_code: Some(v.code.clone()),
            points: Some(5_000),
        };
        let receipt = checkout(&db, &TransactionOptions::default(), req).await?;
        assert_eq!(receipt.tickets.len(), 2);
        assert_eq!(receipt.transaction.total_price, 200_000 - v.discount - 5_000);
        assert_eq!(receipt.transaction.organizer_id, org.id);
        assert_ne!(receipt.tickets[0].qr_code, receipt.tickets[1].qr_code);

        let tier_after = crud::find_unique_or_throw::<event_ticket::Entity, _>(&db, &EventTicketKey::Id(tier.id)).await?;
        assert_eq!(tier_after.limit, tier.limit - 2);
        let voucher_after = crud::find_unique_or_throw::<voucher::Entity, _>(&db, &VoucherKey::Code(v.code)).await?;
        assert_eq!(voucher_after.quota, 0);
        let buyer_after = crud::find_unique_or_throw::<user::Entity, _>(&db, &UserKey::Id(buyer.id)).await?;
        assert_eq!(buyer_after.point, 0);

        let include = TransactionInclude { voucher: true, user: true, tickets: Some(FindManyArgs::new()), ..Default::default() };
        let loaded = find_with_relations(&db, &TransactionKey::Id(receipt.transaction.id.clone()), &include).await?.expect("trx");
        assert_eq!(loaded.voucher.map(|v| v.quota), Some(0));
        assert_eq!(loaded.tickets.map(|t| t.len()), Some(2));
        assert!(loaded.event.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_checkout_leaves_nothing_behind() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 1_000).await?;
        let buyer = seed_user(&db).await?;

        // seats get reserved first, then the points check fails
        let req = Checkout {
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            items: vec![(tier.id.clone(), 1)],
            points: Some(999),
            ..Default::default()
        };
        assert!(checkout(&db, &TransactionOptions::default(), req).await.is_err());

        let tier_after = crud::find_unique_or_throw::<event_ticket::Entity, _>(&db, &EventTicketKey::Id(tier.id.clone())).await?;
        assert_eq!(tier_after.limit, tier.limit);
        let for_event = FindManyArgs::new().filter(transaction::Column::EventId.eq(ev.id.as_str()));
        assert_eq!(crud::count::<transaction::Entity, _>(&db, &for_event).await?, 0);
        let for_tier = FindManyArgs::new().filter(ticket::Column::EventTicketId.eq(tier.id.as_str()));
        assert_eq!(crud::count::<ticket::Entity, _>(&db, &for_tier).await?, 0);

        let too_many = Checkout { user_id: buyer.id, event_id: ev.id, items: vec![(tier.id, tier.limit + 1)], ..Default::default() };
        assert!(matches!(checkout(&db, &TransactionOptions::default(), too_many).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn revenue_grouped_by_status() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let buyer = seed_user(&db).await?;
        for (price, status) in [(10, TransactionStatus::Done), (20, TransactionStatus::Done), (5, TransactionStatus::Rejected)] {
            crud::create::<transaction::Entity, _>(
                &db,
                NewTransaction {
                    total_price: price,
                    status: Some(status),
                    user_id: buyer.id.clone(),
                    event_id: ev.id.clone(),
                    organizer_id: org.id.clone(),
                    ..Default::default()
                },
            )
            .await?;
        }
        let args = GroupByArgs::<transaction::Entity>::new(
            vec![transaction::Column::Status],
            vec![AggregateFn::Sum(transaction::Column::TotalPrice)],
        )
        .filter(transaction::Column::EventId.eq(ev.id.as_str()))
        .order_by(aggregate::GroupOrder::Field(transaction::Column::Status, sea_orm::Order::Asc));
        let groups = aggregate::group_by(&db, &args).await?;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].keys["status"], serde_json::json!("DONE"));
        assert_eq!(groups[0].aggregates.sum["total_price"], Some(30));
        assert_eq!(groups[1].keys["status"], serde_json::json!("REJECTED"));
        Ok(())
    }

    #[tokio::test]
    async fn points_are_capped_at_the_price() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 3_000).await?;
        let buyer = seed_user(&db).await?;
        crud::update::<user::Entity, _>(
            &db,
            &UserKey::Id(buyer.id.clone()),
            &UserUpdate { point: Some(NumericUpdate::Set(10_000)), ..Default::default() },
        )
        .await?;

        let req = Checkout {
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            items: vec![(tier.id.clone(), 1)],
            points: Some(10_000),
            ..Default::default()
        };
        let receipt = checkout(&db, &TransactionOptions::default(), req).await?;
        assert_eq!(receipt.transaction.total_price, 0);
        assert_eq!(receipt.transaction.point_used, Some(3_000));
        let buyer_after = crud::find_unique_or_throw::<user::Entity, _>(&db, &UserKey::Id(buyer.id.clone())).await?;
        assert_eq!(buyer_after.point, 7_000);

        // a voucher worth more than the order leaves nothing for points to cover
        let v = seed_voucher(&db, &ev.id, 1).await?;
        let cheap = seed_ticket_tier(&db, &ev.id, v.discount / 2).await?;
        let req = Checkout {
            user_id: buyer.id.clone(),
            event_id: ev.id.clone(),
            items: vec![(cheap.id, 1)],
            voucher_code: Some(v.code),
            points: Some(500),
        };
        let receipt = checkout(&db, &TransactionOptions::default(), req).await?;
        assert_eq!(receipt.transaction.total_price, 0);
        assert_eq!(receipt.transaction.point_used, None);
        let buyer_after = crud::find_unique_or_throw::<user::Entity, _>(&db, &UserKey::Id(buyer.id)).await?;
        assert_eq!(buyer_after.point, 7_000);
        Ok(())
    }

    #[tokio::test]
    async fn cursor_pages_through_null_sort_keys() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let buyer = seed_user(&db).await?;
        for points in [Some(5), None, None, Some(1)] {
            crud::create::<transaction::Entity, _>(
                &db,
                NewTransaction {
                    point_used: points,
                    total_price: 10,
                    user_id: buyer.id.clone(),
                    event_id: ev.id.clone(),
                    organizer_id: org.id.clone(),
                    ..Default::default()
                },
            )
            .await?;
        }

        let orderings = [
            (sea_orm::Order::Asc, Some(sea_orm::sea_query::NullOrdering::Last)),
            (sea_orm::Order::Desc, Some(sea_orm::sea_query::NullOrdering::First)),
            (sea_orm::Order::Asc, None),
            (sea_orm::Order::Desc, None),
        ];
        for (order, nulls) in orderings {
            let mut base = FindManyArgs::new().filter(transaction::Column::EventId.eq(ev.id.as_str()));
            base = match nulls {
                Some(n) => base.order_by_nulls(transaction::Column::PointUsed, order, n),
                None => base.order_by(transaction::Column::PointUsed, order),
            };
            let all: Vec<String> = crud::find_many::<transaction::Entity, _>(&db, &base).await?.into_iter().map(|t| t.id).collect();
            assert_eq!(all.len(), 4);

            let mut walked = Vec::new();
            let mut cursor: Option<String> = None;
            loop {
                let mut page = base.clone().take(1);
                if let Some(id) = cursor.take() {
                    page = page.cursor(TransactionKey::Id(id));
                }
                let Some(row) = crud::find_many::<transaction::Entity, _>(&db, &page).await?.into_iter().next() else {
                    break;
                };
                cursor = Some(row.id.clone());
                walked.push(row.id);
                assert!(walked.len() <= 4, "cursor revisited rows");
            }
            assert_eq!(walked, all);
        }
        Ok(())
    }
}
