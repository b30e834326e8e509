use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::{event_ticket, ticket, transaction};

use crate::crud;
use crate::errors::Result;
use crate::query::{ensure_live_parent, new_id, CreateInput, CrudEntity, UniqueKey, UpdateInput};
use crate::relations::load_parent;

impl CrudEntity for ticket::Entity {
    const NAME: &'static str = "Ticket";
    type Active = ticket::ActiveModel;
    type Unique = TicketKey;
    type Create = NewTicket;
    type Update = TicketUpdate;

    fn updated_at() -> ticket::Column { ticket::Column::UpdatedAt }
    fn deleted_at() -> ticket::Column { ticket::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketKey {
    Id(String),
}

impl UniqueKey<ticket::Entity> for TicketKey {
    fn condition(&self) -> Condition {
        let TicketKey::Id(id) = self;
        Condition::all().add(ticket::Column::Id.eq(id.as_str()))
    }
}

/// An issued seat. The QR payload is generated unless supplied.
#[derive(Clone, Debug, Default)]
pub struct NewTicket {
    pub id: Option<String>,
    pub qr_code: Option<String>,
    pub event_ticket_id: String,
    pub transaction_id: String,
}

#[async_trait]
impl CreateInput<ticket::Entity> for NewTicket {
    fn validate(&self) -> Result<()> {
        if let Some(qr) = &self.qr_code {
            models::errors::require_non_blank("qr_code", qr)?;
        }
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        ensure_live_parent::<event_ticket::Entity, _>(db, &self.event_ticket_id).await?;
        ensure_live_parent::<transaction::Entity, _>(db, &self.transaction_id).await
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> ticket::ActiveModel {
        ticket::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            qr_code: Set(self.qr_code.unwrap_or_else(ticket::generate_qr_code)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            event_ticket_id: Set(self.event_ticket_id),
            transaction_id: Set(self.transaction_id),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TicketUpdate {
    pub qr_code: Option<String>,
    pub event_ticket_id: Option<String>,
    pub transaction_id: Option<String>,
}

#[async_trait]
impl UpdateInput<ticket::Entity> for TicketUpdate {
    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        if let Some(id) = &self.event_ticket_id {
            ensure_live_parent::<event_ticket::Entity, _>(db, id).await?;
        }
        if let Some(id) = &self.transaction_id {
            ensure_live_parent::<transaction::Entity, _>(db, id).await?;
        }
        Ok(())
    }

    fn changes(&self) -> Vec<(ticket::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = &self.qr_code { out.push((ticket::Column::QrCode, Expr::value(v.clone()))); }
        if let Some(v) = &self.event_ticket_id { out.push((ticket::Column::EventTicketId, Expr::value(v.clone()))); }
        if let Some(v) = &self.transaction_id { out.push((ticket::Column::TransactionId, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct TicketInclude {
    pub event_ticket: bool,
    pub transaction: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct TicketWithRelations {
    #[serde(flatten)]
    pub ticket: ticket::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ticket: Option<event_ticket::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<transaction::Model>,
}

pub async fn load_relations<C: ConnectionTrait>(db: &C, ticket: ticket::Model, include: &TicketInclude) -> Result<TicketWithRelations> {
    let event_ticket = if include.event_ticket {
        load_parent::<ticket::Entity, event_ticket::Entity, _>(db, &ticket).await?
    } else {
        None
    };
    let transaction = if include.transaction {
        load_parent::<ticket::Entity, transaction::Entity, _>(db, &ticket).await?
    } else {
        None
    };
    Ok(TicketWithRelations { ticket, event_ticket, transaction })
}

pub async fn find_with_relations<C: ConnectionTrait>(db: &C, key: &TicketKey, include: &TicketInclude) -> Result<Option<TicketWithRelations>> {
    match crud::find_unique::<ticket::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::BatchPayload;
    use crate::errors::ServiceError;
    use crate::query::FindManyArgs;
    use crate::test_support::{get_db, seed_event, seed_organizer, seed_ticket_tier, seed_transaction, uid};

    #[tokio::test]
    async fn qr_code_generated_and_parents_loaded() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 10).await?;
        let trx = seed_transaction(&db, &org.id, &ev.id).await?;

        let t = crud::create::<ticket::Entity, _>(
            &db,
            NewTicket { event_ticket_id: tier.id.clone(), transaction_id: trx.id.clone(), ..Default::default() },
        )
        .await?;
        assert!(Uuid::parse_str(&t.qr_code).is_ok());

        let include = TicketInclude { event_ticket: true, transaction: true };
        let loaded = find_with_relations(&db, &TicketKey::Id(t.id.clone()), &include).await?.expect("ticket");
        assert_eq!(loaded.event_ticket.map(|e| e.id), Some(tier.id));
        assert_eq!(loaded.transaction.map(|x| x.id), Some(trx.id));

        let json = serde_json::to_value(&find_with_relations(&db, &TicketKey::Id(t.id), &TicketInclude::default()).await?)?;
        assert!(json.get("qr_code").is_some());
        assert!(json.get("transaction").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_many_is_all_or_nothing() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 10).await?;
        let trx = seed_transaction(&db, &org.id, &ev.id).await?;
        let good = || NewTicket { event_ticket_id: tier.id.clone(), transaction_id: trx.id.clone(), ..Default::default() };

        let payload = crud::create_many::<ticket::Entity, _>(&db, vec![good(), good(), good()], false).await?;
        assert_eq!(payload, BatchPayload { count: 3 });
        assert_eq!(crud::create_many::<ticket::Entity, _>(&db, vec![], false).await?.count, 0);

        let orphan = NewTicket { transaction_id: uid(), ..good() };
        let err = crud::create_many::<ticket::Entity, _>(&db, vec![good(), orphan], false).await.unwrap_err();
        assert!(matches!(err, ServiceError::ConstraintViolation { .. }));
        let mine = FindManyArgs::new().filter(ticket::Column::TransactionId.eq(trx.id.as_str()));
        assert_eq!(crud::count::<ticket::Entity, _>(&db, &mine).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn create_many_skip_duplicates() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 10).await?;
        let trx = seed_transaction(&db, &org.id, &ev.id).await?;
        let with_id = |id: &str| NewTicket {
            id: Some(id.to_string()),
            event_ticket_id: tier.id.clone(),
            transaction_id: trx.id.clone(),
            ..Default::default()
        };
        let existing = uid();
        crud::create::<ticket::Entity, _>(&db, with_id(&existing)).await?;
        let mine = FindManyArgs::new().filter(ticket::Column::TransactionId.eq(trx.id.as_str()));

        let batch = vec![with_id(&existing), with_id(&uid()), with_id(&uid())];
        let err = crud::create_many::<ticket::Entity, _>(&db, batch.clone(), false).await.unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(crud::count::<ticket::Entity, _>(&db, &mine).await?, 1);

        let payload = crud::create_many::<ticket::Entity, _>(&db, batch, true).await?;
        assert_eq!(payload.count, 2);
        assert_eq!(crud::count::<ticket::Entity, _>(&db, &mine).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn update_many_and_delete_many() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 10).await?;
        let trx = seed_transaction(&db, &org.id, &ev.id).await?;
        let other = seed_transaction(&db, &org.id, &ev.id).await?;
        for _ in 0..3 {
            crud::create::<ticket::Entity, _>(
                &db,
                NewTicket { event_ticket_id: tier.id.clone(), transaction_id: trx.id.clone(), ..Default::default() },
            )
            .await?;
        }

        let moved = crud::update_many::<ticket::Entity, _>(
            &db,
            Condition::all().add(ticket::Column::TransactionId.eq(trx.id.as_str())),
            &TicketUpdate { transaction_id: Some(other.id.clone()), ..Default::default() },
        )
        .await?;
        assert_eq!(moved.count, 3);

        let same_tier = || Condition::all().add(ticket::Column::EventTicketId.eq(tier.id.as_str()));
        let gone = crud::update_many::<ticket::Entity, _>(
            &db,
            same_tier(),
            &TicketUpdate { transaction_id: Some(uid()), ..Default::default() },
        )
        .await;
        assert!(gone.is_err());

        let removed = crud::delete_many::<ticket::Entity, _>(&db, Condition::all().add(ticket::Column::TransactionId.eq(other.id.as_str()))).await?;
        assert_eq!(removed.count, 3);
        assert_eq!(crud::delete_many::<ticket::Entity, _>(&db, same_tier()).await?.count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let org = seed_organizer(&db).await?;
        let ev = seed_event(&db, &org.id).await?;
        let tier = seed_ticket_tier(&db, &ev.id, 10).await?;
        let trx = seed_transaction(&db, &org.id, &ev.id).await?;
        let id = uid();
        let create = || NewTicket {
            id: Some(id.clone()),
            qr_code: Some("first".into()),
            event_ticket_id: tier.id.clone(),
            transaction_id: trx.id.clone(),
        };
        let update = TicketUpdate { qr_code: Some("second".into()), ..Default::default() };
        let key = TicketKey::Id(id.clone());

        let first = crud::upsert::<ticket::Entity, _>(&db, &key, create(), &update).await?;
        assert_eq!(first.qr_code, "first");
        let second = crud::upsert::<ticket::Entity, _>(&db, &key, create(), &update).await?;
        assert_eq!(second.qr_code, "second");
        assert_eq!(second.created_at, first.created_at);
        let by_id = FindManyArgs::new().filter(ticket::Column::Id.eq(id.as_str()));
        assert_eq!(crud::count::<ticket::Entity, _>(&db, &by_id).await?, 1);

        let deleted = crud::delete::<ticket::Entity, _>(&db, &key).await?;
        assert_eq!(deleted.id, id);
        assert!(matches!(crud::delete::<ticket::Entity, _>(&db, &key).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
