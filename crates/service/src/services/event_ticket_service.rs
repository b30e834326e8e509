use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::errors::require_non_blank;
use models::{event, event_ticket, ticket};

use crate::crud;
use crate::errors::Result;
use crate::query::{ensure_live_parent, new_id, CreateInput, CrudEntity, FindManyArgs, NumericUpdate, UniqueKey, UpdateInput};
use crate::relations::{load_children, load_parent};

impl CrudEntity for event_ticket::Entity {
    const NAME: &'static str = "EventTicket";
    type Active = event_ticket::ActiveModel;
    type Unique = EventTicketKey;
    type Create = NewEventTicket;
    type Update = EventTicketUpdate;

    fn updated_at() -> event_ticket::Column { event_ticket::Column::UpdatedAt }
    fn deleted_at() -> event_ticket::Column { event_ticket::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTicketKey {
    Id(String),
    Title(String),
}

impl UniqueKey<event_ticket::Entity> for EventTicketKey {
    fn condition(&self) -> Condition {
        let expr = match self {
            EventTicketKey::Id(v) => event_ticket::Column::Id.eq(v.as_str()),
            EventTicketKey::Title(v) => event_ticket::Column::Title.eq(v.as_str()),
        };
        Condition::all().add(expr)
    }
}

/// A ticket tier of an event: price and how many may be sold.
#[derive(Clone, Debug)]
pub struct NewEventTicket {
    pub id: Option<String>,
    pub title: String,
    pub price: i32,
    pub description: String,
    pub limit: i32,
    pub event_id: String,
}

#[async_trait]
impl CreateInput<event_ticket::Entity> for NewEventTicket {
    fn validate(&self) -> Result<()> {
        require_non_blank("title", &self.title)?;
        event_ticket::validate_pricing(self.price, self.limit)?;
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        ensure_live_parent::<event::Entity, _>(db, &self.event_id).await
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> event_ticket::ActiveModel {
        event_ticket::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            title: Set(self.title),
            price: Set(self.price),
            description: Set(self.description),
            limit: Set(self.limit),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            event_id: Set(self.event_id),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventTicketUpdate {
    pub title: Option<String>,
    pub price: Option<NumericUpdate>,
    pub description: Option<String>,
    pub limit: Option<NumericUpdate>,
    pub event_id: Option<String>,
}

#[async_trait]
impl UpdateInput<event_ticket::Entity> for EventTicketUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        if let Some(price) = self.price {
            price.validate("price")?;
        }
        if let Some(limit) = self.limit {
            limit.validate("limit")?;
        }
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        match &self.event_id {
            Some(id) => ensure_live_parent::<event::Entity, _>(db, id).await,
            None => Ok(()),
        }
    }

    fn changes(&self) -> Vec<(event_ticket::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = &self.title { out.push((event_ticket::Column::Title, Expr::value(v.clone()))); }
        if let Some(v) = self.price { out.push((event_ticket::Column::Price, v.expr(event_ticket::Column::Price))); }
        if let Some(v) = &self.description { out.push((event_ticket::Column::Description, Expr::value(v.clone()))); }
        if let Some(v) = self.limit { out.push((event_ticket::Column::Limit, v.expr(event_ticket::Column::Limit))); }
        if let Some(v) = &self.event_id { out.push((event_ticket::Column::EventId, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventTicketInclude {
    pub event: bool,
    pub tickets: Option<FindManyArgs<ticket::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EventTicketWithRelations {
    #[serde(flatten)]
    pub event_ticket: event_ticket::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<event::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<ticket::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(
    db: &C,
    event_ticket: event_ticket::Model,
    include: &EventTicketInclude,
) -> Result<EventTicketWithRelations> {
    let event = if include.event {
        load_parent::<event_ticket::Entity, event::Entity, _>(db, &event_ticket).await?
    } else {
        None
    };
    let tickets = match &include.tickets {
        Some(args) => Some(load_children::<event_ticket::Entity, _, _>(db, &event_ticket, args).await?),
        None => None,
    };
    Ok(EventTicketWithRelations { event_ticket, event, tickets })
}

pub async fn find_with_relations<C: ConnectionTrait>(
    db: &C,
    key: &EventTicketKey,
    include: &EventTicketInclude,
) -> Result<Option<EventTicketWithRelations>> {
    match crud::find_unique::<event_ticket::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}

/// Tiers of an event that still have seats left to sell.
pub async fn available_for_event<C: ConnectionTrait>(db: &C, event_id: &str) -> Result<Vec<event_ticket::Model>> {
    let args = FindManyArgs::<event_ticket::Entity>::new()
        .filter(event_ticket::Column::EventId.eq(event_id))
        .filter(event_ticket::Column::Limit.gt(0))
        .live_only()
        .order_by(event_ticket::Column::Price, sea_orm::Order::Asc);
    crud::find_many(db, &args).await
}
