use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveEnum, Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::errors::require_non_blank;
use models::{event, event_ticket, organizer, transaction, voucher, EventCategory, EventLocation};

use crate::crud;
use crate::errors::Result;
use crate::query::{ensure_live_parent, new_id, CreateInput, CrudEntity, FindManyArgs, UniqueKey, UpdateInput};
use crate::relations::{load_children, load_parent};

impl CrudEntity for event::Entity {
    const NAME: &'static str = "Event";
    type Active = event::ActiveModel;
    type Unique = EventKey;
    type Create = NewEvent;
    type Update = EventUpdate;

    fn updated_at() -> event::Column { event::Column::UpdatedAt }
    fn deleted_at() -> event::Column { event::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKey {
    Id(String),
    Slug(String),
    Title(String),
}

impl UniqueKey<event::Entity> for EventKey {
    fn condition(&self) -> Condition {
        let expr = match self {
            EventKey::Id(v) => event::Column::Id.eq(v.as_str()),
            EventKey::Slug(v) => event::Column::Slug.eq(v.as_str()),
            EventKey::Title(v) => event::Column::Title.eq(v.as_str()),
        };
        Condition::all().add(expr)
    }
}

/// Input for creating an event. The slug defaults to the slugified title.
#[derive(Clone, Debug)]
pub struct NewEvent {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub title: String,
    pub category: EventCategory,
    pub location: EventLocation,
    pub content: String,
    pub description: String,
    pub thumbnail: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub start_time: Time,
    pub end_time: Time,
    pub organizer_id: String,
}

impl NewEvent {
    fn effective_slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| event::slugify(&self.title))
    }
}

#[async_trait]
impl CreateInput<event::Entity> for NewEvent {
    fn validate(&self) -> Result<()> {
        require_non_blank("title", &self.title)?;
        event::validate_slug(&self.effective_slug())?;
        event::validate_schedule(self.start_date, self.end_date)?;
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        ensure_live_parent::<organizer::Entity, _>(db, &self.organizer_id).await
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> event::ActiveModel {
        let slug = self.effective_slug();
        event::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            slug: Set(slug),
            title: Set(self.title),
            category: Set(self.category),
            location: Set(self.location),
            content: Set(self.content),
            description: Set(self.description),
            thumbnail: Set(self.thumbnail),
            start_date: Set(self.start_date),
            end_date: Set(self.end_date),
            start_time: Set(self.start_time),
            end_time: Set(self.end_time),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            organizer_id: Set(self.organizer_id),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub category: Option<EventCategory>,
    pub location: Option<EventLocation>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub organizer_id: Option<String>,
}

#[async_trait]
impl UpdateInput<event::Entity> for EventUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        if let Some(slug) = &self.slug {
            event::validate_slug(slug)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            event::validate_schedule(start, end)?;
        }
        Ok(())
    }

    async fn check_parents<C: ConnectionTrait>(&self, db: &C) -> Result<()> {
        match &self.organizer_id {
            Some(id) => ensure_live_parent::<organizer::Entity, _>(db, id).await,
            None => Ok(()),
        }
    }

    fn changes(&self) -> Vec<(event::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = &self.slug { out.push((event::Column::Slug, Expr::value(v.clone()))); }
        if let Some(v) = &self.title { out.push((event::Column::Title, Expr::value(v.clone()))); }
        if let Some(v) = &self.category { out.push((event::Column::Category, Expr::value(v.into_value()))); }
        if let Some(v) = &self.location { out.push((event::Column::Location, Expr::value(v.into_value()))); }
        if let Some(v) = &self.content { out.push((event::Column::Content, Expr::value(v.clone()))); }
        if let Some(v) = &self.description { out.push((event::Column::Description, Expr::value(v.clone()))); }
        if let Some(v) = &self.thumbnail { out.push((event::Column::Thumbnail, Expr::value(v.clone()))); }
        if let Some(v) = self.start_date { out.push((event::Column::StartDate, Expr::value(v))); }
        if let Some(v) = self.end_date { out.push((event::Column::EndDate, Expr::value(v))); }
        if let Some(v) = self.start_time { out.push((event::Column::StartTime, Expr::value(v))); }
        if let Some(v) = self.end_time { out.push((event::Column::EndTime, Expr::value(v))); }
        if let Some(v) = &self.organizer_id { out.push((event::Column::OrganizerId, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventInclude {
    pub organizer: bool,
    pub event_tickets: Option<FindManyArgs<event_ticket::Entity>>,
    pub vouchers: Option<FindManyArgs<voucher::Entity>>,
    pub transactions: Option<FindManyArgs<transaction::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EventWithRelations {
    #[serde(flatten)]
    pub event: event::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<organizer::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_tickets: Option<Vec<event_ticket::Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vouchers: Option<Vec<voucher::Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<transaction::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(db: &C, event: event::Model, include: &EventInclude) -> Result<EventWithRelations> {
    let organizer = if include.organizer {
        load_parent::<event::Entity, organizer::Entity, _>(db, &event).await?
    } else {
        None
    };
    let event_tickets = match &include.event_tickets {
        Some(args) => Some(load_children::<event::Entity, _, _>(db, &event, args).await?),
        None => None,
    };
    let vouchers = match &include.vouchers {
        Some(args) => Some(load_children::<event::Entity, _, _>(db, &event, args).await?),
        None => None,
    };
    let transactions = match &include.transactions {
        Some(args) => Some(load_children::<event::Entity, _, _>(db, &event, args).await?),
        None => None,
    };
    Ok(EventWithRelations { event, organizer, event_tickets, vouchers, transactions })
}

pub async fn find_with_relations<C: ConnectionTrait>(db: &C, key: &EventKey, include: &EventInclude) -> Result<Option<EventWithRelations>> {
    match crud::find_unique::<event::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}
