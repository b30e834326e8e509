use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{event, ticket};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub title: String,
    pub price: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Seat capacity of this tier.
    pub limit: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub event_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Event, Ticket }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Event => Entity::belongs_to(event::Entity)
                .from(Column::EventId)
                .to(event::Column::Id)
                .into(),
            Relation::Ticket => Entity::has_many(ticket::Entity).into(),
        }
    }
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ticket.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_pricing(price: i32, limit: i32) -> Result<(), ModelError> {
    errors::require_non_negative("price", price)?;
    errors::require_non_negative("limit", limit)
}
