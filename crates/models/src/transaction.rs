use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::TransactionStatus;
use crate::errors::{self, ModelError};
use crate::{event, organizer, ticket, user, voucher};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub point_used: Option<i32>,
    pub total_price: i32,
    pub payment_proof: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub user_id: String,
    pub event_id: String,
    pub organizer_id: String,
    pub voucher_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, Event, Organizer, Voucher, Ticket }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Event => Entity::belongs_to(event::Entity)
                .from(Column::EventId)
                .to(event::Column::Id)
                .into(),
            Relation::Organizer => Entity::belongs_to(organizer::Entity)
                .from(Column::OrganizerId)
                .to(organizer::Column::Id)
                .into(),
            Relation::Voucher => Entity::belongs_to(voucher::Entity)
                .from(Column::VoucherCode)
                .to(voucher::Column::Code)
                .into(),
            Relation::Ticket => Entity::has_many(ticket::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<organizer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Organizer.def() }
}

impl Related<voucher::Entity> for Entity {
    fn to() -> RelationDef { Relation::Voucher.def() }
}

impl Related<ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ticket.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_amounts(total_price: i32, point_used: Option<i32>) -> Result<(), ModelError> {
    errors::require_non_negative("total_price", total_price)?;
    if let Some(points) = point_used {
        errors::require_non_negative("point_used", points)?;
    }
    Ok(())
}
