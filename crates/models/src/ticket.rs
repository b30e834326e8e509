use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{event_ticket, transaction};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub qr_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub event_ticket_id: String,
    pub transaction_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { EventTicket, Transaction }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::EventTicket => Entity::belongs_to(event_ticket::Entity)
                .from(Column::EventTicketId)
                .to(event_ticket::Column::Id)
                .into(),
            Relation::Transaction => Entity::belongs_to(transaction::Entity)
                .from(Column::TransactionId)
                .to(transaction::Column::Id)
                .into(),
        }
    }
}

impl Related<event_ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::EventTicket.def() }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transaction.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// QR payloads are opaque; a fresh UUID keeps them unguessable.
pub fn generate_qr_code() -> String {
    uuid::Uuid::new_v4().to_string()
}
