use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{self, ModelError};
use crate::{event, transaction};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub discount: i32,
    pub quota: i32,
    pub expired_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub event_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Event, Transaction }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Event => Entity::belongs_to(event::Entity)
                .from(Column::EventId)
                .to(event::Column::Id)
                .into(),
            Relation::Transaction => Entity::has_many(transaction::Entity).into(),
        }
    }
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transaction.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Usable when quota remains and the expiry lies in the future.
    pub fn is_redeemable(&self, at: DateTimeWithTimeZone) -> bool {
        self.deleted_at.is_none() && self.quota > 0 && at < self.expired_date
    }
}

/// Voucher codes are shown to buyers; keep them upper-case without spaces.
pub fn validate_code(code: &str) -> Result<(), ModelError> {
    if code.is_empty() || code.len() > 64 || !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-') {
        return Err(errors::invalid("voucher code must be 1-64 chars of [A-Z0-9_-]"));
    }
    Ok(())
}

pub fn validate_terms(discount: i32, quota: i32) -> Result<(), ModelError> {
    errors::require_non_negative("discount", discount)?;
    errors::require_non_negative("quota", quota)
}
