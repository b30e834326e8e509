use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;
use crate::errors::{self, ModelError};
use crate::{event, transaction};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub profile_picture: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Event, Transaction }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Event => Entity::has_many(event::Entity).into(),
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

/// Organizer handles double as public profile slugs, so no whitespace.
pub fn validate_username(username: &str) -> Result<(), ModelError> {
    errors::require_non_blank("username", username)?;
    if username.chars().any(char::is_whitespace) {
        return Err(errors::invalid("organizer username must not contain whitespace"));
    }
    Ok(())
}
