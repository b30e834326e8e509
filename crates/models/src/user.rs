use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use rand::{distributions::Alphanumeric, Rng};

use crate::enums::UserRole;
use crate::errors::{self, ModelError};
use crate::transaction;

pub const REF_CODE_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub point: i32,
    #[sea_orm(unique)]
    pub ref_code: String,
    pub profile_picture: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Transaction,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Transaction => Entity::has_many(transaction::Entity).into() }
    }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transaction.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    errors::require_non_blank("username", username)
}

/// Referral codes are upper-case alphanumerics.
pub fn validate_ref_code(code: &str) -> Result<(), ModelError> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(errors::invalid("ref_code must be upper-case alphanumeric"));
    }
    Ok(())
}

pub fn generate_ref_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REF_CODE_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}
