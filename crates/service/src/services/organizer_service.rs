use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveEnum, Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::errors::{require_non_blank, validate_email};
use models::{event, organizer, transaction, UserRole};

use crate::credentials;
use crate::crud;
use crate::errors::Result;
use crate::query::{new_id, CreateInput, CrudEntity, FindManyArgs, UniqueKey, UpdateInput};
use crate::relations::load_children;

impl CrudEntity for organizer::Entity {
    const NAME: &'static str = "Organizer";
    type Active = organizer::ActiveModel;
    type Unique = OrganizerKey;
    type Create = NewOrganizer;
    type Update = OrganizerUpdate;

    fn updated_at() -> organizer::Column { organizer::Column::UpdatedAt }
    fn deleted_at() -> organizer::Column { organizer::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrganizerKey {
    Id(String),
    Username(String),
    Email(String),
}

impl UniqueKey<organizer::Entity> for OrganizerKey {
    fn condition(&self) -> Condition {
        let expr = match self {
            OrganizerKey::Id(v) => organizer::Column::Id.eq(v.as_str()),
            OrganizerKey::Username(v) => organizer::Column::Username.eq(v.as_str()),
            OrganizerKey::Email(v) => organizer::Column::Email.eq(v.as_str()),
        };
        Condition::all().add(expr)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewOrganizer {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub profile_picture: Option<String>,
}

impl NewOrganizer {
    pub fn with_password(username: impl Into<String>, email: impl Into<String>, plain: &str) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password: credentials::hash_password(plain)?,
            ..Default::default()
        })
    }
}

impl CreateInput<organizer::Entity> for NewOrganizer {
    fn validate(&self) -> Result<()> {
        organizer::validate_username(&self.username)?;
        validate_email(&self.email)?;
        require_non_blank("password", &self.password)?;
        Ok(())
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> organizer::ActiveModel {
        organizer::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            username: Set(self.username),
            email: Set(self.email),
            password: Set(self.password),
            role: Set(self.role.unwrap_or(UserRole::Organizer)),
            profile_picture: Set(self.profile_picture.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrganizerUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub profile_picture: Option<String>,
}

impl UpdateInput<organizer::Entity> for OrganizerUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.username {
            organizer::validate_username(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    fn changes(&self) -> Vec<(organizer::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = &self.username { out.push((organizer::Column::Username, Expr::value(v.clone()))); }
        if let Some(v) = &self.email { out.push((organizer::Column::Email, Expr::value(v.clone()))); }
        if let Some(v) = &self.password { out.push((organizer::Column::Password, Expr::value(v.clone()))); }
        if let Some(v) = &self.role { out.push((organizer::Column::Role, Expr::value(v.into_value()))); }
        if let Some(v) = &self.profile_picture { out.push((organizer::Column::ProfilePicture, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrganizerInclude {
    pub events: Option<FindManyArgs<event::Entity>>,
    pub transactions: Option<FindManyArgs<transaction::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrganizerWithRelations {
    #[serde(flatten)]
    pub organizer: organizer::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<event::Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<transaction::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(
    db: &C,
    organizer: organizer::Model,
    include: &OrganizerInclude,
) -> Result<OrganizerWithRelations> {
    let events = match &include.events {
        Some(args) => Some(load_children::<organizer::Entity, _, _>(db, &organizer, args).await?),
        None => None,
    };
    let transactions = match &include.transactions {
        Some(args) => Some(load_children::<organizer::Entity, _, _>(db, &organizer, args).await?),
        None => None,
    };
    Ok(OrganizerWithRelations { organizer, events, transactions })
}

pub async fn find_with_relations<C: ConnectionTrait>(
    db: &C,
    key: &OrganizerKey,
    include: &OrganizerInclude,
) -> Result<Option<OrganizerWithRelations>> {
    match crud::find_unique::<organizer::Entity, _>(db, key).await? {
        Some(found) => Ok(Some(load_relations(db, found, include).await?)),
        None => Ok(None),
    }
}
