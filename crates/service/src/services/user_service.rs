use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveEnum, Condition, ConnectionTrait, Set};
use serde::Serialize;

use models::errors::{require_non_blank, require_non_negative, validate_email};
use models::{transaction, user, UserRole};

use crate::credentials;
use crate::crud;
use crate::errors::Result;
use crate::query::{new_id, CreateInput, CrudEntity, FindManyArgs, NumericUpdate, UniqueKey, UpdateInput};
use crate::relations::load_children;

impl CrudEntity for user::Entity {
    const NAME: &'static str = "User";
    type Active = user::ActiveModel;
    type Unique = UserKey;
    type Create = NewUser;
    type Update = UserUpdate;

    fn updated_at() -> user::Column { user::Column::UpdatedAt }
    fn deleted_at() -> user::Column { user::Column::DeletedAt }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserKey {
    Id(String),
    Email(String),
    RefCode(String),
}

impl UniqueKey<user::Entity> for UserKey {
    fn condition(&self) -> Condition {
        let expr = match self {
            UserKey::Id(v) => user::Column::Id.eq(v.as_str()),
            UserKey::Email(v) => user::Column::Email.eq(v.as_str()),
            UserKey::RefCode(v) => user::Column::RefCode.eq(v.as_str()),
        };
        Condition::all().add(expr)
    }
}

/// Input for creating a user. `password` is stored as given; use
/// [`NewUser::with_password`] to hash a plain-text password.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub point: Option<i32>,
    pub ref_code: Option<String>,
    pub profile_picture: Option<String>,
}

impl NewUser {
    pub fn with_password(username: impl Into<String>, email: impl Into<String>, plain: &str) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password: credentials::hash_password(plain)?,
            ..Default::default()
        })
    }
}

impl CreateInput<user::Entity> for NewUser {
    fn validate(&self) -> Result<()> {
        user::validate_username(&self.username)?;
        validate_email(&self.email)?;
        require_non_blank("password", &self.password)?;
        if let Some(point) = self.point {
            require_non_negative("point", point)?;
        }
        if let Some(code) = &self.ref_code {
            user::validate_ref_code(code)?;
        }
        Ok(())
    }

    fn into_active_model(self, now: DateTimeWithTimeZone) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(self.id.unwrap_or_else(new_id)),
            username: Set(self.username),
            email: Set(self.email),
            password: Set(self.password),
            role: Set(self.role.unwrap_or_default()),
            point: Set(self.point.unwrap_or(0)),
            ref_code: Set(self.ref_code.unwrap_or_else(user::generate_ref_code)),
            profile_picture: Set(self.profile_picture.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub point: Option<NumericUpdate>,
    pub ref_code: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateInput<user::Entity> for UserUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.username {
            user::validate_username(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(point) = self.point {
            point.validate("point")?;
        }
        if let Some(code) = &self.ref_code {
            user::validate_ref_code(code)?;
        }
        Ok(())
    }

    fn changes(&self) -> Vec<(user::Column, SimpleExpr)> {
        let mut out = Vec::new();
        if let Some(v) = &self.username { out.push((user::Column::Username, Expr::value(v.clone()))); }
        if let Some(v) = &self.email { out.push((user::Column::Email, Expr::value(v.clone()))); }
        if let Some(v) = &self.password { out.push((user::Column::Password, Expr::value(v.clone()))); }
        if let Some(v) = &self.role { out.push((user::Column::Role, Expr::value(v.into_value()))); }
        if let Some(v) = self.point { out.push((user::Column::Point, v.expr(user::Column::Point))); }
        if let Some(v) = &self.ref_code { out.push((user::Column::RefCode, Expr::value(v.clone()))); }
        if let Some(v) = &self.profile_picture { out.push((user::Column::ProfilePicture, Expr::value(v.clone()))); }
        out
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserInclude {
    pub transactions: Option<FindManyArgs<transaction::Entity>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserWithRelations {
    #[serde(flatten)]
    pub user: user::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<transaction::Model>>,
}

pub async fn load_relations<C: ConnectionTrait>(db: &C, user: user::Model, include: &UserInclude) -> Result<UserWithRelations> {
    let transactions = match &include.transactions {
        Some(args) => Some(load_children::<user::Entity, _, _>(db, &user, args).await?),
        None => None,
    };
    Ok(UserWithRelations { user, transactions })
}

pub async fn find_with_relations<C: ConnectionTrait>(db: &C, key: &UserKey, include: &UserInclude) -> Result<Option<UserWithRelations>> {
    match crud::find_unique::<user::Entity, _>(db, key).await? {
        Some(user) => Ok(Some(load_relations(db, user, include).await?)),
        None => Ok(None),
    }
}

/// Check a plain-text password against the stored hash of a live user.
pub async fn verify_login<C: ConnectionTrait>(db: &C, email: &str, plain: &str) -> Result<Option<user::Model>> {
    let Some(found) = crud::find_unique::<user::Entity, _>(db, &UserKey::Email(email.to_string())).await? else {
        return Ok(None);
    };
    if found.deleted_at.is_some() || !credentials::verify_password(plain, &found.password)? {
        return Ok(None);
    }
    Ok(Some(found))
}
