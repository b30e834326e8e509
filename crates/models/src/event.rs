use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::{EventCategory, EventLocation};
use crate::errors::{self, ModelError};
use crate::{event_ticket, organizer, transaction, voucher};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(unique)]
    pub title: String,
    pub category: EventCategory,
    pub location: EventLocation,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub thumbnail: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub start_time: Time,
    pub end_time: Time,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub organizer_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Organizer, Voucher, Transaction, EventTicket }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organizer => Entity::belongs_to(organizer::Entity)
                .from(Column::OrganizerId)
                .to(organizer::Column::Id)
                .into(),
            Relation::Voucher => Entity::has_many(voucher::Entity).into(),
            Relation::Transaction => Entity::has_many(transaction::Entity).into(),
            Relation::EventTicket => Entity::has_many(event_ticket::Entity).into(),
        }
    }
}

impl Related<organizer::Entity> for Entity {
    fn to() -> RelationDef { Relation::Organizer.def() }
}

impl Related<voucher::Entity> for Entity {
    fn to() -> RelationDef { Relation::Voucher.def() }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef { Relation::Transaction.def() }
}

impl Related<event_ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::EventTicket.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lower-case the title and collapse every non-alphanumeric run into one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') { slug.pop(); }
    slug
}

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    let ok = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok { return Err(errors::invalid("slug must be lower-case [a-z0-9-]")); }
    Ok(())
}

pub fn validate_schedule(
    start_date: DateTimeWithTimeZone,
    end_date: DateTimeWithTimeZone,
) -> Result<(), ModelError> {
    if end_date < start_date {
        return Err(errors::invalid("end_date must not precede start_date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Jakarta Jazz Night 2024!"), "jakarta-jazz-night-2024");
        assert_eq!(slugify("  --Idol  Fest--  "), "idol-fest");
        assert!(validate_slug(&slugify("A & B")).is_ok());
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("ok-slug-1").is_ok());
        assert!(validate_slug("Bad Slug").is_err());
        assert!(validate_slug("-lead").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn schedule_order() {
        let start: DateTimeWithTimeZone = Utc::now().into();
        assert!(validate_schedule(start, start + Duration::hours(2)).is_ok());
        assert!(validate_schedule(start, start).is_ok());
        assert!(validate_schedule(start, start - Duration::hours(1)).is_err());
    }
}
