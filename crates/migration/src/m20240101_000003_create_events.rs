//! Create `events` table with FK to `organizers`.
use sea_orm_migration::{prelude::*, schema::*};

use crate::enum_values::{EVENT_CATEGORY, EVENT_LOCATION};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(string_len(Events::Id, 36).primary_key())
                    .col(string_len(Events::Slug, 255).unique_key().not_null())
                    .col(string_len(Events::Title, 255).unique_key().not_null())
                    .col(
                        string_len(Events::Category, 16)
                            .not_null()
                            .check(Expr::col(Events::Category).is_in(EVENT_CATEGORY.iter().copied())),
                    )
                    .col(
                        string_len(Events::Location, 16)
                            .not_null()
                            .check(Expr::col(Events::Location).is_in(EVENT_LOCATION.iter().copied())),
                    )
                    .col(text(Events::Content).not_null())
                    .col(text(Events::Description).not_null())
                    .col(string_len(Events::Thumbnail, 512).not_null())
                    .col(timestamp_with_time_zone(Events::StartDate).not_null())
                    .col(timestamp_with_time_zone(Events::EndDate).not_null())
                    .col(ColumnDef::new(Events::StartTime).time().not_null())
                    .col(ColumnDef::new(Events::EndTime).time().not_null())
                    .col(timestamp_with_time_zone(Events::CreatedAt).not_null().default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Events::UpdatedAt).not_null().default(Expr::current_timestamp()))
                    .col(
                        ColumnDef::new(Events::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(Events::OrganizerId, 36).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Events::Table, Events::OrganizerId)
                            .to(Organizers::Table, Organizers::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Events::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Slug,
    Title,
    Category,
    Location,
    Content,
    Description,
    Thumbnail,
    StartDate,
    EndDate,
    StartTime,
    EndTime,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    OrganizerId,
}

#[derive(DeriveIden)]
enum Organizers { Table, Id }
