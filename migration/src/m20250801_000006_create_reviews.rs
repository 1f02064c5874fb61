use sea_orm_migration::{prelude::*, schema::*};

use super::m20250801_000001_create_users::User;
use super::m20250801_000002_create_services::Service;
use super::m20250801_000003_create_card_templates::CardTemplate;
use super::m20250801_000004_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(uuid(Review::UserId).not_null())
                    .col(uuid(Review::BookingId).not_null())
                    .col(uuid_null(Review::ServiceId))
                    .col(uuid_null(Review::CardTemplateId))
                    .col(integer(Review::Stars).not_null())
                    .col(text_null(Review::Comment))
                    .col(boolean(Review::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user")
                            .from(Review::Table, Review::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_booking")
                            .from(Review::Table, Review::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_service")
                            .from(Review::Table, Review::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_card_template")
                            .from(Review::Table, Review::CardTemplateId)
                            .to(CardTemplate::Table, CardTemplate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One review per booking
        manager
            .create_index(
                Index::create()
                    .name("idx_review_booking")
                    .table(Review::Table)
                    .col(Review::BookingId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Review {
    Table,
    Id,
    UserId,
    BookingId,
    ServiceId,
    CardTemplateId,
    Stars,
    Comment,
    IsActive,
    CreatedAt,
}
