use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;
use super::m20250801_000002_create_services::{PricingPackage, Service};
use super::m20250801_000003_create_card_templates::CardTemplate;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::Completed,
                        BookingStatus::Canceled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::UserId).not_null())
                    .col(uuid(Booking::VendorId).not_null())
                    .col(uuid_null(Booking::ServiceId))
                    .col(uuid_null(Booking::PackageId))
                    .col(uuid_null(Booking::CardTemplateId))
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(Booking::ScheduledAt).not_null())
                    .col(timestamp_with_time_zone_null(Booking::EventDate))
                    .col(timestamp_with_time_zone_null(Booking::CompletedAt))
                    .col(double(Booking::Price).not_null())
                    .col(integer(Booking::Quantity).not_null().default(1))
                    .col(boolean(Booking::ReviewAllowed).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_vendor")
                            .from(Booking::Table, Booking::VendorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_package")
                            .from(Booking::Table, Booking::PackageId)
                            .to(PricingPackage::Table, PricingPackage::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_card_template")
                            .from(Booking::Table, Booking::CardTemplateId)
                            .to(CardTemplate::Table, CardTemplate::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The sweep and the duplicate check both filter on these
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_status_event_date")
                    .table(Booking::Table)
                    .col(Booking::Status)
                    .col(Booking::EventDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    UserId,
    VendorId,
    ServiceId,
    PackageId,
    CardTemplateId,
    Status,
    ScheduledAt,
    EventDate,
    CompletedAt,
    Price,
    Quantity,
    ReviewAllowed,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "canceled")]
    Canceled,
}
