use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ServiceCategory::Enum)
                    .values([
                        ServiceCategory::WeddingVenues,
                        ServiceCategory::Photographers,
                        ServiceCategory::BridalMakeup,
                        ServiceCategory::HennaArtists,
                        ServiceCategory::BridalWear,
                        ServiceCategory::CarRental,
                    ])
                    .to_owned(),
            )
            .await?;

        // Shared by services and card templates
        manager
            .create_type(
                Type::create()
                    .as_enum(ResourceStatus::Enum)
                    .values([
                        ResourceStatus::Pending,
                        ResourceStatus::Published,
                        ResourceStatus::Rejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(BookingType::Enum)
                    .values([BookingType::QuantityBased, BookingType::EventBased])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::VendorId).not_null())
                    .col(
                        ColumnDef::new(Service::Category)
                            .custom(ServiceCategory::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Service::Status)
                            .custom(ResourceStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len(Service::Name, 200).not_null())
                    .col(string_len(Service::City, 100).not_null())
                    .col(text(Service::Description).not_null())
                    .col(text_null(Service::AdditionalInfo))
                    .col(
                        ColumnDef::new(Service::BookingType)
                            .custom(BookingType::Enum)
                            .not_null(),
                    )
                    .col(integer(Service::QuantityAvailable).not_null().default(0))
                    .col(double_null(Service::DiscountPercent))
                    .col(timestamp_with_time_zone_null(Service::DiscountExpiry))
                    .col(double(Service::AvgRating).not_null().default(0.0))
                    .col(integer(Service::ReviewCount).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(Service::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_vendor")
                            .from(Service::Table, Service::VendorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PricingPackage::Table)
                    .if_not_exists()
                    .col(uuid(PricingPackage::Id).primary_key())
                    .col(uuid(PricingPackage::ServiceId).not_null())
                    .col(string_len(PricingPackage::Name, 200).not_null())
                    .col(double(PricingPackage::Price).not_null())
                    .col(text_null(PricingPackage::Inclusions))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pricing_package_service")
                            .from(PricingPackage::Table, PricingPackage::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceSlot::Table)
                    .if_not_exists()
                    .col(uuid(ServiceSlot::Id).primary_key())
                    .col(uuid(ServiceSlot::ServiceId).not_null())
                    .col(date(ServiceSlot::SlotDate).not_null())
                    .col(boolean(ServiceSlot::IsBooked).not_null().default(false))
                    .col(uuid_null(ServiceSlot::ReservedBy))
                    .col(timestamp_with_time_zone_null(ServiceSlot::ReservationExpiry))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_slot_service")
                            .from(ServiceSlot::Table, ServiceSlot::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One slot per service per calendar date
        manager
            .create_index(
                Index::create()
                    .name("idx_service_slot_service_date")
                    .table(ServiceSlot::Table)
                    .col(ServiceSlot::ServiceId)
                    .col(ServiceSlot::SlotDate)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceSlot::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PricingPackage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Service::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingType::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ResourceStatus::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(ServiceCategory::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Service {
    Table,
    Id,
    VendorId,
    Category,
    Status,
    Name,
    City,
    Description,
    AdditionalInfo,
    BookingType,
    QuantityAvailable,
    DiscountPercent,
    DiscountExpiry,
    AvgRating,
    ReviewCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PricingPackage {
    Table,
    Id,
    ServiceId,
    Name,
    Price,
    Inclusions,
}

#[derive(DeriveIden)]
pub enum ServiceSlot {
    Table,
    Id,
    ServiceId,
    SlotDate,
    IsBooked,
    ReservedBy,
    ReservationExpiry,
}

#[derive(DeriveIden)]
pub enum ServiceCategory {
    #[sea_orm(iden = "service_category")]
    Enum,
    #[sea_orm(iden = "wedding_venues")]
    WeddingVenues,
    #[sea_orm(iden = "photographers")]
    Photographers,
    #[sea_orm(iden = "bridal_makeup")]
    BridalMakeup,
    #[sea_orm(iden = "henna_artists")]
    HennaArtists,
    #[sea_orm(iden = "bridal_wear")]
    BridalWear,
    #[sea_orm(iden = "car_rental")]
    CarRental,
}

#[derive(DeriveIden)]
pub enum ResourceStatus {
    #[sea_orm(iden = "resource_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "published")]
    Published,
    #[sea_orm(iden = "rejected")]
    Rejected,
}

#[derive(DeriveIden)]
pub enum BookingType {
    #[sea_orm(iden = "booking_type")]
    Enum,
    #[sea_orm(iden = "quantity_based")]
    QuantityBased,
    #[sea_orm(iden = "event_based")]
    EventBased,
}
