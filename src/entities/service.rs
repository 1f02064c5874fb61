use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "service_category")]
pub enum ServiceCategory {
    #[sea_orm(string_value = "wedding_venues")]
    WeddingVenues,
    #[sea_orm(string_value = "photographers")]
    Photographers,
    #[sea_orm(string_value = "bridal_makeup")]
    BridalMakeup,
    #[sea_orm(string_value = "henna_artists")]
    HennaArtists,
    #[sea_orm(string_value = "bridal_wear")]
    BridalWear,
    #[sea_orm(string_value = "car_rental")]
    CarRental,
}

impl ServiceCategory {
    /// Venue bookings are priced per unit; every other category prices as one.
    pub fn is_venue(&self) -> bool {
        matches!(self, ServiceCategory::WeddingVenues)
    }

    /// Rental categories book a date range instead of a single instant.
    pub fn is_rental(&self) -> bool {
        matches!(self, ServiceCategory::BridalWear | ServiceCategory::CarRental)
    }
}

/// Moderation status, shared with card templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "resource_status")]
pub enum ResourceStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_type")]
pub enum BookingType {
    #[sea_orm(string_value = "quantity_based")]
    QuantityBased,
    #[sea_orm(string_value = "event_based")]
    EventBased,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category: ServiceCategory,
    pub status: ResourceStatus,
    pub name: String,
    pub city: String,
    pub description: String,
    pub additional_info: Option<String>,
    pub booking_type: BookingType,
    /// Remaining stock for quantity-based services; unused for event-based.
    pub quantity_available: i32,
    pub discount_percent: Option<f64>,
    pub discount_expiry: Option<DateTimeWithTimeZone>,
    pub avg_rating: f64,
    pub review_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::pricing_package::Entity")]
    PricingPackages,
    #[sea_orm(has_many = "super::service_slot::Entity")]
    Slots,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::pricing_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PricingPackages.def()
    }
}

impl Related<super::service_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slots.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
