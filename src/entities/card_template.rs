use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::service::ResourceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "card_type")]
pub enum CardType {
    #[sea_orm(string_value = "simple")]
    Simple,
    #[sea_orm(string_value = "editable")]
    Editable,
    #[sea_orm(string_value = "static")]
    Static,
    #[sea_orm(string_value = "non_editable")]
    NonEditable,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "card_template")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub status: ResourceStatus,
    pub name: String,
    pub card_type: CardType,
    pub price_per_card: f64,
    /// Remaining stock; never negative. Mutated only through the ledger.
    pub quantity_available: i32,
    pub city: String,
    pub description: Option<String>,
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
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
