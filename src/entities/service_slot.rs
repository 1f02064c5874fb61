use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A bookable calendar date for an event-based service. A slot is either
/// free or bound to exactly one reservation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_slot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub slot_date: Date,
    pub is_booked: bool,
    pub reserved_by: Option<Uuid>,
    /// Carried from the data model but not enforced by any sweep.
    pub reservation_expiry: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
