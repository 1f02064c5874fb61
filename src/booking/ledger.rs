//! The only code path allowed to mutate resource availability (card stock,
//! service stock, date slots). Reservation uses conditional updates so the
//! check and the decrement land in one statement; callers wrap the ledger
//! call and the booking insert in one transaction.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::service::{BookingType, ResourceStatus};
use crate::entities::{booking, card_template, service, service_slot};
use crate::error::{AppError, AppResult};

/// Atomically decrement card stock, requiring the card to be published and
/// the stock to cover the request. Returns the card as it was after the
/// decrement.
pub async fn reserve_card_quantity<C: ConnectionTrait>(
    conn: &C,
    card_id: Uuid,
    quantity: i32,
) -> AppResult<card_template::Model> {
    let result = card_template::Entity::update_many()
        .col_expr(
            card_template::Column::QuantityAvailable,
            Expr::col(card_template::Column::QuantityAvailable).sub(quantity),
        )
        .filter(card_template::Column::Id.eq(card_id))
        .filter(card_template::Column::Status.eq(ResourceStatus::Published))
        .filter(card_template::Column::QuantityAvailable.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let card = card_template::Entity::find_by_id(card_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;
        if card.status != ResourceStatus::Published {
            return Err(AppError::Conflict(
                "Card template is not published".to_string(),
            ));
        }
        return Err(AppError::Conflict(format!(
            "Requested quantity {} exceeds available {}",
            quantity, card.quantity_available
        )));
    }

    card_template::Entity::find_by_id(card_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal("Card template vanished after reserve".to_string()))
}

/// Same shape as `reserve_card_quantity`, for quantity-based services.
pub async fn reserve_service_quantity<C: ConnectionTrait>(
    conn: &C,
    service_id: Uuid,
    quantity: i32,
) -> AppResult<service::Model> {
    let result = service::Entity::update_many()
        .col_expr(
            service::Column::QuantityAvailable,
            Expr::col(service::Column::QuantityAvailable).sub(quantity),
        )
        .filter(service::Column::Id.eq(service_id))
        .filter(service::Column::Status.eq(ResourceStatus::Published))
        .filter(service::Column::QuantityAvailable.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let svc = service::Entity::find_by_id(service_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        if svc.status != ResourceStatus::Published {
            return Err(AppError::Conflict("Service is not published".to_string()));
        }
        return Err(AppError::Conflict(format!(
            "Requested quantity {} exceeds available {}",
            quantity, svc.quantity_available
        )));
    }

    service::Entity::find_by_id(service_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal("Service vanished after reserve".to_string()))
}

/// Claim the slot for the given calendar date. Slots match by day, never by
/// time-of-day. A losing concurrent request fails fast instead of queueing.
pub async fn reserve_slot<C: ConnectionTrait>(
    conn: &C,
    service_id: Uuid,
    date: NaiveDate,
    reserved_by: Uuid,
) -> AppResult<()> {
    let result = service_slot::Entity::update_many()
        .col_expr(service_slot::Column::IsBooked, Expr::value(true))
        .col_expr(service_slot::Column::ReservedBy, Expr::value(Some(reserved_by)))
        .filter(service_slot::Column::ServiceId.eq(service_id))
        .filter(service_slot::Column::SlotDate.eq(date))
        .filter(service_slot::Column::IsBooked.eq(false))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let slot = service_slot::Entity::find()
            .filter(service_slot::Column::ServiceId.eq(service_id))
            .filter(service_slot::Column::SlotDate.eq(date))
            .one(conn)
            .await?;
        return Err(match slot {
            Some(_) => AppError::Conflict("Slot for that date is already booked".to_string()),
            None => AppError::NotFound("No open slot for that date".to_string()),
        });
    }

    Ok(())
}

/// Return the booking's reservation to the pool: increment stock, or clear
/// the matching-date slot. Not idempotent — the lifecycle module guarantees
/// this fires exactly once, on the single transition into `canceled`.
pub async fn release<C: ConnectionTrait>(conn: &C, booked: &booking::Model) -> AppResult<()> {
    if let Some(card_id) = booked.card_template_id {
        card_template::Entity::update_many()
            .col_expr(
                card_template::Column::QuantityAvailable,
                Expr::col(card_template::Column::QuantityAvailable).add(booked.quantity),
            )
            .filter(card_template::Column::Id.eq(card_id))
            .exec(conn)
            .await?;
    } else if let Some(service_id) = booked.service_id {
        // The resource may have been removed since; releasing then is a no-op.
        let Some(svc) = service::Entity::find_by_id(service_id).one(conn).await? else {
            return Ok(());
        };
        match svc.booking_type {
            BookingType::QuantityBased => {
                service::Entity::update_many()
                    .col_expr(
                        service::Column::QuantityAvailable,
                        Expr::col(service::Column::QuantityAvailable).add(booked.quantity),
                    )
                    .filter(service::Column::Id.eq(service_id))
                    .exec(conn)
                    .await?;
            }
            BookingType::EventBased => {
                service_slot::Entity::update_many()
                    .col_expr(service_slot::Column::IsBooked, Expr::value(false))
                    .col_expr(service_slot::Column::ReservedBy, Expr::value(None::<Uuid>))
                    .col_expr(
                        service_slot::Column::ReservationExpiry,
                        Expr::value(None::<chrono::DateTime<chrono::FixedOffset>>),
                    )
                    .filter(service_slot::Column::ServiceId.eq(service_id))
                    .filter(
                        service_slot::Column::SlotDate.eq(booked.scheduled_at.date_naive()),
                    )
                    .exec(conn)
                    .await?;
            }
        }
    }

    Ok(())
}
