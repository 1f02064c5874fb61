//! All-or-nothing conversion of an active estimation into pending bookings.
//! Card lines decrement stock atomically at conversion time; service lines
//! stay unreserved until the vendor confirms, matching direct bookings'
//! vendor-side flow.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::booking::{guards, ledger, pricing};
use crate::entities::booking::{self, BookingStatus};
use crate::entities::estimation::{self, EstimationStatus};
use crate::entities::service::ResourceStatus;
use crate::entities::{card_template, pricing_package, service};
use crate::error::{AppError, AppResult};

/// Convert the user's estimation into one pending booking per line, all in a
/// single transaction. Any failed line rolls back every booking and every
/// stock decrement, and the estimation stays active.
pub async fn convert(
    db: &DatabaseConnection,
    user_id: Uuid,
    estimation_id: Uuid,
    scheduled_at: DateTimeWithTimeZone,
) -> AppResult<Vec<booking::Model>> {
    let txn = db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    match convert_inner(&txn, user_id, estimation_id, scheduled_at).await {
        Ok(bookings) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            Ok(bookings)
        }
        Err(err) => {
            txn.rollback()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            Err(err)
        }
    }
}

async fn convert_inner<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    estimation_id: Uuid,
    scheduled_at: DateTimeWithTimeZone,
) -> AppResult<Vec<booking::Model>> {
    let est = estimation::Entity::find_by_id(estimation_id)
        .filter(estimation::Column::UserId.eq(user_id))
        .filter(estimation::Column::Status.eq(EstimationStatus::Active))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Estimation not found or not authorized".to_string()))?;

    let now = Utc::now();
    let mut bookings = Vec::new();

    // Duplicate detection runs against the bookings that existed before this
    // conversion began; two lines for the same service with different
    // packages must not trip over each other's inserts.
    let service_ids: Vec<Uuid> = est.services.0.iter().map(|l| l.service_id).collect();
    let prior_bookings = if service_ids.is_empty() {
        Vec::new()
    } else {
        booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::ServiceId.is_in(service_ids))
            .filter(booking::Column::ScheduledAt.eq(scheduled_at))
            .all(conn)
            .await?
    };

    for line in &est.services.0 {
        let svc = service::Entity::find_by_id(line.service_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        if svc.status != ResourceStatus::Published {
            return Err(AppError::Conflict(format!(
                "Service '{}' is not published",
                svc.name
            )));
        }
        if guards::is_self_booking(svc.vendor_id, user_id) {
            return Err(AppError::Conflict(
                "Vendors cannot book their own service".to_string(),
            ));
        }
        let package = pricing_package::Entity::find_by_id(line.package_id)
            .filter(pricing_package::Column::ServiceId.eq(line.service_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pricing package not found".to_string()))?;

        if guards::has_open_booking(&prior_bookings, svc.id, scheduled_at) {
            return Err(AppError::Conflict(format!(
                "An open booking for '{}' on that date already exists",
                svc.name
            )));
        }

        let price = pricing::service_price(package.price, &svc, line.quantity, now);
        let created = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            vendor_id: Set(svc.vendor_id),
            service_id: Set(Some(svc.id)),
            package_id: Set(Some(package.id)),
            card_template_id: Set(None),
            status: Set(BookingStatus::Pending),
            scheduled_at: Set(scheduled_at),
            event_date: Set(None),
            completed_at: Set(None),
            price: Set(price),
            quantity: Set(line.quantity),
            review_allowed: Set(false),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
        bookings.push(created);
    }

    for line in &est.cards.0 {
        let card = card_template::Entity::find_by_id(line.card_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;
        if guards::is_self_booking(card.vendor_id, user_id) {
            return Err(AppError::Conflict(
                "Vendors cannot book their own card template".to_string(),
            ));
        }

        let card = ledger::reserve_card_quantity(conn, card.id, line.quantity).await?;

        let price = pricing::card_price(&card, line.quantity, now);
        let created = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            vendor_id: Set(card.vendor_id),
            service_id: Set(None),
            package_id: Set(None),
            card_template_id: Set(Some(card.id)),
            status: Set(BookingStatus::Pending),
            scheduled_at: Set(scheduled_at),
            event_date: Set(None),
            completed_at: Set(None),
            price: Set(price),
            quantity: Set(line.quantity),
            review_allowed: Set(false),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
        bookings.push(created);
    }

    if bookings.is_empty() {
        return Err(AppError::BadRequest("Estimation has no lines".to_string()));
    }

    let mut active: estimation::ActiveModel = est.into();
    active.status = Set(EstimationStatus::Completed);
    active.updated_at = Set(now.into());
    active.update(conn).await?;

    Ok(bookings)
}
