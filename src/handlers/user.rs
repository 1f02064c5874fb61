//! Customer-facing operations: estimations, direct bookings, conversion,
//! cancellation and reviews.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::booking::{conversion, estimation, guards, ledger, lifecycle, pricing};
use crate::entities::booking::{self, BookingStatus};
use crate::entities::estimation::{self as estimation_entity, CardLine, ServiceLine};
use crate::entities::service::{BookingType, ResourceStatus};
use crate::entities::{card_template, pricing_package, review, service, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Estimations ============

#[derive(Debug, Deserialize)]
pub struct EstimationRequest {
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(default)]
    pub cards: Vec<CardLine>,
}

/// Add or update lines on the caller's active estimation
pub async fn create_estimation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EstimationRequest>,
) -> AppResult<Json<estimation_entity::Model>> {
    let est =
        estimation::add_or_update(&state.db, claims.sub, payload.services, payload.cards).await?;
    Ok(Json(est))
}

/// List the caller's estimations, newest first
pub async fn my_estimations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<estimation_entity::Model>>> {
    Ok(Json(
        estimation_entity::Entity::find()
            .filter(estimation_entity::Column::UserId.eq(claims.sub))
            .order_by_desc(estimation_entity::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemQuery {
    pub service_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
}

/// Remove lines from an estimation, or delete it outright when no item is
/// named in the query
pub async fn remove_estimation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(estimation_id): Path<Uuid>,
    Query(query): Query<RemoveItemQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let remaining = estimation::remove_item(
        &state.db,
        estimation_id,
        claims.sub,
        query.service_id,
        query.card_id,
    )
    .await?;

    Ok(Json(match remaining {
        Some(est) => serde_json::json!({ "message": "Item removed", "estimation": est }),
        None => serde_json::json!({ "message": "Estimation deleted" }),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub scheduled_at: DateTimeWithTimeZone,
}

/// Convert an estimation into pending bookings, one per line
pub async fn convert_estimation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(estimation_id): Path<Uuid>,
    Json(payload): Json<ConvertRequest>,
) -> AppResult<Json<Vec<booking::Model>>> {
    let bookings =
        conversion::convert(&state.db, claims.sub, estimation_id, payload.scheduled_at).await?;

    // One message per distinct vendor, after the commit
    let mut vendor_ids: Vec<Uuid> = bookings.iter().map(|b| b.vendor_id).collect();
    vendor_ids.sort_unstable();
    vendor_ids.dedup();
    for vendor_id in vendor_ids {
        let count = bookings.iter().filter(|b| b.vendor_id == vendor_id).count();
        if let Some(vendor) = user::Entity::find_by_id(vendor_id).one(&state.db).await? {
            state.notifier.send_later(
                vendor.phone,
                format!("You have {} new pending booking request(s)", count),
            );
        }
    }

    Ok(Json(bookings))
}

// ============ Bookings ============

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub card_template_id: Option<Uuid>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub scheduled_at: DateTimeWithTimeZone,
    /// Rental categories book a range; required for them, rejected otherwise.
    pub end_date: Option<DateTimeWithTimeZone>,
}

fn default_quantity() -> i32 {
    1
}

/// Book a service package or a card template directly
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<booking::Model>> {
    if payload.service_id.is_some() == payload.card_template_id.is_some() {
        return Err(AppError::BadRequest(
            "Exactly one of service_id or card_template_id is required".to_string(),
        ));
    }
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    let result = if let Some(service_id) = payload.service_id {
        create_service_booking(&txn, claims.sub, service_id, &payload).await
    } else {
        // Checked above: card_template_id is present on this branch
        match payload.card_template_id {
            Some(card_id) => create_card_booking(&txn, claims.sub, card_id, &payload).await,
            None => Err(AppError::BadRequest(
                "Exactly one of service_id or card_template_id is required".to_string(),
            )),
        }
    };

    let booked = match result {
        Ok(booked) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            booked
        }
        Err(err) => {
            txn.rollback()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            return Err(err);
        }
    };

    if let Some(vendor) = user::Entity::find_by_id(booked.vendor_id)
        .one(&state.db)
        .await?
    {
        state
            .notifier
            .send_later(vendor.phone, "You have a new pending booking request".to_string());
    }

    Ok(Json(booked))
}

async fn create_service_booking<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    service_id: Uuid,
    payload: &CreateBookingRequest,
) -> AppResult<booking::Model> {
    let svc = service::Entity::find_by_id(service_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    if svc.status != ResourceStatus::Published {
        return Err(AppError::Conflict("Service is not published".to_string()));
    }
    if guards::is_self_booking(svc.vendor_id, user_id) {
        return Err(AppError::Conflict(
            "Vendors cannot book their own service".to_string(),
        ));
    }

    if svc.category.is_rental() {
        match payload.end_date {
            Some(end) if end > payload.scheduled_at => {}
            Some(_) => {
                return Err(AppError::BadRequest(
                    "end_date must be after scheduled_at".to_string(),
                ))
            }
            None => {
                return Err(AppError::BadRequest(
                    "Rental bookings require an end_date".to_string(),
                ))
            }
        }
    } else if payload.end_date.is_some() {
        return Err(AppError::BadRequest(
            "end_date only applies to rental categories".to_string(),
        ));
    }

    let package_id = payload
        .package_id
        .ok_or_else(|| AppError::BadRequest("package_id is required".to_string()))?;
    let package = pricing_package::Entity::find_by_id(package_id)
        .filter(pricing_package::Column::ServiceId.eq(service_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Pricing package not found".to_string()))?;

    let prior_bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .filter(booking::Column::ServiceId.eq(service_id))
        .filter(booking::Column::ScheduledAt.eq(payload.scheduled_at))
        .all(conn)
        .await?;
    if guards::has_open_booking(&prior_bookings, service_id, payload.scheduled_at) {
        return Err(AppError::Conflict(
            "An open booking for this service on that date already exists".to_string(),
        ));
    }

    match svc.booking_type {
        BookingType::EventBased => {
            ledger::reserve_slot(conn, service_id, payload.scheduled_at.date_naive(), user_id)
                .await?;
        }
        BookingType::QuantityBased => {
            ledger::reserve_service_quantity(conn, service_id, payload.quantity).await?;
        }
    }

    let now = Utc::now();
    let price = pricing::service_price(package.price, &svc, payload.quantity, now);
    let event_date = if svc.category.is_rental() {
        payload.end_date
    } else {
        Some(payload.scheduled_at)
    };

    Ok(booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        vendor_id: Set(svc.vendor_id),
        service_id: Set(Some(service_id)),
        package_id: Set(Some(package.id)),
        card_template_id: Set(None),
        status: Set(BookingStatus::Pending),
        scheduled_at: Set(payload.scheduled_at),
        event_date: Set(event_date),
        completed_at: Set(None),
        price: Set(price),
        quantity: Set(payload.quantity),
        review_allowed: Set(false),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?)
}

async fn create_card_booking<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    card_id: Uuid,
    payload: &CreateBookingRequest,
) -> AppResult<booking::Model> {
    if payload.end_date.is_some() {
        return Err(AppError::BadRequest(
            "end_date only applies to rental categories".to_string(),
        ));
    }

    let card = card_template::Entity::find_by_id(card_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;
    if guards::is_self_booking(card.vendor_id, user_id) {
        return Err(AppError::Conflict(
            "Vendors cannot book their own card template".to_string(),
        ));
    }

    let card = ledger::reserve_card_quantity(conn, card_id, payload.quantity).await?;

    let now = Utc::now();
    let price = pricing::card_price(&card, payload.quantity, now);

    Ok(booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        vendor_id: Set(card.vendor_id),
        service_id: Set(None),
        package_id: Set(None),
        card_template_id: Set(Some(card_id)),
        status: Set(BookingStatus::Pending),
        scheduled_at: Set(payload.scheduled_at),
        event_date: Set(None),
        completed_at: Set(None),
        price: Set(price),
        quantity: Set(payload.quantity),
        review_allowed: Set(false),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?)
}

/// List the caller's bookings, newest first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<booking::Model>>> {
    Ok(Json(
        booking::Entity::find()
            .filter(booking::Column::UserId.eq(claims.sub))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

/// Cancel a pending booking, returning its reservation to the pool
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    let booked = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Vendors may cancel confirmed bookings; customers only pending ones
    if booked.status != BookingStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending bookings can be canceled".to_string(),
        ));
    }

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    let canceled = match lifecycle::transition(&txn, booked, BookingStatus::Canceled).await {
        Ok(canceled) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            canceled
        }
        Err(err) => {
            txn.rollback()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            return Err(err);
        }
    };

    if let Some(vendor) = user::Entity::find_by_id(canceled.vendor_id)
        .one(&state.db)
        .await?
    {
        state
            .notifier
            .send_later(vendor.phone, "A pending booking request was canceled".to_string());
    }

    Ok(Json(canceled))
}

// ============ Reviews ============

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub booking_id: Uuid,
    pub stars: i32,
    pub comment: Option<String>,
}

/// Review a completed booking's service or card, once per booking
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<Json<review::Model>> {
    if !(1..=5).contains(&payload.stars) {
        return Err(AppError::BadRequest(
            "Stars must be between 1 and 5".to_string(),
        ));
    }

    let booked = booking::Entity::find_by_id(payload.booking_id)
        .filter(booking::Column::UserId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booked.status != BookingStatus::Completed || !booked.review_allowed {
        return Err(AppError::Conflict(
            "Only completed bookings can be reviewed".to_string(),
        ));
    }

    let existing = review::Entity::find()
        .filter(review::Column::BookingId.eq(booked.id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "This booking has already been reviewed".to_string(),
        ));
    }

    let created = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claims.sub),
        booking_id: Set(booked.id),
        service_id: Set(booked.service_id),
        card_template_id: Set(booked.card_template_id),
        stars: Set(payload.stars),
        comment: Set(payload.comment.clone()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    recompute_resource_rating(&state.db, booked.service_id, booked.card_template_id).await?;

    Ok(Json(created))
}

/// List the caller's reviews
pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<review::Model>>> {
    Ok(Json(
        review::Entity::find()
            .filter(review::Column::UserId.eq(claims.sub))
            .filter(review::Column::IsActive.eq(true))
            .order_by_desc(review::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

/// Recompute a resource's rating aggregate over its active reviews. Shared
/// with the admin moderation path.
pub(crate) async fn recompute_resource_rating<C: ConnectionTrait>(
    conn: &C,
    service_id: Option<Uuid>,
    card_template_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(service_id) = service_id {
        let reviews = review::Entity::find()
            .filter(review::Column::ServiceId.eq(service_id))
            .filter(review::Column::IsActive.eq(true))
            .all(conn)
            .await?;
        let count = reviews.len() as i32;
        let avg = if count > 0 {
            reviews.iter().map(|r| r.stars as f64).sum::<f64>() / count as f64
        } else {
            0.0
        };
        service::Entity::update_many()
            .col_expr(service::Column::AvgRating, Expr::value(avg))
            .col_expr(service::Column::ReviewCount, Expr::value(count))
            .filter(service::Column::Id.eq(service_id))
            .exec(conn)
            .await?;
    } else if let Some(card_id) = card_template_id {
        let reviews = review::Entity::find()
            .filter(review::Column::CardTemplateId.eq(card_id))
            .filter(review::Column::IsActive.eq(true))
            .all(conn)
            .await?;
        let count = reviews.len() as i32;
        let avg = if count > 0 {
            reviews.iter().map(|r| r.stars as f64).sum::<f64>() / count as f64
        } else {
            0.0
        };
        card_template::Entity::update_many()
            .col_expr(card_template::Column::AvgRating, Expr::value(avg))
            .col_expr(card_template::Column::ReviewCount, Expr::value(count))
            .filter(card_template::Column::Id.eq(card_id))
            .exec(conn)
            .await?;
    }

    Ok(())
}
