//! Admin operations: moderation of vendor resources, user management,
//! booking oversight and review takedown.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::booking::{lifecycle, pricing};
use crate::entities::booking::{self, BookingStatus};
use crate::entities::service::ResourceStatus;
use crate::entities::user::{self, UserRole};
use crate::entities::{card_template, review, service};
use crate::error::{AppError, AppResult};
use crate::handlers::user::recompute_resource_rating;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    pub status: ResourceStatus,
}

/// Set a service's moderation status. Approval drops an already-expired
/// discount; a published listing can be reverted to pending.
pub async fn moderate_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<ModerationRequest>,
) -> AppResult<Json<service::Model>> {
    let svc = service::Entity::find_by_id(service_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
    let vendor_id = svc.vendor_id;

    let mut active: service::ActiveModel = svc.clone().into();
    if payload.status == ResourceStatus::Published
        && pricing::discount_expired(svc.discount_expiry, Utc::now())
    {
        active.discount_percent = Set(None);
        active.discount_expiry = Set(None);
    }
    active.status = Set(payload.status);
    let updated = active.update(&state.db).await?;

    notify_vendor(&state, vendor_id, &updated.name, payload.status).await?;
    Ok(Json(updated))
}

/// Set a card template's moderation status
pub async fn moderate_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<ModerationRequest>,
) -> AppResult<Json<card_template::Model>> {
    let card = card_template::Entity::find_by_id(card_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;
    let vendor_id = card.vendor_id;

    let mut active: card_template::ActiveModel = card.clone().into();
    if payload.status == ResourceStatus::Published
        && pricing::discount_expired(card.discount_expiry, Utc::now())
    {
        active.discount_percent = Set(None);
        active.discount_expiry = Set(None);
    }
    active.status = Set(payload.status);
    let updated = active.update(&state.db).await?;

    notify_vendor(&state, vendor_id, &updated.name, payload.status).await?;
    Ok(Json(updated))
}

async fn notify_vendor(
    state: &AppState,
    vendor_id: Uuid,
    resource_name: &str,
    status: ResourceStatus,
) -> AppResult<()> {
    let word = match status {
        ResourceStatus::Published => "approved",
        ResourceStatus::Rejected => "rejected",
        ResourceStatus::Pending => "sent back for review",
    };
    if let Some(vendor) = user::Entity::find_by_id(vendor_id).one(&state.db).await? {
        state
            .notifier
            .send_later(vendor.phone, format!("Your listing '{}' was {}", resource_name, word));
    }
    Ok(())
}

/// List services awaiting moderation
pub async fn pending_services(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<service::Model>>> {
    Ok(Json(
        service::Entity::find()
            .filter(service::Column::Status.eq(ResourceStatus::Pending))
            .order_by_asc(service::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

/// List card templates awaiting moderation
pub async fn pending_cards(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<card_template::Model>>> {
    Ok(Json(
        card_template::Entity::find()
            .filter(card_template::Column::Status.eq(ResourceStatus::Pending))
            .order_by_asc(card_template::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

// ============ Users ============

/// List all accounts
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<user::Model>>> {
    Ok(Json(
        user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Change an account's role
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<user::Model>> {
    let account = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = account.into();
    active.role = Set(payload.role);
    Ok(Json(active.update(&state.db).await?))
}

// ============ Bookings ============

/// List all bookings, newest first
pub async fn list_bookings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<booking::Model>>> {
    Ok(Json(
        booking::Entity::find()
            .order_by_desc(booking::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

/// Cancel any open booking, releasing its reservation
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    let booked = booking::Entity::find_by_id(booking_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

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

    if let Some(customer) = user::Entity::find_by_id(canceled.user_id)
        .one(&state.db)
        .await?
    {
        state
            .notifier
            .send_later(customer.phone, "Your booking was canceled".to_string());
    }

    Ok(Json(canceled))
}

// ============ Reviews ============

/// Soft-delete a review and recompute the resource's rating aggregate
pub async fn remove_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let found = review::Entity::find_by_id(review_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    let service_id = found.service_id;
    let card_template_id = found.card_template_id;

    let mut active: review::ActiveModel = found.into();
    active.is_active = Set(false);
    active.update(&state.db).await?;

    recompute_resource_rating(&state.db, service_id, card_template_id).await?;

    Ok(Json(serde_json::json!({ "message": "Review removed" })))
}
