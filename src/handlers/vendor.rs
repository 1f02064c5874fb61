//! Vendor operations: listing services and card templates (which enter
//! moderation as pending), managing slots, and working booking requests.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::booking::{lifecycle, pricing};
use crate::entities::booking::{self, BookingStatus};
use crate::entities::service::{BookingType, ResourceStatus, ServiceCategory};
use crate::entities::{card_template, pricing_package, service, service_slot, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Services ============

#[derive(Debug, Deserialize)]
pub struct PackageRequest {
    pub name: String,
    pub price: f64,
    pub inclusions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub category: ServiceCategory,
    pub name: String,
    pub city: String,
    pub description: String,
    pub additional_info: Option<String>,
    pub booking_type: BookingType,
    #[serde(default)]
    pub quantity_available: i32,
    pub discount_percent: Option<f64>,
    pub discount_expiry: Option<DateTimeWithTimeZone>,
    pub packages: Vec<PackageRequest>,
    #[serde(default)]
    pub slot_dates: Vec<NaiveDate>,
}

/// Create a service listing; it stays pending until an admin approves it
pub async fn create_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateServiceRequest>,
) -> AppResult<Json<service::Model>> {
    if payload.packages.is_empty() {
        return Err(AppError::BadRequest(
            "A service needs at least one pricing package".to_string(),
        ));
    }
    if payload.booking_type == BookingType::QuantityBased && payload.quantity_available < 1 {
        return Err(AppError::BadRequest(
            "Quantity-based services need available stock".to_string(),
        ));
    }
    validate_discount(payload.discount_percent)?;

    let now = Utc::now();
    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    let result: AppResult<service::Model> = async {
        let created = service::ActiveModel {
            id: Set(Uuid::new_v4()),
            vendor_id: Set(claims.sub),
            category: Set(payload.category),
            status: Set(ResourceStatus::Pending),
            name: Set(payload.name.clone()),
            city: Set(payload.city.clone()),
            description: Set(payload.description.clone()),
            additional_info: Set(payload.additional_info.clone()),
            booking_type: Set(payload.booking_type),
            quantity_available: Set(payload.quantity_available),
            discount_percent: Set(payload.discount_percent),
            discount_expiry: Set(payload.discount_expiry),
            avg_rating: Set(0.0),
            review_count: Set(0),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        for package in &payload.packages {
            pricing_package::ActiveModel {
                id: Set(Uuid::new_v4()),
                service_id: Set(created.id),
                name: Set(package.name.clone()),
                price: Set(package.price),
                inclusions: Set(package.inclusions.clone()),
            }
            .insert(&txn)
            .await?;
        }

        for date in &payload.slot_dates {
            service_slot::ActiveModel {
                id: Set(Uuid::new_v4()),
                service_id: Set(created.id),
                slot_date: Set(*date),
                is_booked: Set(false),
                reserved_by: Set(None),
                reservation_expiry: Set(None),
            }
            .insert(&txn)
            .await?;
        }

        Ok(created)
    }
    .await;

    match result {
        Ok(created) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            Ok(Json(created))
        }
        Err(err) => {
            txn.rollback()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            Err(err)
        }
    }
}

/// List the caller's services regardless of moderation status
pub async fn my_services(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<service::Model>>> {
    Ok(Json(
        service::Entity::find()
            .filter(service::Column::VendorId.eq(claims.sub))
            .order_by_desc(service::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub quantity_available: Option<i32>,
    pub discount_percent: Option<f64>,
    pub discount_expiry: Option<DateTimeWithTimeZone>,
}

/// Update a service's mutable fields. Edits send the listing back through
/// moderation, and an already-expired discount is dropped on save.
pub async fn update_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> AppResult<Json<service::Model>> {
    let svc = service::Entity::find_by_id(service_id)
        .filter(service::Column::VendorId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    validate_discount(payload.discount_percent)?;

    let mut percent = payload.discount_percent.or(svc.discount_percent);
    let mut expiry = payload.discount_expiry.or(svc.discount_expiry);
    if pricing::discount_expired(expiry, Utc::now()) {
        percent = None;
        expiry = None;
    }

    let mut active: service::ActiveModel = svc.into();
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if payload.additional_info.is_some() {
        active.additional_info = Set(payload.additional_info);
    }
    if let Some(quantity) = payload.quantity_available {
        if quantity < 0 {
            return Err(AppError::BadRequest(
                "Quantity cannot be negative".to_string(),
            ));
        }
        active.quantity_available = Set(quantity);
    }
    active.discount_percent = Set(percent);
    active.discount_expiry = Set(expiry);
    active.status = Set(ResourceStatus::Pending);

    Ok(Json(active.update(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddSlotsRequest {
    pub slot_dates: Vec<NaiveDate>,
}

/// Add bookable dates to an event-based service
pub async fn add_slots(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<AddSlotsRequest>,
) -> AppResult<Json<Vec<service_slot::Model>>> {
    let svc = service::Entity::find_by_id(service_id)
        .filter(service::Column::VendorId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    if svc.booking_type != BookingType::EventBased {
        return Err(AppError::BadRequest(
            "Only event-based services take slots".to_string(),
        ));
    }
    if payload.slot_dates.is_empty() {
        return Err(AppError::BadRequest("No slot dates given".to_string()));
    }

    let existing: Vec<NaiveDate> = service_slot::Entity::find()
        .filter(service_slot::Column::ServiceId.eq(service_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| s.slot_date)
        .collect();

    let mut created = Vec::new();
    for date in payload.slot_dates {
        if existing.contains(&date) {
            return Err(AppError::Conflict(format!(
                "A slot for {} already exists",
                date
            )));
        }
        let slot = service_slot::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(service_id),
            slot_date: Set(date),
            is_booked: Set(false),
            reserved_by: Set(None),
            reservation_expiry: Set(None),
        }
        .insert(&state.db)
        .await?;
        created.push(slot);
    }

    Ok(Json(created))
}

// ============ Card templates ============

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub name: String,
    pub card_type: card_template::CardType,
    pub price_per_card: f64,
    pub quantity_available: i32,
    pub city: String,
    pub description: Option<String>,
    pub discount_percent: Option<f64>,
    pub discount_expiry: Option<DateTimeWithTimeZone>,
}

/// Create a card template; pending until approved
pub async fn create_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCardRequest>,
) -> AppResult<Json<card_template::Model>> {
    if payload.price_per_card <= 0.0 {
        return Err(AppError::BadRequest(
            "Price per card must be positive".to_string(),
        ));
    }
    if payload.quantity_available < 1 {
        return Err(AppError::BadRequest(
            "Card templates need available stock".to_string(),
        ));
    }
    validate_discount(payload.discount_percent)?;

    let created = card_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(claims.sub),
        status: Set(ResourceStatus::Pending),
        name: Set(payload.name.clone()),
        card_type: Set(payload.card_type),
        price_per_card: Set(payload.price_per_card),
        quantity_available: Set(payload.quantity_available),
        city: Set(payload.city.clone()),
        description: Set(payload.description.clone()),
        discount_percent: Set(payload.discount_percent),
        discount_expiry: Set(payload.discount_expiry),
        avg_rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(created))
}

/// List the caller's card templates
pub async fn my_cards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<card_template::Model>>> {
    Ok(Json(
        card_template::Entity::find()
            .filter(card_template::Column::VendorId.eq(claims.sub))
            .order_by_desc(card_template::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub description: Option<String>,
    pub price_per_card: Option<f64>,
    pub quantity_available: Option<i32>,
    pub discount_percent: Option<f64>,
    pub discount_expiry: Option<DateTimeWithTimeZone>,
}

/// Update a card template; edits send it back through moderation
pub async fn update_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<UpdateCardRequest>,
) -> AppResult<Json<card_template::Model>> {
    let card = card_template::Entity::find_by_id(card_id)
        .filter(card_template::Column::VendorId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;

    validate_discount(payload.discount_percent)?;

    let mut percent = payload.discount_percent.or(card.discount_percent);
    let mut expiry = payload.discount_expiry.or(card.discount_expiry);
    if pricing::discount_expired(expiry, Utc::now()) {
        percent = None;
        expiry = None;
    }

    let mut active: card_template::ActiveModel = card.into();
    if payload.description.is_some() {
        active.description = Set(payload.description);
    }
    if let Some(price) = payload.price_per_card {
        if price <= 0.0 {
            return Err(AppError::BadRequest(
                "Price per card must be positive".to_string(),
            ));
        }
        active.price_per_card = Set(price);
    }
    if let Some(quantity) = payload.quantity_available {
        if quantity < 0 {
            return Err(AppError::BadRequest(
                "Quantity cannot be negative".to_string(),
            ));
        }
        active.quantity_available = Set(quantity);
    }
    active.discount_percent = Set(percent);
    active.discount_expiry = Set(expiry);
    active.status = Set(ResourceStatus::Pending);

    Ok(Json(active.update(&state.db).await?))
}

// ============ Bookings ============

/// List bookings against the caller's resources, newest first
pub async fn vendor_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<booking::Model>>> {
    Ok(Json(
        booking::Entity::find()
            .filter(booking::Column::VendorId.eq(claims.sub))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Move one of the caller's bookings through the status state machine
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<booking::Model>> {
    let booked = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::VendorId.eq(claims.sub))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    let updated = match lifecycle::transition(&txn, booked, payload.status).await {
        Ok(updated) => {
            txn.commit()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            updated
        }
        Err(err) => {
            txn.rollback()
                .await
                .map_err(|e| AppError::TransactionFailure(e.to_string()))?;
            return Err(err);
        }
    };

    if let Some(customer) = user::Entity::find_by_id(updated.user_id)
        .one(&state.db)
        .await?
    {
        state.notifier.send_later(
            customer.phone,
            format!("Your booking is now {}", updated.status.as_str()),
        );
    }

    Ok(Json(updated))
}

fn validate_discount(percent: Option<f64>) -> AppResult<()> {
    match percent {
        Some(p) if !(0.0..=100.0).contains(&p) => Err(AppError::BadRequest(
            "Discount percent must be between 0 and 100".to_string(),
        )),
        _ => Ok(()),
    }
}
