//! Unauthenticated catalog browsing. Only published resources are visible.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::service::{ResourceStatus, ServiceCategory};
use crate::entities::{card_template, pricing_package, review, service, service_slot};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ServiceFilter {
    pub category: Option<ServiceCategory>,
    pub city: Option<String>,
}

/// List published services, optionally filtered by category and city
pub async fn list_services(
    State(state): State<AppState>,
    Query(filter): Query<ServiceFilter>,
) -> AppResult<Json<Vec<service::Model>>> {
    let mut query = service::Entity::find()
        .filter(service::Column::Status.eq(ResourceStatus::Published));

    if let Some(category) = filter.category {
        query = query.filter(service::Column::Category.eq(category));
    }
    if let Some(city) = filter.city {
        query = query.filter(service::Column::City.eq(city));
    }

    Ok(Json(
        query
            .order_by_desc(service::Column::AvgRating)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, serde::Serialize)]
pub struct ServiceDetailResponse {
    #[serde(flatten)]
    pub service: service::Model,
    pub packages: Vec<pricing_package::Model>,
    pub open_slots: Vec<service_slot::Model>,
    pub reviews: Vec<review::Model>,
}

/// Get one published service with its packages, open slots and reviews
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> AppResult<Json<ServiceDetailResponse>> {
    let svc = service::Entity::find_by_id(service_id)
        .filter(service::Column::Status.eq(ResourceStatus::Published))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let packages = pricing_package::Entity::find()
        .filter(pricing_package::Column::ServiceId.eq(service_id))
        .all(&state.db)
        .await?;

    let open_slots = service_slot::Entity::find()
        .filter(service_slot::Column::ServiceId.eq(service_id))
        .filter(service_slot::Column::IsBooked.eq(false))
        .order_by_asc(service_slot::Column::SlotDate)
        .all(&state.db)
        .await?;

    let reviews = review::Entity::find()
        .filter(review::Column::ServiceId.eq(service_id))
        .filter(review::Column::IsActive.eq(true))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(ServiceDetailResponse {
        service: svc,
        packages,
        open_slots,
        reviews,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CardFilter {
    pub city: Option<String>,
}

/// List published card templates
pub async fn list_cards(
    State(state): State<AppState>,
    Query(filter): Query<CardFilter>,
) -> AppResult<Json<Vec<card_template::Model>>> {
    let mut query = card_template::Entity::find()
        .filter(card_template::Column::Status.eq(ResourceStatus::Published));

    if let Some(city) = filter.city {
        query = query.filter(card_template::Column::City.eq(city));
    }

    Ok(Json(
        query
            .order_by_desc(card_template::Column::AvgRating)
            .all(&state.db)
            .await?,
    ))
}

#[derive(Debug, serde::Serialize)]
pub struct CardDetailResponse {
    #[serde(flatten)]
    pub card: card_template::Model,
    pub reviews: Vec<review::Model>,
}

/// Get one published card template with its reviews
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> AppResult<Json<CardDetailResponse>> {
    let card = card_template::Entity::find_by_id(card_id)
        .filter(card_template::Column::Status.eq(ResourceStatus::Published))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;

    let reviews = review::Entity::find()
        .filter(review::Column::CardTemplateId.eq(card_id))
        .filter(review::Column::IsActive.eq(true))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(CardDetailResponse { card, reviews }))
}
