//! Estimation aggregation: each user keeps at most one active estimation, a
//! merged set of service and card lines whose total is recomputed from live
//! prices on every change.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::booking::pricing;
use crate::entities::estimation::{
    self, CardLine, CardLines, EstimationStatus, ServiceLine, ServiceLines,
};
use crate::entities::{card_template, pricing_package, service};
use crate::error::{AppError, AppResult};

/// Merge incoming service lines into the existing set. A line with the same
/// (service, package) pair replaces the stored quantity; new pairs append.
/// Lines whose quantity drops to zero or below are pruned.
pub fn merge_service_lines(existing: &mut Vec<ServiceLine>, incoming: Vec<ServiceLine>) {
    for line in incoming {
        match existing
            .iter_mut()
            .find(|l| l.service_id == line.service_id && l.package_id == line.package_id)
        {
            Some(found) => found.quantity = line.quantity,
            None => existing.push(line),
        }
    }
    existing.retain(|l| l.quantity > 0);
}

/// Card lines merge by card id, same replace-then-prune rules.
pub fn merge_card_lines(existing: &mut Vec<CardLine>, incoming: Vec<CardLine>) {
    for line in incoming {
        match existing.iter_mut().find(|l| l.card_id == line.card_id) {
            Some(found) => found.quantity = line.quantity,
            None => existing.push(line),
        }
    }
    existing.retain(|l| l.quantity > 0);
}

/// Re-price every line against the current catalog. A line referencing a
/// missing service, package, or card fails the whole computation so stale
/// estimations surface instead of silently shrinking.
pub async fn price_lines<C: ConnectionTrait>(
    conn: &C,
    services: &[ServiceLine],
    cards: &[CardLine],
    now: DateTime<Utc>,
) -> AppResult<f64> {
    let mut total = 0.0;

    for line in services {
        let svc = service::Entity::find_by_id(line.service_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        let package = pricing_package::Entity::find_by_id(line.package_id)
            .filter(pricing_package::Column::ServiceId.eq(line.service_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Pricing package not found".to_string()))?;
        total += pricing::service_price(package.price, &svc, line.quantity, now);
    }

    for line in cards {
        let card = card_template::Entity::find_by_id(line.card_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Card template not found".to_string()))?;
        total += pricing::card_price(&card, line.quantity, now);
    }

    Ok(total)
}

pub async fn find_active<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<estimation::Model>> {
    Ok(estimation::Entity::find()
        .filter(estimation::Column::UserId.eq(user_id))
        .filter(estimation::Column::Status.eq(EstimationStatus::Active))
        .one(conn)
        .await?)
}

/// Merge the incoming lines into the user's active estimation, creating one
/// if none exists, and recompute the total from live prices.
pub async fn add_or_update<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    services: Vec<ServiceLine>,
    cards: Vec<CardLine>,
) -> AppResult<estimation::Model> {
    if services.is_empty() && cards.is_empty() {
        return Err(AppError::BadRequest(
            "At least one service or card line is required".to_string(),
        ));
    }

    let now = Utc::now();

    match find_active(conn, user_id).await? {
        Some(existing) => {
            let mut service_lines = existing.services.0.clone();
            let mut card_lines = existing.cards.0.clone();
            merge_service_lines(&mut service_lines, services);
            merge_card_lines(&mut card_lines, cards);

            let total = price_lines(conn, &service_lines, &card_lines, now).await?;

            let mut active: estimation::ActiveModel = existing.into();
            active.services = Set(ServiceLines(service_lines));
            active.cards = Set(CardLines(card_lines));
            active.total_cost = Set(total);
            active.updated_at = Set(now.into());
            Ok(active.update(conn).await?)
        }
        None => {
            let mut service_lines = Vec::new();
            let mut card_lines = Vec::new();
            merge_service_lines(&mut service_lines, services);
            merge_card_lines(&mut card_lines, cards);

            let total = price_lines(conn, &service_lines, &card_lines, now).await?;

            let fresh = estimation::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                services: Set(ServiceLines(service_lines)),
                cards: Set(CardLines(card_lines)),
                total_cost: Set(total),
                status: Set(EstimationStatus::Active),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            Ok(fresh.insert(conn).await?)
        }
    }
}

/// Remove lines from an estimation the user owns. With a `service_id` every
/// package line for that service goes; with a `card_id` that card line goes;
/// with neither the whole estimation is deleted. An estimation emptied by
/// removal is deleted rather than kept as a zero-total shell.
pub async fn remove_item<C: ConnectionTrait>(
    conn: &C,
    estimation_id: Uuid,
    user_id: Uuid,
    service_id: Option<Uuid>,
    card_id: Option<Uuid>,
) -> AppResult<Option<estimation::Model>> {
    let existing = estimation::Entity::find_by_id(estimation_id)
        .filter(estimation::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Estimation not found".to_string()))?;

    if service_id.is_none() && card_id.is_none() {
        existing.delete(conn).await?;
        return Ok(None);
    }

    let mut service_lines = existing.services.0.clone();
    let mut card_lines = existing.cards.0.clone();
    if let Some(service_id) = service_id {
        service_lines.retain(|l| l.service_id != service_id);
    }
    if let Some(card_id) = card_id {
        card_lines.retain(|l| l.card_id != card_id);
    }

    if service_lines.is_empty() && card_lines.is_empty() {
        existing.delete(conn).await?;
        return Ok(None);
    }

    let now = Utc::now();
    let total = price_lines(conn, &service_lines, &card_lines, now).await?;

    let mut active: estimation::ActiveModel = existing.into();
    active.services = Set(ServiceLines(service_lines));
    active.cards = Set(CardLines(card_lines));
    active.total_cost = Set(total);
    active.updated_at = Set(now.into());
    Ok(Some(active.update(conn).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_line(service: u8, package: u8, quantity: i32) -> ServiceLine {
        ServiceLine {
            service_id: Uuid::from_u128(service as u128),
            package_id: Uuid::from_u128(1000 + package as u128),
            quantity,
        }
    }

    fn card_line(card: u8, quantity: i32) -> CardLine {
        CardLine {
            card_id: Uuid::from_u128(card as u128),
            quantity,
        }
    }

    #[test]
    fn test_merge_replaces_quantity_on_same_pair() {
        let mut lines = vec![service_line(1, 1, 2)];
        merge_service_lines(&mut lines, vec![service_line(1, 1, 5)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn test_merge_appends_new_pairs() {
        let mut lines = vec![service_line(1, 1, 2)];
        merge_service_lines(&mut lines, vec![service_line(1, 2, 1), service_line(2, 1, 3)]);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_merge_prunes_zero_and_negative() {
        let mut lines = vec![service_line(1, 1, 2), service_line(2, 1, 3)];
        merge_service_lines(&mut lines, vec![service_line(1, 1, 0), service_line(2, 1, -1)]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_card_merge_by_card_id() {
        let mut lines = vec![card_line(1, 50)];
        merge_card_lines(&mut lines, vec![card_line(1, 75), card_line(2, 100)]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 75);
        assert_eq!(lines[1].quantity, 100);
    }
}
