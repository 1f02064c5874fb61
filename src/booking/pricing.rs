//! Price computation for prospective bookings. Pure functions; currency
//! arithmetic is f64, consistent with the store.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::entities::card_template;
use crate::entities::service;

/// A discount applies while `discount_percent > 0` and the expiry is unset
/// or still in the future.
pub fn discount_active(
    discount_percent: Option<f64>,
    discount_expiry: Option<DateTimeWithTimeZone>,
    now: DateTime<Utc>,
) -> bool {
    match discount_percent {
        Some(percent) if percent > 0.0 => match discount_expiry {
            Some(expiry) => expiry.with_timezone(&Utc) > now,
            None => true,
        },
        _ => false,
    }
}

/// True when a set expiry has passed; the write paths use this to lazily
/// clear stale discount fields on the next save.
pub fn discount_expired(discount_expiry: Option<DateTimeWithTimeZone>, now: DateTime<Utc>) -> bool {
    matches!(discount_expiry, Some(expiry) if expiry.with_timezone(&Utc) <= now)
}

pub fn apply_discount(
    amount: f64,
    discount_percent: Option<f64>,
    discount_expiry: Option<DateTimeWithTimeZone>,
    now: DateTime<Utc>,
) -> f64 {
    if discount_active(discount_percent, discount_expiry, now) {
        amount * (1.0 - discount_percent.unwrap_or(0.0) / 100.0)
    } else {
        amount
    }
}

/// Wedding venues price per unit; every other service category prices as a
/// single unit regardless of the quantity recorded on the booking.
pub fn billable_quantity(category: service::ServiceCategory, quantity: i32) -> i32 {
    if category.is_venue() {
        quantity
    } else {
        1
    }
}

pub fn card_price(card: &card_template::Model, quantity: i32, now: DateTime<Utc>) -> f64 {
    apply_discount(
        card.price_per_card * quantity as f64,
        card.discount_percent,
        card.discount_expiry,
        now,
    )
}

pub fn service_price(
    package_price: f64,
    svc: &service::Model,
    quantity: i32,
    now: DateTime<Utc>,
) -> f64 {
    apply_discount(
        package_price * billable_quantity(svc.category, quantity) as f64,
        svc.discount_percent,
        svc.discount_expiry,
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::prelude::Uuid;

    use crate::entities::service::{BookingType, ResourceStatus, ServiceCategory};

    fn card(price: f64, percent: Option<f64>, expiry: Option<DateTimeWithTimeZone>) -> card_template::Model {
        card_template::Model {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            status: ResourceStatus::Published,
            name: "Floral invite".to_string(),
            card_type: card_template::CardType::Simple,
            price_per_card: price,
            quantity_available: 100,
            city: "Delhi".to_string(),
            description: None,
            discount_percent: percent,
            discount_expiry: expiry,
            avg_rating: 0.0,
            review_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn svc(category: ServiceCategory) -> service::Model {
        service::Model {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            category,
            status: ResourceStatus::Published,
            name: "Test service".to_string(),
            city: "Delhi".to_string(),
            description: "".to_string(),
            additional_info: None,
            booking_type: BookingType::EventBased,
            quantity_available: 0,
            discount_percent: None,
            discount_expiry: None,
            avg_rating: 0.0,
            review_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_card_discount_without_expiry() {
        let now = Utc::now();
        let card = card(100.0, Some(20.0), None);
        assert_eq!(card_price(&card, 1, now), 80.0);
        assert_eq!(card_price(&card, 2, now), 160.0);
    }

    #[test]
    fn test_expired_discount_charges_full_price() {
        let now = Utc::now();
        let expiry = (now - Duration::days(1)).into();
        let card = card(100.0, Some(20.0), Some(expiry));
        assert_eq!(card_price(&card, 1, now), 100.0);
        assert_eq!(card_price(&card, 2, now), 200.0);
        assert!(discount_expired(Some(expiry), now));
    }

    #[test]
    fn test_future_expiry_keeps_discount() {
        let now = Utc::now();
        let expiry = (now + Duration::days(3)).into();
        let card = card(100.0, Some(50.0), Some(expiry));
        assert_eq!(card_price(&card, 4, now), 200.0);
        assert!(!discount_expired(Some(expiry), now));
    }

    #[test]
    fn test_zero_discount_is_inactive() {
        let now = Utc::now();
        assert!(!discount_active(Some(0.0), None, now));
        assert!(!discount_active(None, None, now));
    }

    #[test]
    fn test_venue_prices_per_unit() {
        let now = Utc::now();
        let venue = svc(ServiceCategory::WeddingVenues);
        assert_eq!(service_price(1000.0, &venue, 3, now), 3000.0);
    }

    #[test]
    fn test_non_venue_ignores_quantity() {
        let now = Utc::now();
        let photographer = svc(ServiceCategory::Photographers);
        assert_eq!(service_price(1000.0, &photographer, 3, now), 1000.0);
        assert_eq!(billable_quantity(ServiceCategory::HennaArtists, 5), 1);
    }

    #[test]
    fn test_service_discount_applies_after_quantity() {
        let now = Utc::now();
        let mut venue = svc(ServiceCategory::WeddingVenues);
        venue.discount_percent = Some(10.0);
        assert_eq!(service_price(1000.0, &venue, 2, now), 1800.0);
    }
}
