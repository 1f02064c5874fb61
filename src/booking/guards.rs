//! Admission checks shared by direct booking and estimation conversion.
//! Pure predicates; the handlers supply the rows.

use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};

/// Vendors never book their own listings.
pub fn is_self_booking(vendor_id: Uuid, booking_user: Uuid) -> bool {
    vendor_id == booking_user
}

/// True when the given prior bookings already hold an open one (pending or
/// confirmed) for this service on this date. Canceled and completed bookings
/// do not block a rebooking. Callers pass bookings that existed before the
/// current operation began, so lines created within one conversion never
/// collide with each other.
pub fn has_open_booking(
    prior: &[booking::Model],
    service_id: Uuid,
    scheduled_at: DateTimeWithTimeZone,
) -> bool {
    prior.iter().any(|b| {
        b.service_id == Some(service_id)
            && b.scheduled_at == scheduled_at
            && matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn booked(
        service: u8,
        status: BookingStatus,
        scheduled_at: DateTimeWithTimeZone,
    ) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::from_u128(1),
            vendor_id: Uuid::from_u128(2),
            service_id: Some(Uuid::from_u128(service as u128)),
            package_id: Some(Uuid::new_v4()),
            card_template_id: None,
            status,
            scheduled_at,
            event_date: None,
            completed_at: None,
            price: 1000.0,
            quantity: 1,
            review_allowed: false,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_vendor_cannot_book_own_listing() {
        let vendor = Uuid::from_u128(7);
        assert!(is_self_booking(vendor, vendor));
        assert!(!is_self_booking(vendor, Uuid::from_u128(8)));
    }

    #[test]
    fn test_open_booking_blocks_same_service_and_date() {
        let at = Utc::now().into();
        let prior = vec![booked(1, BookingStatus::Pending, at)];
        assert!(has_open_booking(&prior, Uuid::from_u128(1), at));

        let confirmed = vec![booked(1, BookingStatus::Confirmed, at)];
        assert!(has_open_booking(&confirmed, Uuid::from_u128(1), at));
    }

    #[test]
    fn test_terminal_bookings_allow_rebooking() {
        let at = Utc::now().into();
        let prior = vec![
            booked(1, BookingStatus::Canceled, at),
            booked(1, BookingStatus::Completed, at),
        ];
        assert!(!has_open_booking(&prior, Uuid::from_u128(1), at));
    }

    #[test]
    fn test_other_service_or_date_does_not_block() {
        let at: DateTimeWithTimeZone = Utc::now().into();
        let later = at + Duration::days(1);
        let prior = vec![booked(1, BookingStatus::Pending, at)];
        assert!(!has_open_booking(&prior, Uuid::from_u128(2), at));
        assert!(!has_open_booking(&prior, Uuid::from_u128(1), later));
    }

    #[test]
    fn test_check_is_independent_of_current_batch() {
        // Two lines for the same service (different packages) are checked
        // against the same pre-existing set; neither blocks the other.
        let at = Utc::now().into();
        let prior: Vec<booking::Model> = Vec::new();
        assert!(!has_open_booking(&prior, Uuid::from_u128(1), at));
        assert!(!has_open_booking(&prior, Uuid::from_u128(1), at));
    }
}
