//! The booking status state machine. One transition table, consumed by every
//! entry point: user cancel, vendor status update, admin cancel, and the
//! daily completion sweep.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use crate::booking::ledger;
use crate::entities::booking::{self, BookingStatus};
use crate::error::{AppError, AppResult};

/// `pending → {confirmed, canceled}`, `confirmed → {completed, canceled}`;
/// `completed` and `canceled` are terminal.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Canceled) | (Confirmed, Completed) | (Confirmed, Canceled)
    )
}

/// Move a booking to a new status, applying the transition's side effects
/// inside the caller's transaction:
/// - entering `canceled` releases the booking's reservation,
/// - entering `confirmed` sets `event_date` from `scheduled_at` if unset,
/// - entering `completed` stamps `completed_at` and allows reviews.
///
/// Authorization stays with the caller: vendors transition only their own
/// bookings, and users may cancel pending bookings only.
pub async fn transition<C: ConnectionTrait>(
    conn: &C,
    booked: booking::Model,
    to: BookingStatus,
) -> AppResult<booking::Model> {
    if !can_transition(booked.status, to) {
        return Err(AppError::Conflict(format!(
            "Invalid status transition from {} to {}",
            booked.status.as_str(),
            to.as_str()
        )));
    }

    if to == BookingStatus::Canceled {
        ledger::release(conn, &booked).await?;
    }

    let mut active: booking::ActiveModel = booked.clone().into();
    active.status = Set(to);

    match to {
        BookingStatus::Confirmed => {
            if booked.event_date.is_none() {
                active.event_date = Set(Some(booked.scheduled_at));
            }
        }
        BookingStatus::Completed => {
            if booked.completed_at.is_none() {
                active.completed_at = Set(Some(Utc::now().into()));
                active.review_allowed = Set(true);
            }
        }
        _ => {}
    }

    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_pending_transitions() {
        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Canceled));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Pending, Pending));
    }

    #[test]
    fn test_confirmed_transitions() {
        assert!(can_transition(Confirmed, Completed));
        assert!(can_transition(Confirmed, Canceled));
        assert!(!can_transition(Confirmed, Pending));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in [Pending, Confirmed, Completed, Canceled] {
            assert!(!can_transition(Completed, to));
            assert!(!can_transition(Canceled, to));
        }
    }
}
