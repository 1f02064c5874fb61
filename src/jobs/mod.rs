//! Background jobs. Currently one: the daily sweep that auto-completes
//! confirmed bookings whose event date has passed.

use std::time::Duration;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::booking::{self, BookingStatus};

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Confirmed bookings past their event date move to completed with reviews
/// allowed. Resources stay consumed; completion is not a cancellation.
pub fn spawn_completion_sweep(db: DatabaseConnection) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            let result = booking::Entity::update_many()
                .col_expr(
                    booking::Column::Status,
                    Expr::value(BookingStatus::Completed),
                )
                .col_expr(booking::Column::CompletedAt, Expr::value(Some(now)))
                .col_expr(booking::Column::ReviewAllowed, Expr::value(true))
                .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
                .filter(booking::Column::EventDate.lt(now))
                .exec(&db)
                .await;
            match result {
                Ok(res) if res.rows_affected > 0 => {
                    tracing::info!(count = res.rows_affected, "Auto-completed past bookings");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Completion sweep failed");
                }
            }
        }
    });
}
