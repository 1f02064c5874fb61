//! The estimation → booking core: atomic inventory reservation, pricing,
//! the booking status state machine, and estimation aggregation/conversion.

pub mod conversion;
pub mod estimation;
pub mod guards;
pub mod ledger;
pub mod lifecycle;
pub mod pricing;
