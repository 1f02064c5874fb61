pub mod booking;
pub mod card_template;
pub mod estimation;
pub mod pricing_package;
pub mod review;
pub mod service;
pub mod service_slot;
pub mod user;
