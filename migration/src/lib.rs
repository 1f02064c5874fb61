pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_users;
mod m20250801_000002_create_services;
mod m20250801_000003_create_card_templates;
mod m20250801_000004_create_bookings;
mod m20250801_000005_create_estimations;
mod m20250801_000006_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users::Migration),
            Box::new(m20250801_000002_create_services::Migration),
            Box::new(m20250801_000003_create_card_templates::Migration),
            Box::new(m20250801_000004_create_bookings::Migration),
            Box::new(m20250801_000005_create_estimations::Migration),
            Box::new(m20250801_000006_create_reviews::Migration),
        ]
    }
}
