use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(EstimationStatus::Enum)
                    .values([EstimationStatus::Active, EstimationStatus::Completed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Estimation::Table)
                    .if_not_exists()
                    .col(uuid(Estimation::Id).primary_key())
                    .col(uuid(Estimation::UserId).not_null())
                    .col(json_binary(Estimation::Services).not_null())
                    .col(json_binary(Estimation::Cards).not_null())
                    .col(double(Estimation::TotalCost).not_null().default(0.0))
                    .col(
                        ColumnDef::new(Estimation::Status)
                            .custom(EstimationStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Estimation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Estimation::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_estimation_user")
                            .from(Estimation::Table, Estimation::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Estimation::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EstimationStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Estimation {
    Table,
    Id,
    UserId,
    Services,
    Cards,
    TotalCost,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum EstimationStatus {
    #[sea_orm(iden = "estimation_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "completed")]
    Completed,
}
