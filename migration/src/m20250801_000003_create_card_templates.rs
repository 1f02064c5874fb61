use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250801_000001_create_users::User;
use super::m20250801_000002_create_services::ResourceStatus;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(CardType::Enum)
                    .values([
                        CardType::Simple,
                        CardType::Editable,
                        CardType::Static,
                        CardType::NonEditable,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CardTemplate::Table)
                    .if_not_exists()
                    .col(uuid(CardTemplate::Id).primary_key())
                    .col(uuid(CardTemplate::VendorId).not_null())
                    .col(
                        ColumnDef::new(CardTemplate::Status)
                            .custom(ResourceStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len(CardTemplate::Name, 200).not_null())
                    .col(
                        ColumnDef::new(CardTemplate::CardType)
                            .custom(CardType::Enum)
                            .not_null(),
                    )
                    .col(double(CardTemplate::PricePerCard).not_null())
                    .col(integer(CardTemplate::QuantityAvailable).not_null())
                    .col(string_len(CardTemplate::City, 100).not_null())
                    .col(text_null(CardTemplate::Description))
                    .col(double_null(CardTemplate::DiscountPercent))
                    .col(timestamp_with_time_zone_null(CardTemplate::DiscountExpiry))
                    .col(double(CardTemplate::AvgRating).not_null().default(0.0))
                    .col(integer(CardTemplate::ReviewCount).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(CardTemplate::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_template_vendor")
                            .from(CardTemplate::Table, CardTemplate::VendorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CardTemplate::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(CardType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CardTemplate {
    Table,
    Id,
    VendorId,
    Status,
    Name,
    CardType,
    PricePerCard,
    QuantityAvailable,
    City,
    Description,
    DiscountPercent,
    DiscountExpiry,
    AvgRating,
    ReviewCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum CardType {
    #[sea_orm(iden = "card_type")]
    Enum,
    #[sea_orm(iden = "simple")]
    Simple,
    #[sea_orm(iden = "editable")]
    Editable,
    #[sea_orm(iden = "static")]
    Static,
    #[sea_orm(iden = "non_editable")]
    NonEditable,
}
