use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Products::Name, 255))
                    .col(text(Products::Description).default(""))
                    .col(big_integer(Products::Price))
                    .col(integer(Products::Stock).default(0))
                    .col(string_len(Products::ImageUrl, 255).default(""))
                    .col(text_null(Products::Gallery))
                    .col(string_len(Products::Category, 100).default(""))
                    .col(boolean(Products::IsOnSale).default(true))
                    .col(text_null(Products::Attributes))
                    .col(float(Products::Rating).default(5.0))
                    .col(integer(Products::SalesCount).default(0))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Products::DeletedAt))
                    .to_owned(),
            )
            .await?;

        // Storage-level guards for the stock and pricing invariants
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE products
                    ADD CONSTRAINT products_stock_non_negative CHECK (stock >= 0),
                    ADD CONSTRAINT products_price_non_negative CHECK (price >= 0),
                    ADD CONSTRAINT products_sales_count_non_negative CHECK (sales_count >= 0)
                "#,
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_deleted_at")
                    .table(Products::Table)
                    .col(Products::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Stock,
    ImageUrl,
    Gallery,
    Category,
    IsOnSale,
    Attributes,
    Rating,
    SalesCount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
