use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum DiscountCodes {
    Table,
    Id,
    Code,
    PercentOff,
    Active,
    ExpiresAt,
    StripeCouponId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscountCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscountCodes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::Code)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::PercentOff)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::StripeCouponId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discount_codes_active_expires")
                    .table(DiscountCodes::Table)
                    .col(DiscountCodes::Active)
                    .col(DiscountCodes::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DiscountCodes::Table)
                    .to_owned(),
            )
            .await
    }
}
