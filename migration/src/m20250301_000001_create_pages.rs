use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Pages {
    Table,
    Id,
    SessionId,
    CoupleNames,
    Message,
    StartDate,
    Theme,
    Images,
    VideoUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Pages::SessionId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Pages::CoupleNames).string().null())
                    .col(ColumnDef::new(Pages::Message).text().null())
                    .col(ColumnDef::new(Pages::StartDate).string_len(40).null())
                    .col(
                        ColumnDef::new(Pages::Theme)
                            .string_len(16)
                            .not_null()
                            .default("light"),
                    )
                    // base64 data URLs, already capped per image by the service
                    .col(
                        ColumnDef::new(Pages::Images)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Pages::VideoUrl).text().null())
                    .col(
                        ColumnDef::new(Pages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Pages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Pages::Table).to_owned())
            .await
    }
}
