//! Create `food` table.
//! The image reference is embedded as two required columns; a row never exists without both.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Food::Table)
                    .if_not_exists()
                    .col(uuid(Food::Id).primary_key())
                    .col(string_len(Food::Name, 255).not_null())
                    .col(text(Food::Description).not_null())
                    .col(double(Food::Price).not_null())
                    .col(string_len(Food::Category, 128).not_null())
                    .col(string_len(Food::ImageUrl, 1024).not_null())
                    .col(string_len(Food::ImagePublicId, 512).not_null())
                    .col(timestamp_with_time_zone(Food::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Food::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Food {
    Table,
    Id,
    Name,
    Description,
    Price,
    Category,
    ImageUrl,
    ImagePublicId,
    CreatedAt,
}
