use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Food: listing is ordered by insertion time
        manager
            .create_index(
                Index::create()
                    .name("idx_food_created_at")
                    .table(Food::Table)
                    .col(Food::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Food: category lookups from the storefront
        manager
            .create_index(
                Index::create()
                    .name("idx_food_category")
                    .table(Food::Table)
                    .col(Food::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_food_category").table(Food::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_food_created_at").table(Food::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Food { Table, CreatedAt, Category }
