use sea_orm_migration::prelude::*;

use crate::m20250701_000001_create_subscriptions::Subscriptions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Filter columns shared by list and summary
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_user_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_service_name")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::ServiceName)
                    .to_owned(),
            )
            .await?;

        // List ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_created_at")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Summary range predicate
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_period")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::StartDate)
                    .col(Subscriptions::EndDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_subscriptions_period",
            "idx_subscriptions_created_at",
            "idx_subscriptions_service_name",
            "idx_subscriptions_user_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Subscriptions::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}
