use crate::entity_iden::EntityIden;
use model::entities::achievement;
use model::entities::prelude::*;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create achievements table
        manager
            .create_table(
                Table::create()
                    .table(Achievement::table())
                    .if_not_exists()
                    .col(pk_auto(Achievement::column(achievement::Column::Id)))
                    .col(string(Achievement::column(achievement::Column::Title)))
                    .col(string_null(Achievement::column(
                        achievement::Column::Description,
                    )))
                    .col(string_null(Achievement::column(
                        achievement::Column::ImageUrl,
                    )))
                    .col(date(Achievement::column(achievement::Column::AchievedOn)))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop the achievements table
        manager
            .drop_table(Table::drop().table(Achievement::table()).to_owned())
            .await?;

        Ok(())
    }
}
