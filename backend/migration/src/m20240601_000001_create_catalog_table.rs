use crate::{index, index_name};
use encore_core::model::{artist, venue};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(venue::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(venue::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(venue::Column::Name).string().not_null())
                    .col(ColumnDef::new(venue::Column::Genres).json().not_null())
                    .col(
                        ColumnDef::new(venue::Column::Address)
                            .string_len(120)
                            .not_null(),
                    )
                    .col(ColumnDef::new(venue::Column::City).string_len(120).not_null())
                    .col(ColumnDef::new(venue::Column::State).string_len(120).not_null())
                    .col(ColumnDef::new(venue::Column::Phone).string_len(120).not_null())
                    .col(ColumnDef::new(venue::Column::Website).string_len(120))
                    .col(ColumnDef::new(venue::Column::FacebookLink).string_len(120))
                    .col(
                        ColumnDef::new(venue::Column::SeekingTalent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(venue::Column::SeekingDescription).string_len(500))
                    .col(
                        ColumnDef::new(venue::Column::ImageLink)
                            .string_len(500)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index!(venue::Entity, venue::Column::Name))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(artist::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(artist::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(artist::Column::Name).string().not_null())
                    .col(ColumnDef::new(artist::Column::Genres).json().not_null())
                    .col(ColumnDef::new(artist::Column::City).string_len(120).not_null())
                    .col(ColumnDef::new(artist::Column::State).string_len(120).not_null())
                    .col(ColumnDef::new(artist::Column::Phone).string_len(120).not_null())
                    .col(ColumnDef::new(artist::Column::Website).string_len(120))
                    .col(ColumnDef::new(artist::Column::FacebookLink).string_len(120))
                    .col(
                        ColumnDef::new(artist::Column::SeekingVenue)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(artist::Column::SeekingDescription).string_len(500))
                    .col(
                        ColumnDef::new(artist::Column::ImageLink)
                            .string_len(500)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(index!(artist::Entity, artist::Column::Name))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(artist::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(venue::Entity).to_owned())
            .await?;
        Ok(())
    }
}
