use crate::{index, index_name};
use encore_core::model::{artist, show, venue};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(show::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(show::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(show::Column::VenueId).big_integer().not_null())
                    .col(ColumnDef::new(show::Column::ArtistId).big_integer().not_null())
                    .col(
                        ColumnDef::new(show::Column::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-show-venue_id")
                            .from(show::Entity, show::Column::VenueId)
                            .to(venue::Entity, venue::Column::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-show-artist_id")
                            .from(show::Entity, show::Column::ArtistId)
                            .to(artist::Entity, artist::Column::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(index!(show::Entity, show::Column::VenueId))
            .await?;
        manager
            .create_index(index!(show::Entity, show::Column::ArtistId))
            .await?;
        manager
            .create_index(index!(show::Entity, show::Column::StartTime))
            .await?;
        log::info!("catalog schema ready");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(show::Entity).to_owned())
            .await?;
        Ok(())
    }
}
