pub use sea_orm_migration::{prelude::*, Migration, MigrationStatus};

mod m20240601_000001_create_catalog_table;
mod m20240601_000002_create_show_table;

pub struct Migrator;

#[macro_export]
macro_rules! index_name {
    ($entity:path, $($column:path),+) => {
        concat!(
            "idx-",
            stringify!($entity), "-",
            $(stringify!($column), "-"),+
        ).trim_end_matches('-')
    };
}

#[macro_export]
macro_rules! index {
    ($entity:path, $($column:path),+) => {
        sea_query::Index::create()
            .name(index_name!($entity, $($column),+))
            .table($entity)
            $(.col($column))+
            .if_not_exists()
            .to_owned()
    };
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_table::Migration),
            Box::new(m20240601_000002_create_show_table::Migration),
        ]
    }
}
