use crate::db::values::StringVec;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Json")]
    pub genres: StringVec,
    pub city: String,
    pub state: String,
    pub phone: String,
    #[sea_orm(nullable)]
    pub website: Option<String>,
    #[sea_orm(nullable)]
    pub facebook_link: Option<String>,
    #[sea_orm(default_value = false)]
    pub seeking_venue: bool,
    #[sea_orm(nullable)]
    pub seeking_description: Option<String>,
    pub image_link: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::show::Entity")]
    Show,
}

impl Related<super::show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        super::show::Relation::Venue.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::show::Relation::Artist.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
