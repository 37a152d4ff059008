use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: String,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: String,
    pub seeking_venue: bool,
    #[sea_orm(column_type = "Text")]
    pub seeking_description: String,
}

impl Model {
    /// Genres are persisted as a single comma-separated column.
    pub fn genre_list(&self) -> Vec<&str> {
        split_genres(&self.genres)
    }
}

pub fn split_genres(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect()
}

pub fn join_genres<S: AsRef<str>>(genres: &[S]) -> String {
    genres
        .iter()
        .map(|g| g.as_ref().trim())
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join(",")
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

impl ActiveModelBehavior for ActiveModel {}
