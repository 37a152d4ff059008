//! Write side: create, update and delete operations. Deletes remove the
//! owned shows in the same transaction as their venue or artist.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use thiserror::Error;

use crate::entities::{artist, show, venue};

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Validated venue fields, as submitted by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueFields {
    fn apply(self, model: &mut venue::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.address = Set(self.address);
        model.phone = Set(self.phone);
        model.image_link = Set(self.image_link);
        model.facebook_link = Set(self.facebook_link);
        model.website_link = Set(self.website_link);
        model.seeking_talent = Set(self.seeking_talent);
        model.seeking_description = Set(self.seeking_description);
    }
}

impl From<venue::Model> for VenueFields {
    fn from(v: venue::Model) -> Self {
        Self {
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            image_link: v.image_link,
            facebook_link: v.facebook_link,
            website_link: v.website_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

/// Validated artist fields, as submitted by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistFields {
    fn apply(self, model: &mut artist::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(self.phone);
        model.genres = Set(artist::join_genres(&self.genres));
        model.image_link = Set(self.image_link);
        model.facebook_link = Set(self.facebook_link);
        model.website_link = Set(self.website_link);
        model.seeking_venue = Set(self.seeking_venue);
        model.seeking_description = Set(self.seeking_description);
    }
}

impl From<artist::Model> for ArtistFields {
    fn from(a: artist::Model) -> Self {
        Self {
            genres: a.genre_list().into_iter().map(str::to_string).collect(),
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            image_link: a.image_link,
            facebook_link: a.facebook_link,
            website_link: a.website_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

pub async fn create_venue<C: ConnectionTrait>(
    db: &C,
    fields: VenueFields,
) -> Result<venue::Model, DbErr> {
    let mut model = <venue::ActiveModel as Default>::default();
    fields.apply(&mut model);
    let created = model.insert(db).await?;
    tracing::info!(venue_id = created.id, name = %created.name, "venue listed");
    Ok(created)
}

pub async fn update_venue<C: ConnectionTrait>(
    db: &C,
    id: i32,
    fields: VenueFields,
) -> Result<venue::Model, MutationError> {
    let existing = venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(MutationError::NotFound("venue"))?;
    let mut model: venue::ActiveModel = existing.into();
    fields.apply(&mut model);
    Ok(model.update(db).await?)
}

/// Delete a venue and every show it hosts.
pub async fn delete_venue<C: TransactionTrait>(db: &C, id: i32) -> Result<(), MutationError> {
    let txn = db.begin().await?;

    let removed_shows = show::Entity::delete_many()
        .filter(show::Column::VenueId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let deleted = venue::Entity::delete_by_id(id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        // Dropping the transaction rolls it back
        return Err(MutationError::NotFound("venue"));
    }

    txn.commit().await?;
    tracing::info!(venue_id = id, removed_shows, "venue deleted");
    Ok(())
}

pub async fn create_artist<C: ConnectionTrait>(
    db: &C,
    fields: ArtistFields,
) -> Result<artist::Model, DbErr> {
    let mut model = <artist::ActiveModel as Default>::default();
    fields.apply(&mut model);
    let created = model.insert(db).await?;
    tracing::info!(artist_id = created.id, name = %created.name, "artist listed");
    Ok(created)
}

pub async fn update_artist<C: ConnectionTrait>(
    db: &C,
    id: i32,
    fields: ArtistFields,
) -> Result<artist::Model, MutationError> {
    let existing = artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(MutationError::NotFound("artist"))?;
    let mut model: artist::ActiveModel = existing.into();
    fields.apply(&mut model);
    Ok(model.update(db).await?)
}

/// Delete an artist and every show they perform in.
pub async fn delete_artist<C: TransactionTrait>(db: &C, id: i32) -> Result<(), MutationError> {
    let txn = db.begin().await?;

    let removed_shows = show::Entity::delete_many()
        .filter(show::Column::ArtistId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let deleted = artist::Entity::delete_by_id(id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(MutationError::NotFound("artist"));
    }

    txn.commit().await?;
    tracing::info!(artist_id = id, removed_shows, "artist deleted");
    Ok(())
}

/// Insert a show after checking that both its venue and artist exist.
pub async fn create_show<C: TransactionTrait>(
    db: &C,
    venue_id: i32,
    artist_id: i32,
    start_time: DateTime<Utc>,
) -> Result<show::Model, MutationError> {
    let txn = db.begin().await?;

    venue::Entity::find_by_id(venue_id)
        .one(&txn)
        .await?
        .ok_or(MutationError::NotFound("venue"))?;
    artist::Entity::find_by_id(artist_id)
        .one(&txn)
        .await?
        .ok_or(MutationError::NotFound("artist"))?;

    let created = show::ActiveModel {
        start_time: Set(start_time.fixed_offset()),
        venue_id: Set(venue_id),
        artist_id: Set(artist_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(show_id = created.id, venue_id, artist_id, "show listed");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_fields_from_model_splits_genres() {
        let model = artist::Model {
            id: 7,
            name: "The Wild Sax Band".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: "432-325-5432".into(),
            genres: "Jazz,Classical".into(),
            image_link: None,
            facebook_link: None,
            website_link: String::new(),
            seeking_venue: false,
            seeking_description: String::new(),
        };
        let fields = ArtistFields::from(model);
        assert_eq!(fields.genres, vec!["Jazz".to_string(), "Classical".to_string()]);
        assert_eq!(fields.name, "The Wild Sax Band");
    }

    #[test]
    fn test_mutation_error_display() {
        assert_eq!(MutationError::NotFound("venue").to_string(), "venue not found");
    }
}
