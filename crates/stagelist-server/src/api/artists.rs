use axum::{
    extract::{RawForm, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Utc;
use sea_orm::EntityTrait;
use std::sync::Arc;

use super::{home, render, RecordId, SearchForm};
use crate::error::PageError;
use crate::flash::{self, Flashes};
use crate::forms::{ArtistForm, FormFields};
use crate::views::{ArtistFormPage, ArtistPage, ArtistsPage, SearchPage};
use stagelist_db::entities::artist;
use stagelist_db::mutations::{self, ArtistFields, MutationError};
use stagelist_db::queries::{self, Choice};
use stagelist_db::AppState;

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let artists = queries::list_artists(&state.db)
        .await?
        .into_iter()
        .map(|a| Choice {
            id: a.id,
            name: a.name,
        })
        .collect();
    render(&ArtistsPage {
        flashes: flashes.into_vec(),
        artists,
    })
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    Form(body): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let results = queries::search_artists(&state.db, &body.search_term, Utc::now()).await?;
    render(&SearchPage {
        flashes: flashes.into_vec(),
        kind: "artists",
        search_term: body.search_term,
        count: results.count,
        results: results.data,
    })
}

/// GET /artists/{id}
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let detail = queries::artist_detail(&state.db, id, Utc::now())
        .await?
        .ok_or(PageError::NotFound("artist"))?;
    render(&ArtistPage::new(flashes.into_vec(), detail.artist, detail.shows))
}

/// GET /artists/create
pub async fn create_artist_form(flashes: Flashes) -> Result<Html<String>, PageError> {
    let mut page = ArtistFormPage::new(
        "List a new artist",
        "/artists/create".to_string(),
        ArtistForm::default(),
    );
    page.flashes = flashes.into_vec();
    render(&page)
}

/// POST /artists/create
pub async fn create_artist_submission(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    RawForm(body): RawForm,
) -> Result<Html<String>, PageError> {
    let form = ArtistForm::from_fields(&FormFields::parse(&body));
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(errors = ?errors.0, "artist form rejected");
            let mut page =
                ArtistFormPage::new("List a new artist", "/artists/create".to_string(), form);
            page.errors = errors.messages();
            page.flashes = flashes.with(errors.flash_message());
            return render(&page);
        }
    };

    let name = fields.name.clone();
    let message = match mutations::create_artist(&state.db, fields).await {
        Ok(_) => format!("Artist {name} was successfully listed!"),
        Err(e) => {
            tracing::error!("failed to list artist {name}: {e}");
            format!("An error occurred. Artist {name} could not be listed.")
        }
    };

    render(&home::home_page(&state, flashes.with(message)).await)
}

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let artist = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound("artist"))?;

    let mut page = ArtistFormPage::new(
        "Edit artist",
        format!("/artists/{id}/edit"),
        ArtistForm::from(ArtistFields::from(artist)),
    );
    page.flashes = flashes.into_vec();
    render(&page)
}

/// POST /artists/{id}/edit
pub async fn edit_artist_submission(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
    RawForm(body): RawForm,
) -> Result<Response, PageError> {
    let detail_path = format!("/artists/{id}");
    match artist::Entity::find_by_id(id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(PageError::NotFound("artist")),
        Err(e) => {
            tracing::error!(artist_id = id, "failed to load artist for update: {e}");
            return Ok(flash::redirect(&detail_path, "something went wrong!"));
        }
    }

    let form = ArtistForm::from_fields(&FormFields::parse(&body));
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let mut page = ArtistFormPage::new("Edit artist", format!("/artists/{id}/edit"), form);
            page.errors = errors.messages();
            page.flashes = flashes.with(errors.flash_message());
            return Ok(render(&page)?.into_response());
        }
    };

    match mutations::update_artist(&state.db, id, fields).await {
        Ok(_) => Ok(flash::redirect(&detail_path, "updated successfully")),
        Err(MutationError::NotFound(what)) => Err(PageError::NotFound(what)),
        Err(e) => {
            tracing::error!(artist_id = id, "failed to update artist: {e}");
            Ok(flash::redirect(&detail_path, "something went wrong!"))
        }
    }
}

/// POST /artists/{id} and DELETE /artists/{id}
pub async fn delete_artist(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Response {
    match mutations::delete_artist(&state.db, id).await {
        Ok(()) => flash::redirect("/", "successfully deleted"),
        Err(e) => {
            tracing::warn!(artist_id = id, "failed to delete artist: {e}");
            flash::redirect("/", "something went wrong. artist could not be deleted")
        }
    }
}
