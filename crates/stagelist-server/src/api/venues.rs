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
use crate::forms::{FormFields, VenueForm};
use crate::views::{SearchPage, VenueFormPage, VenuePage, VenuesPage};
use stagelist_db::entities::venue;
use stagelist_db::mutations::{self, MutationError, VenueFields};
use stagelist_db::{queries, AppState};

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let areas = queries::venue_areas(&state.db, Utc::now()).await?;
    render(&VenuesPage {
        flashes: flashes.into_vec(),
        areas,
    })
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    Form(body): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let results = queries::search_venues(&state.db, &body.search_term, Utc::now()).await?;
    render(&SearchPage {
        flashes: flashes.into_vec(),
        kind: "venues",
        search_term: body.search_term,
        count: results.count,
        results: results.data,
    })
}

/// GET /venues/{id}
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let detail = queries::venue_detail(&state.db, id, Utc::now())
        .await?
        .ok_or(PageError::NotFound("venue"))?;
    render(&VenuePage::new(flashes.into_vec(), detail.venue, detail.shows))
}

/// GET /venues/create
pub async fn create_venue_form(flashes: Flashes) -> Result<Html<String>, PageError> {
    let mut page = VenueFormPage::new(
        "List a new venue",
        "/venues/create".to_string(),
        VenueForm::default(),
    );
    page.flashes = flashes.into_vec();
    render(&page)
}

/// POST /venues/create
pub async fn create_venue_submission(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    RawForm(body): RawForm,
) -> Result<Html<String>, PageError> {
    let form = VenueForm::from_fields(&FormFields::parse(&body));
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(errors = ?errors.0, "venue form rejected");
            let mut page =
                VenueFormPage::new("List a new venue", "/venues/create".to_string(), form);
            page.errors = errors.messages();
            page.flashes = flashes.with(errors.flash_message());
            return render(&page);
        }
    };

    let name = fields.name.clone();
    let message = match mutations::create_venue(&state.db, fields).await {
        Ok(_) => format!("Venue {name} was successfully listed!"),
        Err(e) => {
            tracing::error!("failed to list venue {name}: {e}");
            format!("An error occurred. Venue {name} could not be listed.")
        }
    };

    render(&home::home_page(&state, flashes.with(message)).await)
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let venue = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound("venue"))?;

    let mut page = VenueFormPage::new(
        "Edit venue",
        format!("/venues/{id}/edit"),
        VenueForm::from(VenueFields::from(venue)),
    );
    page.flashes = flashes.into_vec();
    render(&page)
}

/// POST /venues/{id}/edit
pub async fn edit_venue_submission(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
    RawForm(body): RawForm,
) -> Result<Response, PageError> {
    let detail_path = format!("/venues/{id}");
    match venue::Entity::find_by_id(id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(PageError::NotFound("venue")),
        Err(e) => {
            tracing::error!(venue_id = id, "failed to load venue for update: {e}");
            return Ok(flash::redirect(&detail_path, "something went wrong!"));
        }
    }

    let form = VenueForm::from_fields(&FormFields::parse(&body));
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let mut page = VenueFormPage::new("Edit venue", format!("/venues/{id}/edit"), form);
            page.errors = errors.messages();
            page.flashes = flashes.with(errors.flash_message());
            return Ok(render(&page)?.into_response());
        }
    };

    match mutations::update_venue(&state.db, id, fields).await {
        Ok(_) => Ok(flash::redirect(&detail_path, "updated successfully")),
        Err(MutationError::NotFound(what)) => Err(PageError::NotFound(what)),
        Err(e) => {
            tracing::error!(venue_id = id, "failed to update venue: {e}");
            Ok(flash::redirect(&detail_path, "something went wrong!"))
        }
    }
}

/// POST /venues/{id} and DELETE /venues/{id}
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Response {
    match mutations::delete_venue(&state.db, id).await {
        Ok(()) => flash::redirect("/", "successfully deleted"),
        Err(e) => {
            tracing::warn!(venue_id = id, "failed to delete venue: {e}");
            flash::redirect("/", "something went wrong. venue could not be deleted")
        }
    }
}
