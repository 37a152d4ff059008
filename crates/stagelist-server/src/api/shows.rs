use axum::{
    extract::{RawForm, State},
    response::Html,
    Form,
};
use chrono::Utc;
use std::sync::Arc;

use super::{home, render, RecordId, SearchForm};
use crate::error::PageError;
use crate::flash::Flashes;
use crate::forms::{FormFields, ShowForm};
use crate::views::{choice_options, ShowFormPage, ShowPage, ShowView, ShowsPage};
use stagelist_db::mutations::{self, MutationError};
use stagelist_db::{queries, AppState};

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let shows = queries::list_shows(&state.db).await?;
    render(&ShowsPage {
        flashes: flashes.into_vec(),
        searched: false,
        search_term: String::new(),
        shows: shows.into_iter().map(ShowView::from).collect(),
    })
}

/// POST /shows/search
pub async fn search_shows(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    Form(body): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let results = queries::search_shows(&state.db, &body.search_term).await?;
    render(&ShowsPage {
        flashes: flashes.into_vec(),
        searched: true,
        search_term: body.search_term,
        shows: results.data.into_iter().map(ShowView::from).collect(),
    })
}

/// GET /shows/{id}
pub async fn show_detail(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let show = queries::show_detail(&state.db, id)
        .await?
        .ok_or(PageError::NotFound("show"))?;
    render(&ShowPage {
        flashes: flashes.into_vec(),
        show: show.into(),
    })
}

async fn show_form_page(
    state: &AppState,
    form: ShowForm,
    flashes: Vec<String>,
    errors: Vec<String>,
) -> Result<ShowFormPage, PageError> {
    let choices = queries::show_choices(&state.db).await?;
    Ok(ShowFormPage {
        flashes,
        errors,
        venues: choice_options(&choices.venues, &form.venue_id),
        artists: choice_options(&choices.artists, &form.artist_id),
        form,
    })
}

/// GET /shows/create
pub async fn create_show_form(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    let page = show_form_page(
        &state,
        ShowForm::starting_at(Utc::now()),
        flashes.into_vec(),
        Vec::new(),
    )
    .await?;
    render(&page)
}

/// POST /shows/create
pub async fn create_show_submission(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
    RawForm(body): RawForm,
) -> Result<Html<String>, PageError> {
    let form = ShowForm::from_fields(&FormFields::parse(&body));
    let new_show = match form.validate() {
        Ok(new_show) => new_show,
        Err(errors) => {
            tracing::debug!(errors = ?errors.0, "show form rejected");
            let messages = errors.messages();
            let page = show_form_page(
                &state,
                form,
                flashes.with(errors.flash_message()),
                messages,
            )
            .await?;
            return render(&page);
        }
    };

    let message = match mutations::create_show(
        &state.db,
        new_show.venue_id,
        new_show.artist_id,
        new_show.start_time,
    )
    .await
    {
        Ok(_) => "Show was successfully listed!",
        Err(MutationError::NotFound(what)) => {
            tracing::warn!(
                venue_id = new_show.venue_id,
                artist_id = new_show.artist_id,
                "show references a missing {what}"
            );
            "An error occurred. Show could not be listed."
        }
        Err(e) => {
            tracing::error!("failed to list show: {e}");
            "An error occurred. Show could not be listed."
        }
    };

    render(&home::home_page(&state, flashes.with(message)).await)
}
