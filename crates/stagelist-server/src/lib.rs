use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use stagelist_db::AppState;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod views;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let venues = Router::new()
        .route("/venues", get(api::venues::list_venues))
        .route("/venues/search", post(api::venues::search_venues))
        .route(
            "/venues/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue_submission),
        )
        .route(
            "/venues/{id}",
            get(api::venues::show_venue)
                .post(api::venues::delete_venue)
                .delete(api::venues::delete_venue),
        )
        .route(
            "/venues/{id}/edit",
            get(api::venues::edit_venue_form).post(api::venues::edit_venue_submission),
        );

    let artists = Router::new()
        .route("/artists", get(api::artists::list_artists))
        .route("/artists/search", post(api::artists::search_artists))
        .route(
            "/artists/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist_submission),
        )
        .route(
            "/artists/{id}",
            get(api::artists::show_artist)
                .post(api::artists::delete_artist)
                .delete(api::artists::delete_artist),
        )
        .route(
            "/artists/{id}/edit",
            get(api::artists::edit_artist_form).post(api::artists::edit_artist_submission),
        );

    let shows = Router::new()
        .route("/shows", get(api::shows::list_shows))
        .route("/shows/search", post(api::shows::search_shows))
        .route("/shows/{id}", get(api::shows::show_detail))
        .route(
            "/shows/create",
            get(api::shows::create_show_form).post(api::shows::create_show_submission),
        );

    Router::new()
        .route("/", get(api::home::index))
        .route("/healthz", get(api::home::healthz))
        .merge(venues)
        .merge(artists)
        .merge(shows)
        .fallback(api::home::not_found)
        .layer(middleware::from_fn(flash::clear_consumed))
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
