use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::render;
use crate::error::PageError;
use crate::flash::Flashes;
use crate::views::HomePage;
use axum::response::Html;
use stagelist_db::{queries, AppState};

const RECENT_LISTINGS: u64 = 10;

#[derive(Debug, Serialize)]
pub struct ApiStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Home page with the given flashes. A failing store only hides the
/// recent listings; the flashes still need to reach the user.
pub async fn home_page(state: &AppState, flashes: Vec<String>) -> HomePage {
    let (recent_venues, recent_artists) =
        match queries::recent_listings(&state.db, RECENT_LISTINGS).await {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!("failed to load recent listings: {e}");
                Default::default()
            }
        };
    HomePage {
        flashes,
        recent_venues,
        recent_artists,
    }
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    flashes: Flashes,
) -> Result<Html<String>, PageError> {
    render(&home_page(&state, flashes.into_vec()).await)
}

/// Fallback for unknown routes.
pub async fn not_found() -> PageError {
    PageError::NotFound("page")
}

/// GET /healthz
pub async fn healthz() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
