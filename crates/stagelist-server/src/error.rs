use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::DbErr;
use stagelist_db::mutations::MutationError;
use thiserror::Error;

use crate::views::{NotFoundPage, ServerErrorPage};

/// Failures that end a request with an error page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),
}

impl From<MutationError> for PageError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::NotFound(what) => PageError::NotFound(what),
            MutationError::Database(e) => PageError::Database(e),
        }
    }
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Database(_) | PageError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            PageError::NotFound(what) => {
                tracing::debug!("{what} not found");
                NotFoundPage::default().render()
            }
            err => {
                tracing::error!("request failed: {err}");
                ServerErrorPage::default().render()
            }
        };

        match body {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("failed to render error page: {e}");
                (status, status.canonical_reason().unwrap_or("error")).into_response()
            }
        }
    }
}
