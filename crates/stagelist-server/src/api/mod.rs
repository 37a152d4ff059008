pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use askama::Template;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::Html,
};
use serde::Deserialize;

use crate::error::PageError;

/// Body of the venue, artist and show search forms.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

/// Integer `{id}` path segment. Anything that does not parse as an `i32`
/// names no record, so it renders the 404 page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i32);

impl<S: Send + Sync> FromRequestParts<S> for RecordId {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!("unusable record id: {rejection}");
                Err(PageError::NotFound("page"))
            }
        }
    }
}

/// Render a page template into an HTML response.
pub fn render<T: Template>(page: &T) -> Result<Html<String>, PageError> {
    Ok(Html(page.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_form_defaults_to_empty_term() {
        let form: SearchForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.search_term, "");
    }
}
