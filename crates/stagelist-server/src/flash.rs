//! One-shot flash messages carried across a redirect in a `flash` cookie.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

const COOKIE_NAME: &str = "flash";
const CLEAR_COOKIE: &str = "flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

/// Messages flashed by the previous response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flashes(pub Vec<String>);

impl Flashes {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let messages = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix("flash="))
            .filter_map(|raw| urlencoding::decode(raw).ok())
            .flat_map(|decoded| {
                decoded
                    .split('\n')
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self(messages)
    }

    /// Pending messages followed by `extra`, for pages that flash inline.
    pub fn with(mut self, extra: impl Into<String>) -> Vec<String> {
        self.0.push(extra.into());
        self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Flashes {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn cookie_value(messages: &[&str]) -> Option<HeaderValue> {
    let encoded = urlencoding::encode(&messages.join("\n")).into_owned();
    HeaderValue::from_str(&format!(
        "{COOKIE_NAME}={encoded}; Path=/; Max-Age=60; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

/// 303 redirect to `to` that flashes `message` on the next page.
pub fn redirect(to: &str, message: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(cookie) = cookie_value(&[message]) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// Middleware: once a page carrying pending flashes has rendered
/// successfully, expire the cookie so the messages show only once.
pub async fn clear_consumed(request: Request, next: Next) -> Response {
    let had_flash = !Flashes::from_headers(request.headers()).0.is_empty();
    let mut response = next.run(request).await;

    if had_flash
        && response.status().is_success()
        && !response.headers().contains_key(header::SET_COOKIE)
    {
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_redirect_sets_encoded_cookie() {
        let response = redirect("/", "Venue The Musical Hop was successfully listed!");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=Venue%20The%20Musical%20Hop"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_flashes_decode_cookie() {
        let encoded = urlencoding::encode("first\nsecond; with semicolon").into_owned();
        let headers = headers_with_cookie(&format!("theme=dark; flash={encoded}"));
        assert_eq!(
            Flashes::from_headers(&headers).0,
            vec!["first".to_string(), "second; with semicolon".to_string()]
        );
    }

    #[test]
    fn test_flashes_empty_without_cookie() {
        assert!(Flashes::from_headers(&HeaderMap::new()).0.is_empty());
        assert!(Flashes::from_headers(&headers_with_cookie("flash=")).0.is_empty());
    }

    #[test]
    fn test_with_appends_inline_message() {
        let flashes = Flashes(vec!["old".into()]);
        assert_eq!(flashes.with("new"), vec!["old".to_string(), "new".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_consumed_expires_cookie_after_page() {
        let app = Router::new()
            .route("/", get(|| async { "page" }))
            .layer(middleware::from_fn(clear_consumed));

        let req = axum::http::Request::builder()
            .uri("/")
            .header(header::COOKIE, "flash=hello")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::SET_COOKIE], CLEAR_COOKIE);

        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }
}
