// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use sea_orm::DatabaseConnection;
use stagelist_db::{AppState, DatabaseConfig};
use stagelist_migration::{Migrator, MigratorTrait};
use std::sync::Arc;

/// Router over a migrated in-memory SQLite database, plus a handle to
/// that database for seeding and assertions.
pub async fn test_app() -> (Router, DatabaseConnection) {
    let db = stagelist_db::connect(&DatabaseConfig::in_memory())
        .await
        .unwrap();
    Migrator::up(&db, None).await.unwrap();
    let app = stagelist_server::router(Arc::new(AppState { db: db.clone() }));
    (app, db)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// POST an `application/x-www-form-urlencoded` body.
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub const VENUE_FORM: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA\
    &address=1015+Folsom+Street&phone=123-123-1234\
    &facebook_link=https%3A%2F%2Fwww.facebook.com%2FTheMusicalHop\
    &seeking_talent=y&seeking_description=Looking+for+local+acts";

pub const ARTIST_FORM: &str = "name=Guns+N+Petals&city=San+Francisco&state=CA\
    &phone=326-123-5000&genres=Rock+n+Roll&genres=Jazz";
