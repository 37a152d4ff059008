// Query and mutation tests against an in-memory SQLite database
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use stagelist_db::entities::show;
use stagelist_db::mutations::{self, ArtistFields, MutationError, VenueFields};
use stagelist_db::queries;
use stagelist_migration::{Migrator, MigratorTrait};

async fn setup() -> DatabaseConnection {
    let db = stagelist_db::connect(&stagelist_db::DatabaseConfig::in_memory())
        .await
        .unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

fn venue_fields(name: &str, city: &str, state: &str) -> VenueFields {
    VenueFields {
        name: name.into(),
        city: city.into(),
        state: state.into(),
        address: "1015 Folsom Street".into(),
        phone: "123-123-1234".into(),
        ..Default::default()
    }
}

fn artist_fields(name: &str) -> ArtistFields {
    ArtistFields {
        name: name.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "326-123-5000".into(),
        genres: vec!["Jazz".into()],
        ..Default::default()
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[tokio::test]
async fn test_created_venue_appears_in_areas_and_search() {
    let db = setup().await;
    mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    mutations::create_venue(&db, venue_fields("Park Square Live", "San Francisco", "CA"))
        .await
        .unwrap();
    mutations::create_venue(&db, venue_fields("The Dueling Pianos Bar", "New York", "NY"))
        .await
        .unwrap();

    let areas = queries::venue_areas(&db, now()).await.unwrap();
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0].state, "CA");
    assert_eq!(areas[0].city, "San Francisco");
    let names: Vec<&str> = areas[0].venues.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Park Square Live", "The Musical Hop"]);
    assert_eq!(areas[1].state, "NY");

    let results = queries::search_venues(&db, "hop", now()).await.unwrap();
    assert_eq!(results.count, 1);
    assert_eq!(results.data[0].name, "The Musical Hop");
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let db = setup().await;
    mutations::create_venue(&db, venue_fields("City Hall", "Boston", "MA"))
        .await
        .unwrap();
    mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();

    let venues = queries::search_venues(&db, "hall", now()).await.unwrap();
    assert_eq!(venues.count, 1);
    assert_eq!(venues.data[0].name, "City Hall");

    let artists = queries::search_artists(&db, "PETAL", now()).await.unwrap();
    assert_eq!(artists.count, 1);

    let none = queries::search_artists(&db, "xyz", now()).await.unwrap();
    assert_eq!(none.count, 0);
}

#[tokio::test]
async fn test_search_matches_non_ascii_names_as_written() {
    let db = setup().await;
    mutations::create_venue(&db, venue_fields("Élysée Montmartre", "Paris", "NY"))
        .await
        .unwrap();

    for term in ["Élysée", "Élysée Montmartre", "montmartre"] {
        let results = queries::search_venues(&db, term, now()).await.unwrap();
        assert_eq!(results.count, 1, "{term}");
    }
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let db = setup().await;
    mutations::create_venue(&db, venue_fields("Hall", "Boston", "MA"))
        .await
        .unwrap();

    let results = queries::search_venues(&db, "%", now()).await.unwrap();
    assert_eq!(results.count, 0);
    let results = queries::search_venues(&db, "   ", now()).await.unwrap();
    assert_eq!(results.count, 0);
}

#[tokio::test]
async fn test_past_show_is_split_on_both_detail_pages() {
    let db = setup().await;
    let venue = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    let artist = mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();

    let now = now();
    mutations::create_show(&db, venue.id, artist.id, now - Duration::days(30))
        .await
        .unwrap();
    mutations::create_show(&db, venue.id, artist.id, now + Duration::days(30))
        .await
        .unwrap();

    let venue_detail = queries::venue_detail(&db, venue.id, now).await.unwrap().unwrap();
    assert_eq!(venue_detail.shows.past.len(), 1);
    assert_eq!(venue_detail.shows.upcoming.len(), 1);
    assert!(venue_detail.shows.past[0].start_time < now);
    assert_eq!(venue_detail.shows.past[0].counterpart_name, "Guns N Petals");

    let artist_detail = queries::artist_detail(&db, artist.id, now).await.unwrap().unwrap();
    assert_eq!(artist_detail.shows.past.len(), 1);
    assert_eq!(artist_detail.shows.upcoming.len(), 1);
    assert_eq!(artist_detail.shows.past[0].counterpart_name, "The Musical Hop");

    let results = queries::search_venues(&db, "musical", now).await.unwrap();
    assert_eq!(results.data[0].num_upcoming_shows, 1);
}

#[tokio::test]
async fn test_detail_only_includes_own_shows() {
    let db = setup().await;
    let hop = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    let park = mutations::create_venue(&db, venue_fields("Park Square Live", "San Francisco", "CA"))
        .await
        .unwrap();
    let artist = mutations::create_artist(&db, artist_fields("Matt Quevedo"))
        .await
        .unwrap();
    mutations::create_show(&db, park.id, artist.id, now() - Duration::days(1))
        .await
        .unwrap();

    let detail = queries::venue_detail(&db, hop.id, now()).await.unwrap().unwrap();
    assert!(detail.shows.past.is_empty());
    assert!(detail.shows.upcoming.is_empty());
}

#[tokio::test]
async fn test_missing_detail_returns_none() {
    let db = setup().await;
    assert!(queries::venue_detail(&db, 42, now()).await.unwrap().is_none());
    assert!(queries::artist_detail(&db, 42, now()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_venue_removes_its_shows() {
    let db = setup().await;
    let venue = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    let other = mutations::create_venue(&db, venue_fields("Park Square Live", "San Francisco", "CA"))
        .await
        .unwrap();
    let artist = mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();
    mutations::create_show(&db, venue.id, artist.id, now() + Duration::days(2))
        .await
        .unwrap();
    mutations::create_show(&db, other.id, artist.id, now() + Duration::days(2))
        .await
        .unwrap();

    mutations::delete_venue(&db, venue.id).await.unwrap();

    let remaining = show::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].venue_id, other.id);
    assert!(queries::venue_detail(&db, venue.id, now()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleting_artist_removes_their_shows() {
    let db = setup().await;
    let venue = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    let artist = mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();
    mutations::create_show(&db, venue.id, artist.id, now() - Duration::days(2))
        .await
        .unwrap();

    mutations::delete_artist(&db, artist.id).await.unwrap();
    assert_eq!(show::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_missing_venue_is_not_found() {
    let db = setup().await;
    let err = mutations::delete_venue(&db, 99).await.unwrap_err();
    assert!(matches!(err, MutationError::NotFound("venue")));
}

#[tokio::test]
async fn test_show_requires_existing_venue_and_artist() {
    let db = setup().await;
    let venue = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();

    let err = mutations::create_show(&db, venue.id, 99, now())
        .await
        .unwrap_err();
    assert!(matches!(err, MutationError::NotFound("artist")));
    assert_eq!(show::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_artist_replaces_fields() {
    let db = setup().await;
    let artist = mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();

    let mut fields = ArtistFields::from(artist.clone());
    fields.name = "Guns N Roses".into();
    fields.genres = vec!["Rock n Roll".into(), "Punk".into()];
    fields.seeking_venue = true;
    let updated = mutations::update_artist(&db, artist.id, fields).await.unwrap();

    assert_eq!(updated.name, "Guns N Roses");
    assert_eq!(updated.genre_list(), vec!["Rock n Roll", "Punk"]);
    assert!(updated.seeking_venue);

    let err = mutations::update_artist(&db, 999, artist_fields("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, MutationError::NotFound("artist")));
}

#[tokio::test]
async fn test_list_and_search_shows() {
    let db = setup().await;
    let venue = mutations::create_venue(&db, venue_fields("The Musical Hop", "San Francisco", "CA"))
        .await
        .unwrap();
    let petals = mutations::create_artist(&db, artist_fields("Guns N Petals"))
        .await
        .unwrap();
    let sax = mutations::create_artist(&db, artist_fields("The Wild Sax Band"))
        .await
        .unwrap();
    mutations::create_show(&db, venue.id, sax.id, now() + Duration::days(5))
        .await
        .unwrap();
    mutations::create_show(&db, venue.id, petals.id, now() - Duration::days(5))
        .await
        .unwrap();

    let shows = queries::list_shows(&db).await.unwrap();
    let artists: Vec<&str> = shows.iter().map(|s| s.artist_name.as_str()).collect();
    assert_eq!(artists, vec!["Guns N Petals", "The Wild Sax Band"]);
    assert_eq!(shows[0].venue_name, "The Musical Hop");

    let by_artist = queries::search_shows(&db, "sax").await.unwrap();
    assert_eq!(by_artist.count, 1);
    let by_venue = queries::search_shows(&db, "musical").await.unwrap();
    assert_eq!(by_venue.count, 2);

    let detail = queries::show_detail(&db, shows[0].id).await.unwrap().unwrap();
    assert_eq!(detail.artist_name, "Guns N Petals");
    assert_eq!(detail.venue_id, venue.id);
    assert!(queries::show_detail(&db, 999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_show_choices_sorted_by_name() {
    let db = setup().await;
    mutations::create_venue(&db, venue_fields("Zebra Room", "Austin", "TX"))
        .await
        .unwrap();
    mutations::create_venue(&db, venue_fields("Attic", "Austin", "TX"))
        .await
        .unwrap();

    let choices = queries::show_choices(&db).await.unwrap();
    let names: Vec<&str> = choices.venues.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Attic", "Zebra Room"]);
    assert!(choices.artists.is_empty());
}

#[tokio::test]
async fn test_list_artists_sorted_by_name() {
    let db = setup().await;
    for name in ["The Wild Sax Band", "Guns N Petals", "Matt Quevedo"] {
        mutations::create_artist(&db, artist_fields(name))
            .await
            .unwrap();
    }

    let names: Vec<String> = queries::list_artists(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"]);
}
