//! Read side: list pages, name search and detail pages with past/upcoming
//! show splits. Every function takes the reference time `now` explicitly so
//! the split is decided once per request.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{BinOper, Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::{HashMap, HashSet};

use crate::entities::{artist, show, venue};

/// A venue or artist row with its number of upcoming shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// Venues sharing a (state, city) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<ListingSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> Default for SearchResults<T> {
    fn default() -> Self {
        Self {
            count: 0,
            data: Vec::new(),
        }
    }
}

impl<T> SearchResults<T> {
    fn from_vec(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// One show as seen from a detail page: the "counterpart" is the artist on
/// a venue page and the venue on an artist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowSlot {
    pub counterpart_id: i32,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowSplit {
    pub past: Vec<ShowSlot>,
    pub upcoming: Vec<ShowSlot>,
}

impl ShowSplit {
    /// Shows strictly before `now` are past, strictly after are upcoming.
    /// A show starting exactly at `now` belongs to neither.
    pub fn partition(mut slots: Vec<ShowSlot>, now: DateTime<Utc>) -> Self {
        slots.sort_by_key(|s| s.start_time);
        let mut split = Self::default();
        for slot in slots {
            if slot.start_time < now {
                split.past.push(slot);
            } else if slot.start_time > now {
                split.upcoming.push(slot);
            }
        }
        split
    }
}

#[derive(Debug, Clone)]
pub struct VenueDetail {
    pub venue: venue::Model,
    pub shows: ShowSplit,
}

#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: artist::Model,
    pub shows: ShowSplit,
}

/// A show joined with both its venue and artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

/// Id/name pair used to populate select inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowChoices {
    pub venues: Vec<Choice>,
    pub artists: Vec<Choice>,
}

/// Case-insensitive `LIKE '%term%'` on a column. `%`, `_` and `\` in the
/// term are escaped so they match literally. Both sides are folded by the
/// database's `LOWER` so they agree on which letters have a case.
pub fn name_contains<C: ColumnTrait>(col: C, term: &str) -> SimpleExpr {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(format!("%{escaped}%"))).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant('\\'.into())),
    );
    Expr::expr(Func::lower(Expr::col(col.as_column_ref()))).binary(BinOper::Like, pattern)
}

/// GET /venues: every venue grouped by (state, city).
pub async fn venue_areas<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<Vec<Area>, DbErr> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::State)
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let counts = upcoming_counts(db, show::Column::VenueId, ids, now).await?;

    let mut areas: Vec<Area> = Vec::new();
    for v in venues {
        let summary = ListingSummary {
            id: v.id,
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            name: v.name,
        };
        match areas.last_mut() {
            Some(area) if area.state == v.state && area.city == v.city => {
                area.venues.push(summary)
            }
            _ => areas.push(Area {
                city: v.city,
                state: v.state,
                venues: vec![summary],
            }),
        }
    }
    Ok(areas)
}

pub async fn list_artists<C: ConnectionTrait>(db: &C) -> Result<Vec<artist::Model>, DbErr> {
    artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await
}

/// Most recently listed venues and artists, newest first.
pub async fn recent_listings<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<(Vec<Choice>, Vec<Choice>), DbErr> {
    let venues = venue::Entity::find()
        .order_by_desc(venue::Column::Id)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(|v| Choice {
            id: v.id,
            name: v.name,
        })
        .collect();
    let artists = artist::Entity::find()
        .order_by_desc(artist::Column::Id)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(|a| Choice {
            id: a.id,
            name: a.name,
        })
        .collect();
    Ok((venues, artists))
}

/// POST /venues/search. A blank term matches nothing.
pub async fn search_venues<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> Result<SearchResults<ListingSummary>, DbErr> {
    if term.trim().is_empty() {
        return Ok(SearchResults::default());
    }

    let venues = venue::Entity::find()
        .filter(name_contains(venue::Column::Name, term))
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let counts = upcoming_counts(db, show::Column::VenueId, ids, now).await?;

    Ok(SearchResults::from_vec(
        venues
            .into_iter()
            .map(|v| ListingSummary {
                num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
                id: v.id,
                name: v.name,
            })
            .collect(),
    ))
}

/// POST /artists/search. A blank term matches nothing.
pub async fn search_artists<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> Result<SearchResults<ListingSummary>, DbErr> {
    if term.trim().is_empty() {
        return Ok(SearchResults::default());
    }

    let artists = artist::Entity::find()
        .filter(name_contains(artist::Column::Name, term))
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await?;

    let ids: Vec<i32> = artists.iter().map(|a| a.id).collect();
    let counts = upcoming_counts(db, show::Column::ArtistId, ids, now).await?;

    Ok(SearchResults::from_vec(
        artists
            .into_iter()
            .map(|a| ListingSummary {
                num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

pub async fn venue_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: DateTime<Utc>,
) -> Result<Option<VenueDetail>, DbErr> {
    let Some(venue) = venue::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let slots = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .find_also_related(artist::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(s, a)| {
            a.map(|a| ShowSlot {
                counterpart_id: a.id,
                counterpart_name: a.name,
                counterpart_image_link: a.image_link,
                start_time: s.start_time.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(Some(VenueDetail {
        venue,
        shows: ShowSplit::partition(slots, now),
    }))
}

pub async fn artist_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
    now: DateTime<Utc>,
) -> Result<Option<ArtistDetail>, DbErr> {
    let Some(artist) = artist::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let slots = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .find_also_related(venue::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(s, v)| {
            v.map(|v| ShowSlot {
                counterpart_id: v.id,
                counterpart_name: v.name,
                counterpart_image_link: v.image_link,
                start_time: s.start_time.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(Some(ArtistDetail {
        artist,
        shows: ShowSplit::partition(slots, now),
    }))
}

/// GET /shows: every show, earliest first.
pub async fn list_shows<C: ConnectionTrait>(db: &C) -> Result<Vec<ShowListing>, DbErr> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::StartTime)
        .all(db)
        .await?;
    join_listings(db, shows).await
}

/// One show with its venue and artist; `None` for an unknown id.
pub async fn show_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<ShowListing>, DbErr> {
    let Some(found) = show::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    Ok(join_listings(db, vec![found]).await?.into_iter().next())
}

/// Shows whose artist or venue name contains `term`, case-insensitively.
pub async fn search_shows<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> Result<SearchResults<ShowListing>, DbErr> {
    if term.trim().is_empty() {
        return Ok(SearchResults::default());
    }

    let artist_ids: Vec<i32> = artist::Entity::find()
        .filter(name_contains(artist::Column::Name, term))
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();
    let venue_ids: Vec<i32> = venue::Entity::find()
        .filter(name_contains(venue::Column::Name, term))
        .all(db)
        .await?
        .into_iter()
        .map(|v| v.id)
        .collect();

    if artist_ids.is_empty() && venue_ids.is_empty() {
        return Ok(SearchResults::default());
    }

    let shows = show::Entity::find()
        .filter(
            show::Column::ArtistId
                .is_in(artist_ids)
                .or(show::Column::VenueId.is_in(venue_ids)),
        )
        .order_by_asc(show::Column::StartTime)
        .all(db)
        .await?;

    Ok(SearchResults::from_vec(join_listings(db, shows).await?))
}

/// Venue and artist choices for the show creation form, sorted by name.
pub async fn show_choices<C: ConnectionTrait>(db: &C) -> Result<ShowChoices, DbErr> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|v| Choice {
            id: v.id,
            name: v.name,
        })
        .collect();
    let artists = list_artists(db)
        .await?
        .into_iter()
        .map(|a| Choice {
            id: a.id,
            name: a.name,
        })
        .collect();
    Ok(ShowChoices { venues, artists })
}

/// Count upcoming shows per owner id, where `owner` is the show column
/// holding the venue or artist id.
async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    owner: show::Column,
    ids: Vec<i32>,
    now: DateTime<Utc>,
) -> Result<HashMap<i32, u64>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let shows = show::Entity::find()
        .filter(owner.is_in(ids))
        .all(db)
        .await?;

    let mut counts: HashMap<i32, u64> = HashMap::new();
    for s in shows {
        if s.start_time.with_timezone(&Utc) > now {
            let key = match owner {
                show::Column::ArtistId => s.artist_id,
                _ => s.venue_id,
            };
            *counts.entry(key).or_default() += 1;
        }
    }
    Ok(counts)
}

async fn join_listings<C: ConnectionTrait>(
    db: &C,
    shows: Vec<show::Model>,
) -> Result<Vec<ShowListing>, DbErr> {
    if shows.is_empty() {
        return Ok(Vec::new());
    }

    // Batch-fetch both sides of the join
    let venue_ids: HashSet<i32> = shows.iter().map(|s| s.venue_id).collect();
    let artist_ids: HashSet<i32> = shows.iter().map(|s| s.artist_id).collect();

    let venues: HashMap<i32, venue::Model> = venue::Entity::find()
        .filter(venue::Column::Id.is_in(venue_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let artists: HashMap<i32, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(shows
        .into_iter()
        .filter_map(|s| {
            let v = venues.get(&s.venue_id)?;
            let a = artists.get(&s.artist_id)?;
            Some(ShowListing {
                id: s.id,
                venue_id: v.id,
                venue_name: v.name.clone(),
                artist_id: a.id,
                artist_name: a.name.clone(),
                artist_image_link: a.image_link.clone(),
                start_time: s.start_time.with_timezone(&Utc),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn slot(name: &str, start_time: DateTime<Utc>) -> ShowSlot {
        ShowSlot {
            counterpart_id: 1,
            counterpart_name: name.into(),
            counterpart_image_link: None,
            start_time,
        }
    }

    #[test]
    fn test_partition_splits_on_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let split = ShowSplit::partition(
            vec![
                slot("later", now + Duration::days(3)),
                slot("earlier", now - Duration::days(3)),
                slot("soon", now + Duration::hours(1)),
            ],
            now,
        );
        assert_eq!(split.past.len(), 1);
        assert_eq!(split.past[0].counterpart_name, "earlier");
        let upcoming: Vec<&str> = split
            .upcoming
            .iter()
            .map(|s| s.counterpart_name.as_str())
            .collect();
        assert_eq!(upcoming, vec!["soon", "later"]);
    }

    #[test]
    fn test_partition_drops_show_starting_exactly_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let split = ShowSplit::partition(vec![slot("now", now)], now);
        assert!(split.past.is_empty());
        assert!(split.upcoming.is_empty());
    }

    #[test]
    fn test_search_results_count_matches_data() {
        let results = SearchResults::from_vec(vec![1, 2, 3]);
        assert_eq!(results.count, 3);
        let empty: SearchResults<ListingSummary> = SearchResults::default();
        assert_eq!(empty.count, 0);
        assert!(empty.data.is_empty());
    }

    #[test]
    fn test_name_contains_folds_both_sides_in_sql() {
        use sea_orm::sea_query::{Query, SqliteQueryBuilder};

        let sql = Query::select()
            .column(venue::Column::Id)
            .from(venue::Entity)
            .and_where(name_contains(venue::Column::Name, " Élysée "))
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"LOWER("venues"."name") LIKE LOWER('%Élysée%') ESCAPE"#), "{sql}");
    }
}
