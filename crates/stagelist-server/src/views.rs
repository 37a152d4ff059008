//! Page templates and the flattened view models they render. Optional
//! columns are flattened to empty strings so templates only test
//! `is_empty()`.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::forms::{ArtistForm, ShowForm, VenueForm, GENRES, STATES};
use stagelist_db::entities::{artist, venue};
use stagelist_db::queries::{Area, Choice, ListingSummary, ShowListing, ShowSlot, ShowSplit};

/// Display format for show start times, e.g. `Tue Apr 1, 2035 8:00PM`.
pub fn format_start_time(dt: &DateTime<Utc>) -> String {
    dt.format("%a %b %-d, %Y %-I:%M%p").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub fn state_options(selected: &str) -> Vec<SelectOption> {
    STATES
        .iter()
        .map(|s| SelectOption {
            value: s.to_string(),
            label: s.to_string(),
            selected: *s == selected,
        })
        .collect()
}

pub fn genre_options(selected: &[String]) -> Vec<SelectOption> {
    GENRES
        .iter()
        .map(|g| SelectOption {
            value: g.to_string(),
            label: g.to_string(),
            selected: selected.iter().any(|s| s == g),
        })
        .collect()
}

pub fn choice_options(choices: &[Choice], selected: &str) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|c| {
            let value = c.id.to_string();
            SelectOption {
                selected: value == selected,
                value,
                label: c.name.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SlotView {
    pub id: i32,
    pub name: String,
    pub image_link: String,
    pub start_time: String,
}

impl From<ShowSlot> for SlotView {
    fn from(s: ShowSlot) -> Self {
        Self {
            id: s.counterpart_id,
            name: s.counterpart_name,
            image_link: s.counterpart_image_link.unwrap_or_default(),
            start_time: format_start_time(&s.start_time),
        }
    }
}

fn slot_views(split: ShowSplit) -> (Vec<SlotView>, Vec<SlotView>) {
    (
        split.past.into_iter().map(SlotView::from).collect(),
        split.upcoming.into_iter().map(SlotView::from).collect(),
    )
}

#[derive(Debug, Clone)]
pub struct ShowView {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

impl From<ShowListing> for ShowView {
    fn from(s: ShowListing) -> Self {
        Self {
            id: s.id,
            venue_id: s.venue_id,
            venue_name: s.venue_name,
            artist_id: s.artist_id,
            artist_name: s.artist_name,
            artist_image_link: s.artist_image_link.unwrap_or_default(),
            start_time: format_start_time(&s.start_time),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VenueView {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl From<venue::Model> for VenueView {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            address: v.address,
            city: v.city,
            state: v.state,
            phone: v.phone,
            image_link: v.image_link.unwrap_or_default(),
            facebook_link: v.facebook_link.unwrap_or_default(),
            website_link: v.website_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtistView {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl From<artist::Model> for ArtistView {
    fn from(a: artist::Model) -> Self {
        Self {
            genres: a.genre_list().into_iter().map(str::to_string).collect(),
            id: a.id,
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            image_link: a.image_link.unwrap_or_default(),
            facebook_link: a.facebook_link.unwrap_or_default(),
            website_link: a.website_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

// ─── Pages ──────────────────────────────────────────────────────────

#[derive(Template, Default)]
#[template(path = "pages/home.html")]
pub struct HomePage {
    pub flashes: Vec<String>,
    pub recent_venues: Vec<Choice>,
    pub recent_artists: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesPage {
    pub flashes: Vec<String>,
    pub areas: Vec<Area>,
}

/// Shared by the venue and artist search pages; `kind` is the URL segment.
#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchPage {
    pub flashes: Vec<String>,
    pub kind: &'static str,
    pub search_term: String,
    pub count: usize,
    pub results: Vec<ListingSummary>,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct VenuePage {
    pub flashes: Vec<String>,
    pub venue: VenueView,
    pub past: Vec<SlotView>,
    pub upcoming: Vec<SlotView>,
}

impl VenuePage {
    pub fn new(flashes: Vec<String>, venue: venue::Model, shows: ShowSplit) -> Self {
        let (past, upcoming) = slot_views(shows);
        Self {
            flashes,
            venue: venue.into(),
            past,
            upcoming,
        }
    }
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsPage {
    pub flashes: Vec<String>,
    pub artists: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ArtistPage {
    pub flashes: Vec<String>,
    pub artist: ArtistView,
    pub past: Vec<SlotView>,
    pub upcoming: Vec<SlotView>,
}

impl ArtistPage {
    pub fn new(flashes: Vec<String>, artist: artist::Model, shows: ShowSplit) -> Self {
        let (past, upcoming) = slot_views(shows);
        Self {
            flashes,
            artist: artist.into(),
            past,
            upcoming,
        }
    }
}

/// The show list, also used for show search results when `searched`.
#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsPage {
    pub flashes: Vec<String>,
    pub searched: bool,
    pub search_term: String,
    pub shows: Vec<ShowView>,
}

#[derive(Template)]
#[template(path = "pages/show.html")]
pub struct ShowPage {
    pub flashes: Vec<String>,
    pub show: ShowView,
}

#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormPage {
    pub flashes: Vec<String>,
    pub errors: Vec<String>,
    pub title: &'static str,
    pub action: String,
    pub form: VenueForm,
    pub states: Vec<SelectOption>,
}

impl VenueFormPage {
    pub fn new(title: &'static str, action: String, form: VenueForm) -> Self {
        Self {
            flashes: Vec::new(),
            errors: Vec::new(),
            title,
            action,
            states: state_options(&form.state),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormPage {
    pub flashes: Vec<String>,
    pub errors: Vec<String>,
    pub title: &'static str,
    pub action: String,
    pub form: ArtistForm,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl ArtistFormPage {
    pub fn new(title: &'static str, action: String, form: ArtistForm) -> Self {
        Self {
            flashes: Vec::new(),
            errors: Vec::new(),
            title,
            action,
            states: state_options(&form.state),
            genres: genre_options(&form.genres),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/new_show.html")]
pub struct ShowFormPage {
    pub flashes: Vec<String>,
    pub errors: Vec<String>,
    pub form: ShowForm,
    pub venues: Vec<SelectOption>,
    pub artists: Vec<SelectOption>,
}

#[derive(Template, Default)]
#[template(path = "errors/404.html")]
pub struct NotFoundPage {
    pub flashes: Vec<String>,
}

#[derive(Template, Default)]
#[template(path = "errors/500.html")]
pub struct ServerErrorPage {
    pub flashes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_start_time() {
        let dt = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        assert_eq!(format_start_time(&dt), "Sun Apr 1, 2035 8:00PM");
    }

    #[test]
    fn test_state_options_marks_selection() {
        let options = state_options("NY");
        let selected: Vec<&str> = options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["NY"]);
        assert_eq!(options.len(), STATES.len());
    }

    #[test]
    fn test_genre_options_marks_every_selected_genre() {
        let options = genre_options(&["Jazz".to_string(), "Soul".to_string()]);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 2);
    }

    #[test]
    fn test_venue_page_escapes_names() {
        let venue = venue::Model {
            id: 1,
            name: "<Hall>".into(),
            city: "Boston".into(),
            state: "MA".into(),
            address: "1 Main St".into(),
            phone: "123-123-1234".into(),
            image_link: None,
            facebook_link: None,
            website_link: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
        };
        let html = VenuePage::new(vec![], venue, ShowSplit::default())
            .render()
            .unwrap();
        assert!(html.contains("&lt;Hall&gt;"));
        assert!(!html.contains("<Hall>"));
    }
}
