//! Form binding and field validation for the venue, artist and show forms.
//!
//! Bodies are parsed from `application/x-www-form-urlencoded` by hand so that
//! repeated keys (multi-select `genres`) survive.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use stagelist_db::mutations::{ArtistFields, VenueFields};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("phone pattern is valid"));

pub const FACEBOOK_HOSTS: &[&str] = &[
    "facebook.com",
    "www.facebook.com",
    "m.facebook.com",
    "fb.com",
    "www.fb.com",
];

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR",
    "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub const START_TIME_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("phone number must be in XXX-XXX-XXXX format")]
    InvalidPhone,

    #[error("facebook address is out of specified list")]
    FacebookNotAllowed,

    #[error("{0} must be a valid http(s) URL")]
    InvalidUrl(&'static str),

    #[error("'{0}' is not a valid state")]
    InvalidState(String),

    #[error("'{0}' is not a valid genre")]
    InvalidGenre(String),

    #[error("{0} must be a positive integer")]
    InvalidId(&'static str),

    #[error("start time must look like YYYY-MM-DD HH:MM:SS")]
    InvalidStartTime,
}

/// Every field error found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    /// The flash shown for a rejected submission. Phone errors win over
    /// facebook errors, which win over anything else.
    pub fn flash_message(&self) -> &'static str {
        if self.0.contains(&FieldError::InvalidPhone) {
            "validation error, invalid phone format"
        } else if self.0.contains(&FieldError::FacebookNotAllowed) {
            "validation error, facebook address is out of specified list."
        } else {
            "validation error"
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Decoded key/value pairs of a urlencoded body, in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value for `key`, trimmed; empty when absent.
    pub fn get(&self, key: &str) -> String {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }

    /// Checkbox semantics: present with any value except empty/false/off.
    pub fn flag(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, v)| {
            k == key && !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "false" | "off")
        })
    }
}

// ─── Field validators ───────────────────────────────────────────────

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

fn parse_http_url(raw: &str) -> Option<url::Url> {
    let parsed = url::Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(parsed)
}

pub fn is_allowed_facebook_link(raw: &str) -> bool {
    parse_http_url(raw)
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| FACEBOOK_HOSTS.contains(&host.as_str()))
}

pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn required(errors: &mut FormErrors, value: &str, field: &'static str) {
    if value.is_empty() {
        errors.push(FieldError::Required(field));
    }
}

fn check_state(errors: &mut FormErrors, state: &str) {
    if state.is_empty() {
        errors.push(FieldError::Required("state"));
    } else if !STATES.contains(&state) {
        errors.push(FieldError::InvalidState(state.to_string()));
    }
}

fn check_phone(errors: &mut FormErrors, phone: &str) {
    if !is_valid_phone(phone) {
        errors.push(FieldError::InvalidPhone);
    }
}

fn optional_url(errors: &mut FormErrors, raw: &str, field: &'static str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if parse_http_url(raw).is_none() {
        errors.push(FieldError::InvalidUrl(field));
    }
    Some(raw.to_string())
}

fn optional_facebook(errors: &mut FormErrors, raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if !is_allowed_facebook_link(raw) {
        errors.push(FieldError::FacebookNotAllowed);
    }
    Some(raw.to_string())
}

// ─── Venue ──────────────────────────────────────────────────────────

/// Raw venue form values, kept verbatim so a rejected form can be re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.get("name"),
            city: fields.get("city"),
            state: fields.get("state"),
            address: fields.get("address"),
            phone: fields.get("phone"),
            image_link: fields.get("image_link"),
            facebook_link: fields.get("facebook_link"),
            website_link: fields.get("website_link"),
            seeking_talent: fields.flag("seeking_talent"),
            seeking_description: fields.get("seeking_description"),
        }
    }

    pub fn validate(&self) -> Result<VenueFields, FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, &self.name, "name");
        required(&mut errors, &self.city, "city");
        check_state(&mut errors, &self.state);
        required(&mut errors, &self.address, "address");
        check_phone(&mut errors, &self.phone);
        let image_link = optional_url(&mut errors, &self.image_link, "image_link");
        let facebook_link = optional_facebook(&mut errors, &self.facebook_link);
        if !self.website_link.is_empty() && parse_http_url(&self.website_link).is_none() {
            errors.push(FieldError::InvalidUrl("website_link"));
        }

        errors.into_result(VenueFields {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            image_link,
            facebook_link,
            website_link: self.website_link.clone(),
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description.clone(),
        })
    }
}

impl From<VenueFields> for VenueForm {
    fn from(v: VenueFields) -> Self {
        Self {
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            image_link: v.image_link.unwrap_or_default(),
            facebook_link: v.facebook_link.unwrap_or_default(),
            website_link: v.website_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

// ─── Artist ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub image_link: String,
    pub facebook_link: String,
    pub website_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        // Accept both repeated keys and comma-separated values
        let genres = fields
            .get_all("genres")
            .iter()
            .flat_map(|g| stagelist_db::entities::artist::split_genres(g))
            .map(str::to_string)
            .collect();

        Self {
            name: fields.get("name"),
            city: fields.get("city"),
            state: fields.get("state"),
            phone: fields.get("phone"),
            genres,
            image_link: fields.get("image_link"),
            facebook_link: fields.get("facebook_link"),
            website_link: fields.get("website_link"),
            seeking_venue: fields.flag("seeking_venue"),
            seeking_description: fields.get("seeking_description"),
        }
    }

    pub fn validate(&self) -> Result<ArtistFields, FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, &self.name, "name");
        required(&mut errors, &self.city, "city");
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        if self.genres.is_empty() {
            errors.push(FieldError::Required("genres"));
        }
        for genre in &self.genres {
            if !GENRES.contains(&genre.as_str()) {
                errors.push(FieldError::InvalidGenre(genre.clone()));
            }
        }
        let image_link = optional_url(&mut errors, &self.image_link, "image_link");
        let facebook_link = optional_facebook(&mut errors, &self.facebook_link);
        if !self.website_link.is_empty() && parse_http_url(&self.website_link).is_none() {
            errors.push(FieldError::InvalidUrl("website_link"));
        }

        errors.into_result(ArtistFields {
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: self.phone.clone(),
            genres: self.genres.clone(),
            image_link,
            facebook_link,
            website_link: self.website_link.clone(),
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description.clone(),
        })
    }
}

impl From<ArtistFields> for ArtistForm {
    fn from(a: ArtistFields) -> Self {
        Self {
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            genres: a.genres,
            image_link: a.image_link.unwrap_or_default(),
            facebook_link: a.facebook_link.unwrap_or_default(),
            website_link: a.website_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

// ─── Show ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowForm {
    pub venue_id: String,
    pub artist_id: String,
    pub start_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: DateTime<Utc>,
}

impl ShowForm {
    /// Blank form with the start time defaulting to `now`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now.format(START_TIME_DISPLAY).to_string(),
            ..Default::default()
        }
    }

    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            venue_id: fields.get("venue_id"),
            artist_id: fields.get("artist_id"),
            start_time: fields.get("start_time"),
        }
    }

    pub fn validate(&self) -> Result<NewShow, FormErrors> {
        let mut errors = FormErrors::default();
        let venue_id = parse_id(&mut errors, &self.venue_id, "venue_id");
        let artist_id = parse_id(&mut errors, &self.artist_id, "artist_id");
        let start_time = if self.start_time.is_empty() {
            errors.push(FieldError::Required("start_time"));
            None
        } else {
            let parsed = parse_start_time(&self.start_time);
            if parsed.is_none() {
                errors.push(FieldError::InvalidStartTime);
            }
            parsed
        };

        match (venue_id, artist_id, start_time) {
            (Some(venue_id), Some(artist_id), Some(start_time)) if errors.0.is_empty() => {
                Ok(NewShow {
                    venue_id,
                    artist_id,
                    start_time,
                })
            }
            _ => Err(errors),
        }
    }
}

fn parse_id(errors: &mut FormErrors, raw: &str, field: &'static str) -> Option<i32> {
    if raw.is_empty() {
        errors.push(FieldError::Required(field));
        return None;
    }
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.push(FieldError::InvalidId(field));
            None
        }
    }
}
