//! Core data models for marquee.
//!
//! These types are shared by the store implementations, the HTTP layer, and
//! the client, and define the JSON wire shape of a favorite entry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// MEDIA TYPE
// =============================================================================

/// Kind of a favorite entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum MediaType {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl MediaType {
    /// All variants in display order.
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::TvShow];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::TvShow => "TV Show",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Movie
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Movie" => Ok(MediaType::Movie),
            "TV Show" => Ok(MediaType::TvShow),
            other => Err(format!("Unknown media type '{}'", other)),
        }
    }
}

// =============================================================================
// OPTIONAL TEXT FIELDS
// =============================================================================

/// The optional free-text attributes of a favorite entry.
///
/// Carries both names a field is known by: the camelCase JSON key and the
/// snake_case column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Director,
    Budget,
    Location,
    Duration,
    YearTime,
    PosterUrl,
    Notes,
}

impl TextField {
    pub const ALL: [TextField; 7] = [
        TextField::Director,
        TextField::Budget,
        TextField::Location,
        TextField::Duration,
        TextField::YearTime,
        TextField::PosterUrl,
        TextField::Notes,
    ];

    /// JSON key used on the wire.
    pub fn json_key(&self) -> &'static str {
        match self {
            TextField::Director => "director",
            TextField::Budget => "budget",
            TextField::Location => "location",
            TextField::Duration => "duration",
            TextField::YearTime => "yearTime",
            TextField::PosterUrl => "posterUrl",
            TextField::Notes => "notes",
        }
    }

    /// Column name in the `favorite` table.
    pub fn column(&self) -> &'static str {
        match self {
            TextField::Director => "director",
            TextField::Budget => "budget",
            TextField::Location => "location",
            TextField::Duration => "duration",
            TextField::YearTime => "year_time",
            TextField::PosterUrl => "poster_url",
            TextField::Notes => "notes",
        }
    }
}

// =============================================================================
// FAVORITE ENTRY
// =============================================================================

/// A stored favorite movie or TV show.
///
/// `id` is assigned by the store, strictly increasing in creation order, and
/// never reused after deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub director: Option<String>,
    pub budget: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub year_time: Option<String>,
    pub poster_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Read an optional text attribute.
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Director => self.director.as_deref(),
            TextField::Budget => self.budget.as_deref(),
            TextField::Location => self.location.as_deref(),
            TextField::Duration => self.duration.as_deref(),
            TextField::YearTime => self.year_time.as_deref(),
            TextField::PosterUrl => self.poster_url.as_deref(),
            TextField::Notes => self.notes.as_deref(),
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::Director => &mut self.director,
            TextField::Budget => &mut self.budget,
            TextField::Location => &mut self.location,
            TextField::Duration => &mut self.duration,
            TextField::YearTime => &mut self.year_time,
            TextField::PosterUrl => &mut self.poster_url,
            TextField::Notes => &mut self.notes,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// A validated request to create a favorite entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewFavorite {
    /// Create a request with only the required fields set.
    pub fn new(title: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            title: title.into(),
            media_type,
            ..Default::default()
        }
    }

    /// Set an optional text attribute (builder style).
    pub fn with_text(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.set_text(field, Some(value.into()));
        self
    }

    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Director => self.director.as_deref(),
            TextField::Budget => self.budget.as_deref(),
            TextField::Location => self.location.as_deref(),
            TextField::Duration => self.duration.as_deref(),
            TextField::YearTime => self.year_time.as_deref(),
            TextField::PosterUrl => self.poster_url.as_deref(),
            TextField::Notes => self.notes.as_deref(),
        }
    }

    pub fn set_text(&mut self, field: TextField, value: Option<String>) {
        let slot = match field {
            TextField::Director => &mut self.director,
            TextField::Budget => &mut self.budget,
            TextField::Location => &mut self.location,
            TextField::Duration => &mut self.duration,
            TextField::YearTime => &mut self.year_time,
            TextField::PosterUrl => &mut self.poster_url,
            TextField::Notes => &mut self.notes,
        };
        *slot = value;
    }
}

/// A validated partial update.
///
/// `None` leaves a field unchanged. For the optional text attributes,
/// `Some(None)` clears the stored value. Serializes to the wire shape the
/// update endpoint accepts (absent keys omitted, cleared keys as `null`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl FavoritePatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.media_type.is_none()
            && TextField::ALL.iter().all(|f| self.text(*f).is_none())
    }

    /// The patch value for a text attribute (`None` = untouched).
    pub fn text(&self, field: TextField) -> Option<&Option<String>> {
        match field {
            TextField::Director => self.director.as_ref(),
            TextField::Budget => self.budget.as_ref(),
            TextField::Location => self.location.as_ref(),
            TextField::Duration => self.duration.as_ref(),
            TextField::YearTime => self.year_time.as_ref(),
            TextField::PosterUrl => self.poster_url.as_ref(),
            TextField::Notes => self.notes.as_ref(),
        }
    }

    pub fn set_text(&mut self, field: TextField, value: Option<String>) {
        let slot = match field {
            TextField::Director => &mut self.director,
            TextField::Budget => &mut self.budget,
            TextField::Location => &mut self.location,
            TextField::Duration => &mut self.duration,
            TextField::YearTime => &mut self.year_time,
            TextField::PosterUrl => &mut self.poster_url,
            TextField::Notes => &mut self.notes,
        };
        *slot = Some(value);
    }

    /// Apply the patch in place. Does not touch `id` or timestamps.
    pub fn apply_to(&self, entry: &mut FavoriteEntry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(media_type) = self.media_type {
            entry.media_type = media_type;
        }
        for field in TextField::ALL {
            if let Some(value) = self.text(field) {
                *entry.text_mut(field) = value.clone();
            }
        }
    }
}

impl From<NewFavorite> for FavoritePatch {
    /// Full replacement of every user-editable field, as sent by the edit form.
    fn from(new: NewFavorite) -> Self {
        let mut patch = FavoritePatch {
            title: Some(new.title.clone()),
            media_type: Some(new.media_type),
            ..Default::default()
        };
        for field in TextField::ALL {
            patch.set_text(field, new.text(field).map(str::to_string));
        }
        patch
    }
}

// =============================================================================
// PAGE
// =============================================================================

/// One page of a descending-id listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePage {
    /// Entries ordered by descending id.
    pub data: Vec<FavoriteEntry>,
    /// Id of the last entry in `data`, or null when `data` is empty.
    pub next_cursor: Option<i64>,
    /// Whether at least one more entry exists after `next_cursor`.
    pub has_more: bool,
}

impl FavoritePage {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}
