//! Request body schema for favorite entries.
//!
//! [`FavoriteSchema`] checks an untyped JSON body field by field and produces
//! either a typed request ([`NewFavorite`] / [`FavoritePatch`]) or the complete
//! list of field errors. Unknown keys are ignored.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{TEXT_FIELD_MAX_CHARS, TITLE_MAX_CHARS};
use crate::models::{FavoritePatch, MediaType, NewFavorite, TextField};

/// Absolute URL: a scheme, `://`, a host, and an optional path/query/fragment.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+(?:[/?#]\S*)?$")
        .expect("URL pattern is valid")
});

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in one body, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_fields(self) -> Vec<FieldError> {
        self.0
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Schema for favorite request bodies.
pub struct FavoriteSchema;

impl FavoriteSchema {
    /// Validate a create body. `title` and `type` are required.
    pub fn parse_create(body: &Value) -> Result<NewFavorite, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let Some(obj) = Self::object(body, &mut errors) else {
            return Err(errors);
        };

        let title = match obj.get("title") {
            None => {
                errors.push("title", "Required");
                None
            }
            Some(v) => Self::title(v, &mut errors),
        };
        let media_type = match obj.get("type") {
            None => {
                errors.push("type", "Required");
                None
            }
            Some(v) => Self::media_type(v, &mut errors),
        };

        let mut new = NewFavorite::default();
        for field in TextField::ALL {
            if let Some(v) = obj.get(field.json_key()) {
                new.set_text(field, Self::text(field, v, &mut errors).flatten());
            }
        }

        match (title, media_type) {
            (Some(title), Some(media_type)) => {
                new.title = title;
                new.media_type = media_type;
                errors.into_result(new)
            }
            _ => Err(errors),
        }
    }

    /// Validate an update body. Every key is optional; absent keys are left
    /// untouched, `null` clears an optional text field.
    pub fn parse_patch(body: &Value) -> Result<FavoritePatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let Some(obj) = Self::object(body, &mut errors) else {
            return Err(errors);
        };

        let mut patch = FavoritePatch::default();
        if let Some(v) = obj.get("title") {
            patch.title = Self::title(v, &mut errors);
        }
        if let Some(v) = obj.get("type") {
            patch.media_type = Self::media_type(v, &mut errors);
        }
        for field in TextField::ALL {
            if let Some(v) = obj.get(field.json_key()) {
                if let Some(value) = Self::text(field, v, &mut errors) {
                    patch.set_text(field, value);
                }
            }
        }

        errors.into_result(patch)
    }

    /// Validate an already-typed create request (used by client-side forms).
    pub fn check_new(new: &NewFavorite) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        Self::title(&Value::String(new.title.clone()), &mut errors);
        for field in TextField::ALL {
            if let Some(text) = new.text(field) {
                Self::text(field, &Value::String(text.to_string()), &mut errors);
            }
        }
        errors.into_result(())
    }

    fn object<'a>(
        body: &'a Value,
        errors: &mut ValidationErrors,
    ) -> Option<&'a Map<String, Value>> {
        let obj = body.as_object();
        if obj.is_none() {
            errors.push("body", "Expected a JSON object");
        }
        obj
    }

    fn title(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
        let Some(s) = value.as_str() else {
            errors.push("title", "Expected string");
            return None;
        };
        let trimmed = s.trim();
        if trimmed.is_empty() {
            errors.push("title", "Title must not be empty");
            return None;
        }
        if trimmed.chars().count() > TITLE_MAX_CHARS {
            errors.push(
                "title",
                format!("Title must be {} characters or less", TITLE_MAX_CHARS),
            );
            return None;
        }
        Some(trimmed.to_string())
    }

    fn media_type(value: &Value, errors: &mut ValidationErrors) -> Option<MediaType> {
        match value.as_str().map(str::parse::<MediaType>) {
            Some(Ok(media_type)) => Some(media_type),
            _ => {
                errors.push("type", "Expected 'Movie' | 'TV Show'");
                None
            }
        }
    }

    /// `Some(None)` for an explicit null, `Some(Some(_))` for a valid string,
    /// `None` when the value was rejected.
    fn text(
        field: TextField,
        value: &Value,
        errors: &mut ValidationErrors,
    ) -> Option<Option<String>> {
        let key = field.json_key();
        match value {
            Value::Null => Some(None),
            Value::String(s) => {
                if s.chars().count() > TEXT_FIELD_MAX_CHARS {
                    errors.push(
                        key,
                        format!("Must be {} characters or less", TEXT_FIELD_MAX_CHARS),
                    );
                    return None;
                }
                if field == TextField::PosterUrl && !URL_RE.is_match(s) {
                    errors.push(key, "Invalid url");
                    return None;
                }
                Some(Some(s.clone()))
            }
            _ => {
                errors.push(key, "Expected string or null");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_minimal() {
        let new =
            FavoriteSchema::parse_create(&json!({"title": "Alien", "type": "Movie"})).unwrap();
        assert_eq!(new, NewFavorite::new("Alien", MediaType::Movie));
    }

    #[test]
    fn test_create_all_fields() {
        let new = FavoriteSchema::parse_create(&json!({
            "title": "The Wire",
            "type": "TV Show",
            "director": "David Simon",
            "budget": "n/a",
            "location": "Baltimore",
            "duration": "60 min/ep",
            "yearTime": "2002-2008",
            "posterUrl": "https://example.com/wire.jpg",
            "notes": null,
        }))
        .unwrap();
        assert_eq!(new.media_type, MediaType::TvShow);
        assert_eq!(new.year_time.as_deref(), Some("2002-2008"));
        assert_eq!(new.poster_url.as_deref(), Some("https://example.com/wire.jpg"));
        assert!(new.notes.is_none());
    }

    #[test]
    fn test_create_empty_title_rejected() {
        let errors =
            FavoriteSchema::parse_create(&json!({"title": "", "type": "Movie"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.message_for("title"), Some("Title must not be empty"));
    }

    #[test]
    fn test_create_whitespace_title_rejected() {
        let errors =
            FavoriteSchema::parse_create(&json!({"title": "   ", "type": "Movie"})).unwrap_err();
        assert!(errors.message_for("title").is_some());
    }

    #[test]
    fn test_create_title_is_trimmed() {
        let new =
            FavoriteSchema::parse_create(&json!({"title": "  Heat ", "type": "Movie"})).unwrap();
        assert_eq!(new.title, "Heat");
    }

    #[test]
    fn test_create_collects_every_error() {
        let errors = FavoriteSchema::parse_create(&json!({
            "type": "Podcast",
            "director": 42,
            "posterUrl": "not a url",
        }))
        .unwrap_err();
        let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "type", "director", "posterUrl"]);
        assert_eq!(errors.message_for("title"), Some("Required"));
        assert_eq!(errors.message_for("posterUrl"), Some("Invalid url"));
    }

    #[test]
    fn test_non_object_body() {
        let errors = FavoriteSchema::parse_create(&json!(["Alien"])).unwrap_err();
        assert_eq!(errors.message_for("body"), Some("Expected a JSON object"));
        let errors = FavoriteSchema::parse_patch(&json!("x")).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let new = FavoriteSchema::parse_create(&json!({
            "title": "Alien", "type": "Movie", "id": 99, "rating": 5
        }))
        .unwrap();
        assert_eq!(new.title, "Alien");
    }

    #[test]
    fn test_patch_partial() {
        let patch = FavoriteSchema::parse_patch(&json!({"notes": "rewatch"})).unwrap();
        assert!(patch.title.is_none());
        assert!(patch.media_type.is_none());
        assert_eq!(patch.notes, Some(Some("rewatch".to_string())));
        assert!(patch.director.is_none());
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let patch = FavoriteSchema::parse_patch(&json!({"director": null})).unwrap();
        assert_eq!(patch.director, Some(None));
    }

    #[test]
    fn test_patch_rejects_null_title_and_type() {
        let errors =
            FavoriteSchema::parse_patch(&json!({"title": null, "type": null})).unwrap_err();
        assert_eq!(errors.message_for("title"), Some("Expected string"));
        assert!(errors.message_for("type").is_some());
    }

    #[test]
    fn test_patch_empty_object_is_valid() {
        assert!(FavoriteSchema::parse_patch(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_poster_url_formats() {
        for ok in [
            "https://image.tmdb.org/t/p/w500/abc.jpg",
            "http://localhost:8080/poster.png",
            "ftp://files.example.org",
        ] {
            assert!(
                FavoriteSchema::parse_patch(&json!({ "posterUrl": ok })).is_ok(),
                "{} should be accepted",
                ok
            );
        }
        for bad in ["", "example.com/poster.jpg", "https://", "https://exa mple.com"] {
            assert!(
                FavoriteSchema::parse_patch(&json!({ "posterUrl": bad })).is_err(),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        let errors =
            FavoriteSchema::parse_create(&json!({"title": long, "type": "Movie"})).unwrap_err();
        assert!(errors.message_for("title").unwrap().contains("500"));
    }

    #[test]
    fn test_check_new() {
        assert!(FavoriteSchema::check_new(&NewFavorite::new("Alien", MediaType::Movie)).is_ok());
        let bad = NewFavorite::new("", MediaType::Movie).with_text(TextField::PosterUrl, "nope");
        let errors = FavoriteSchema::check_new(&bad).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_errors_serialize_as_list() {
        let errors = ValidationErrors::from(vec![FieldError::new("title", "Required")]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!([{"field": "title", "message": "Required"}])
        );
    }
}
