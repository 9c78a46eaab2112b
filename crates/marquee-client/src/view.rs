//! Presentation view-models: the favorites table, the add/edit form, and the
//! confirmation dialog.
//!
//! These hold display state and turn user intents into mutations; rendering
//! them to an actual UI is left to the embedding application.

use std::sync::Arc;

use marquee_core::{
    defaults, FavoriteEntry, FavoritePatch, FavoriteSchema, MediaType, NewFavorite, TextField,
    ValidationErrors,
};

use crate::cache::QueryCache;
use crate::error::{ClientError, Result};
use crate::hook::{InfiniteFavorites, QueryStatus};
use crate::mutations::Mutations;

/// Table column headers, in display order.
pub const TABLE_COLUMNS: [&str; 8] = [
    "Title",
    "Type",
    "Director",
    "Budget",
    "Location",
    "Duration",
    "Year/Time",
    "Actions",
];

pub const LOADING_TEXT: &str = "Loading...";
pub const LOAD_ERROR_TEXT: &str = "Error loading favorites.";
pub const FOOTER_LOADING_MORE: &str = "Loading more...";
pub const FOOTER_SCROLL_FOR_MORE: &str = "Scroll to load more";
pub const FOOTER_NO_MORE: &str = "No more records";

// =============================================================================
// TABLE
// =============================================================================

/// One rendered table row. `cells` follows [`TABLE_COLUMNS`] minus "Actions";
/// absent values render as empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRow {
    pub id: i64,
    pub cells: Vec<String>,
}

impl From<&FavoriteEntry> for FavoriteRow {
    fn from(entry: &FavoriteEntry) -> Self {
        let text = |field: TextField| entry.text(field).unwrap_or_default().to_string();
        Self {
            id: entry.id,
            cells: vec![
                entry.title.clone(),
                entry.media_type.as_str().to_string(),
                text(TextField::Director),
                text(TextField::Budget),
                text(TextField::Location),
                text(TextField::Duration),
                text(TextField::YearTime),
            ],
        }
    }
}

/// What the table shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Loading,
    Error(String),
    Rows {
        rows: Vec<FavoriteRow>,
        footer: &'static str,
    },
}

impl TableView {
    /// Status line shown instead of the table, if any.
    pub fn status_text(&self) -> Option<&str> {
        match self {
            TableView::Loading => Some(LOADING_TEXT),
            TableView::Error(message) => Some(message),
            TableView::Rows { .. } => None,
        }
    }
}

/// Infinite-scrolling table with per-row edit and confirmed delete.
pub struct FavoriteTable {
    listing: Arc<InfiniteFavorites>,
    mutations: Arc<Mutations>,
    dialog: ConfirmDialog,
    selected: Option<i64>,
}

impl FavoriteTable {
    pub fn new(listing: Arc<InfiniteFavorites>, mutations: Arc<Mutations>) -> Self {
        Self {
            listing,
            mutations,
            dialog: ConfirmDialog::delete_entry(),
            selected: None,
        }
    }

    /// Table over the cache's listing for the table page size.
    pub fn from_cache(cache: &QueryCache, mutations: Arc<Mutations>) -> Self {
        Self::new(cache.infinite(defaults::TABLE_PAGE_LIMIT), mutations)
    }

    pub fn listing(&self) -> &Arc<InfiniteFavorites> {
        &self.listing
    }

    pub fn render(&self) -> TableView {
        match self.listing.status() {
            QueryStatus::Loading => TableView::Loading,
            QueryStatus::Error => TableView::Error(LOAD_ERROR_TEXT.to_string()),
            QueryStatus::Success => {
                let rows = self.listing.items().iter().map(FavoriteRow::from).collect();
                let footer = if self.listing.is_fetching_next_page() {
                    FOOTER_LOADING_MORE
                } else if self.listing.has_next_page() {
                    FOOTER_SCROLL_FOR_MORE
                } else {
                    FOOTER_NO_MORE
                };
                TableView::Rows { rows, footer }
            }
        }
    }

    /// Edit form for a loaded row.
    pub fn edit_form(&self, id: i64) -> Option<FavoriteForm> {
        self.listing
            .items()
            .iter()
            .find(|entry| entry.id == id)
            .map(FavoriteForm::edit)
    }

    pub fn dialog(&self) -> &ConfirmDialog {
        &self.dialog
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: i64) {
        self.selected = Some(id);
        self.dialog.open();
    }

    pub fn cancel_delete(&mut self) {
        self.dialog.close();
        self.selected = None;
    }

    /// Delete the selected row and close the dialog. Returns `None` when
    /// nothing was selected.
    pub async fn confirm_delete(&mut self) -> Option<Result<()>> {
        self.dialog.close();
        let id = self.selected.take()?;
        Some(self.mutations.delete(id).await)
    }

    /// Message from the last failed mutation.
    pub fn mutation_error(&self) -> Option<String> {
        self.mutations.feedback().last_error
    }
}

// =============================================================================
// FORM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: i64 },
}

/// Add or edit form over a draft entry.
#[derive(Debug, Clone)]
pub struct FavoriteForm {
    mode: FormMode,
    draft: NewFavorite,
    errors: ValidationErrors,
}

impl FavoriteForm {
    /// Empty add form (type defaults to Movie).
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            draft: NewFavorite::new("", MediaType::Movie),
            errors: ValidationErrors::default(),
        }
    }

    /// Edit form prefilled from `entry`.
    pub fn edit(entry: &FavoriteEntry) -> Self {
        let mut draft = NewFavorite::new(entry.title.clone(), entry.media_type);
        for field in TextField::ALL {
            draft.set_text(field, entry.text(field).map(str::to_string));
        }
        Self {
            mode: FormMode::Edit { id: entry.id },
            draft,
            errors: ValidationErrors::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add",
            FormMode::Edit { .. } => "Save",
        }
    }

    pub fn draft(&self) -> &NewFavorite {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.draft.media_type = media_type;
    }

    /// Set an optional input. Blank input means "no value".
    pub fn set_field(&mut self, field: TextField, input: &str) {
        let value = (!input.trim().is_empty()).then(|| input.to_string());
        self.draft.set_text(field, value);
    }

    /// Current input text for an optional field.
    pub fn field(&self, field: TextField) -> &str {
        self.draft.text(field).unwrap_or_default()
    }

    /// Validate locally, then create or update.
    ///
    /// A local validation failure sends nothing. An add form resets after a
    /// successful create. In edit mode every field is sent, so a blank input
    /// clears the stored value.
    pub async fn submit(&mut self, mutations: &Mutations) -> Result<FavoriteEntry> {
        if let Err(errors) = FavoriteSchema::check_new(&self.draft) {
            self.errors = errors.clone();
            return Err(ClientError::Validation(errors.into_fields()));
        }

        let result = match self.mode {
            FormMode::Add => mutations.create(&self.draft).await,
            FormMode::Edit { id } => {
                mutations
                    .update(id, &FavoritePatch::from(self.draft.clone()))
                    .await
            }
        };

        match &result {
            Ok(_) if self.mode == FormMode::Add => *self = Self::add(),
            Ok(_) => self.errors = ValidationErrors::default(),
            Err(ClientError::Validation(fields)) => {
                self.errors = ValidationErrors::from(fields.clone())
            }
            Err(_) => {}
        }
        result
    }
}

// =============================================================================
// CONFIRM DIALOG
// =============================================================================

/// Modal yes/no confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    title: String,
    message: String,
    open: bool,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::new("Confirm", "Are you sure you want to continue?")
    }
}

impl ConfirmDialog {
    pub const CANCEL_LABEL: &'static str = "Cancel";
    pub const CONFIRM_LABEL: &'static str = "Confirm";

    /// Closed dialog with the given text.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            open: false,
        }
    }

    /// The dialog shown before deleting an entry.
    pub fn delete_entry() -> Self {
        Self::new("Delete Entry", "Are you sure you want to delete this movie/show?")
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}
