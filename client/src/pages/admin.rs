//! Admin page: catalogue entry forms for movies and books.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reached only through the admin guard. Forms hold raw text the way input
//! controls do; `validate` turns them into wire payloads or a list of field
//! errors. Invalid forms are never sent.
//!
//! ERROR HANDLING
//! ==============
//! Backend failures become a timed error message on the view; a 403 is also
//! redirected by the API client's interceptor.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::time::Duration;

use time::macros::format_description;
use tokio::time::Instant;

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{NewBook, NewMovie};

/// Smallest ISBN accepted (ten digits).
pub const MIN_ISBN: i64 = 1_000_000_000;
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(3);
pub const ERROR_MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl FormError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required(field) | Self::Invalid { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FormError>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieForm {
    /// TMDB id.
    pub id: String,
    pub title: String,
    pub director: String,
    pub cast: String,
    pub release_date: String,
    pub original_language: String,
    pub genres: String,
    pub poster_path: String,
}

impl MovieForm {
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn validate(&self) -> Result<NewMovie, Vec<FormError>> {
        let mut errors = Vec::new();

        let id = parse_min(&self.id, "id", 1, &mut errors);
        let title = required(&self.title, "title", &mut errors);
        let director = required(&self.director, "director", &mut errors);
        let cast = required(&self.cast, "cast", &mut errors);
        let genres = required(&self.genres, "genres", &mut errors);

        let release_date = required(&self.release_date, "release_date", &mut errors);
        if !release_date.is_empty()
            && time::Date::parse(&release_date, format_description!("[year]-[month]-[day]")).is_err()
        {
            errors.push(FormError::Invalid { field: "release_date", reason: "expected YYYY-MM-DD".into() });
        }

        let original_language = required(&self.original_language, "original_language", &mut errors);
        if !original_language.is_empty()
            && (original_language.chars().count() != 2 || !original_language.chars().all(char::is_alphabetic))
        {
            errors.push(FormError::Invalid {
                field: "original_language",
                reason: "expected a two-letter language code".into(),
            });
        }

        let poster_path = optional(&self.poster_path);

        match id {
            Some(id) if errors.is_empty() => Ok(NewMovie {
                id,
                title,
                director,
                cast,
                release_date,
                original_language: original_language.to_ascii_lowercase(),
                genres,
                poster_path,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookForm {
    pub isbn: String,
    pub book_title: String,
    pub book_author: String,
    pub year_of_publication: String,
    pub image_url_s: String,
}

impl BookForm {
    /// Validate against the current calendar year.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn validate(&self) -> Result<NewBook, Vec<FormError>> {
        self.validate_for_year(time::OffsetDateTime::now_utc().year())
    }

    /// # Errors
    ///
    /// Returns every field error found. Publication years may run up to one
    /// year past `current_year`.
    pub fn validate_for_year(&self, current_year: i32) -> Result<NewBook, Vec<FormError>> {
        let mut errors = Vec::new();

        let isbn = parse_min(&self.isbn, "isbn", MIN_ISBN, &mut errors);
        let book_title = required(&self.book_title, "book_title", &mut errors);
        let book_author = required(&self.book_author, "book_author", &mut errors);

        let year = parse_min(&self.year_of_publication, "year_of_publication", MIN_PUBLICATION_YEAR.into(), &mut errors);
        let max_year = current_year + 1;
        let year = year.and_then(|y| match i32::try_from(y) {
            Ok(y) if y <= max_year => Some(y),
            _ => {
                errors.push(FormError::Invalid {
                    field: "year_of_publication",
                    reason: format!("must be at most {max_year}"),
                });
                None
            }
        });

        let image_url_s = optional(&self.image_url_s);

        match (isbn, year) {
            (Some(isbn), Some(year_of_publication)) if errors.is_empty() => Ok(NewBook {
                isbn,
                book_title,
                book_author,
                year_of_publication,
                image_url_s,
            }),
            _ => Err(errors),
        }
    }
}

fn required(raw: &str, field: &'static str, errors: &mut Vec<FormError>) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FormError::Required(field));
    }
    value.to_owned()
}

fn optional(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn parse_min(raw: &str, field: &'static str, min: i64, errors: &mut Vec<FormError>) -> Option<i64> {
    let value = required(raw, field, errors);
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) if n >= min => Some(n),
        Ok(_) => {
            errors.push(FormError::Invalid { field, reason: format!("must be at least {min}") });
            None
        }
        Err(_) => {
            errors.push(FormError::Invalid { field, reason: "must be a whole number".into() });
            None
        }
    }
}

// =============================================================================
// VIEW
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Movies,
    Books,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitMessage {
    pub success: bool,
    pub text: String,
    expires_at: Instant,
}

pub struct AdminView {
    api: ApiClient,
    active_tab: AdminTab,
    pub movie: MovieForm,
    pub book: BookForm,
    is_submitting: bool,
    message: Option<SubmitMessage>,
}

impl AdminView {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            active_tab: AdminTab::default(),
            movie: MovieForm::default(),
            book: BookForm::default(),
            is_submitting: false,
            message: None,
        }
    }

    #[must_use]
    pub fn active_tab(&self) -> AdminTab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: AdminTab) {
        self.active_tab = tab;
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// The last submit result, until it expires.
    #[must_use]
    pub fn message(&self) -> Option<&SubmitMessage> {
        self.message.as_ref().filter(|m| Instant::now() < m.expires_at)
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Validate and submit the movie form; resets it on success.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Invalid`] without a request for an invalid
    /// form, or the backend error.
    pub async fn submit_movie(&mut self) -> Result<(), AdminError> {
        let movie = self.movie.validate().map_err(AdminError::Invalid)?;
        self.begin_submit();
        let result = self.api.add_movie(&movie).await;
        self.finish_submit(result, "Movie added successfully!", "Failed to add movie")?;
        tracing::info!(id = movie.id, title = %movie.title, "movie added");
        self.movie = MovieForm::default();
        Ok(())
    }

    /// Validate and submit the book form; resets it on success.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Invalid`] without a request for an invalid
    /// form, or the backend error.
    pub async fn submit_book(&mut self) -> Result<(), AdminError> {
        let book = self.book.validate().map_err(AdminError::Invalid)?;
        self.begin_submit();
        let result = self.api.add_book(&book).await;
        self.finish_submit(result, "Book added successfully!", "Failed to add book")?;
        tracing::info!(isbn = book.isbn, title = %book.book_title, "book added");
        self.book = BookForm::default();
        Ok(())
    }

    fn begin_submit(&mut self) {
        self.is_submitting = true;
        self.message = None;
    }

    fn finish_submit(&mut self, result: Result<(), ApiError>, success: &str, fallback: &str) -> Result<(), AdminError> {
        self.is_submitting = false;
        match result {
            Ok(()) => {
                self.message = Some(SubmitMessage {
                    success: true,
                    text: success.to_owned(),
                    expires_at: Instant::now() + SUCCESS_MESSAGE_TTL,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalogue submit failed");
                let text = match &e {
                    ApiError::Status { message, .. } | ApiError::Forbidden { message } => message.clone(),
                    _ => fallback.to_owned(),
                };
                self.message = Some(SubmitMessage { success: false, text, expires_at: Instant::now() + ERROR_MESSAGE_TTL });
                Err(e.into())
            }
        }
    }
}
