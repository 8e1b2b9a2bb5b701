//! Welcome page: first-run onboarding.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reached only through the welcome guard, so the user is logged in and has
//! not finished onboarding. The user rates a minimum number of movies and
//! books (through `components::add_item_modal`) and then completes
//! onboarding, which unlocks the home page.

#[cfg(test)]
#[path = "welcome_test.rs"]
mod welcome_test;

use std::ops::RangeInclusive;

use crate::net::error::ApiError;
use crate::net::types::{OnboardingProgress, Review};
use crate::router::Route;
use crate::services::auth::AuthService;

/// Ages the backend accepts.
pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("age must be between 1 and 120, got {0}")]
    InvalidAge(u32),
    #[error("rate at least {movies} movies and {books} books first")]
    Incomplete { movies: u32, books: u32 },
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct WelcomeView {
    auth: AuthService,
    progress: OnboardingProgress,
    error: Option<String>,
}

impl WelcomeView {
    #[must_use]
    pub fn new(auth: AuthService) -> Self {
        Self { auth, progress: OnboardingProgress::default(), error: None }
    }

    #[must_use]
    pub fn progress(&self) -> &OnboardingProgress {
        &self.progress
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn can_complete(&self) -> bool {
        self.progress.is_satisfied()
    }

    /// Fetch rated-item counts. A failure keeps the previous counts.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        match self.auth.onboarding_status().await {
            Ok(status) => {
                self.progress = status.progress;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "onboarding progress fetch failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Submit one rating, then refresh progress.
    ///
    /// # Errors
    ///
    /// Returns the submit or refresh error.
    pub async fn submit_review(&mut self, review: &Review) -> Result<(), ApiError> {
        if let Err(e) = self.auth.api().submit_review(review).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.refresh().await
    }

    /// Finish onboarding and return the home route.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::Incomplete`] without a request while the
    /// minimum counts are not met, or the backend error.
    pub async fn complete(&mut self) -> Result<Route, OnboardingError> {
        if !self.can_complete() {
            let required = self.progress.required;
            return Err(OnboardingError::Incomplete { movies: required.movies, books: required.books });
        }
        self.auth.complete_onboarding().await.map_err(|e| {
            self.error = Some(e.user_message());
            OnboardingError::Api(e)
        })?;
        Ok(Route::Home)
    }

    /// Record the user's age.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::InvalidAge`] without a request for ages
    /// outside [`AGE_RANGE`], or the backend error.
    pub async fn set_age(&mut self, age: u32) -> Result<(), OnboardingError> {
        if !AGE_RANGE.contains(&age) {
            return Err(OnboardingError::InvalidAge(age));
        }
        let age = u8::try_from(age).map_err(|_| OnboardingError::InvalidAge(age))?;
        self.auth.api().set_age(age).await?;
        Ok(())
    }
}
