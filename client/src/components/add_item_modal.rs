//! Add-item dialog: find a catalogue item, rate it, and build a review.
//!
//! SYSTEM CONTEXT
//! ==============
//! Opened from the home and welcome pages for one item kind. The dialog
//! only builds the [`Review`]; the opening page submits it.

#[cfg(test)]
#[path = "add_item_modal_test.rs"]
mod add_item_modal_test;

use std::ops::RangeInclusive;

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{CatalogItem, ItemKind, ListingQuery, Review};

pub const RATING_RANGE: RangeInclusive<u8> = 1..=5;

pub struct AddItemModal {
    api: ApiClient,
    kind: ItemKind,
    per_page: u32,
    search_query: String,
    results: Vec<CatalogItem>,
    selected: Option<CatalogItem>,
    rating: u8,
    review: String,
}

impl AddItemModal {
    #[must_use]
    pub fn new(api: ApiClient, kind: ItemKind, per_page: u32) -> Self {
        Self {
            api,
            kind,
            per_page,
            search_query: String::new(),
            results: Vec::new(),
            selected: None,
            rating: 0,
            review: String::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[must_use]
    pub fn results(&self) -> &[CatalogItem] {
        &self.results
    }

    #[must_use]
    pub fn selected(&self) -> Option<&CatalogItem> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Search the whole catalogue. A blank query clears the results without
    /// a request; a failed search keeps the previous results.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn search(&mut self, query: &str) -> Result<(), ApiError> {
        self.search_query = query.trim().to_owned();
        if self.search_query.is_empty() {
            self.results.clear();
            return Ok(());
        }
        let request = ListingQuery {
            kind: Some(self.kind),
            search_global: true,
            query: self.search_query.clone(),
            page: 1,
            per_page: self.per_page,
        };
        let response = self.api.listings(&request).await.inspect_err(|e| {
            tracing::warn!(kind = self.kind.as_str(), error = %e, "catalogue search failed");
        })?;
        let (movies, books) = response.into_pages();
        self.results = match self.kind {
            ItemKind::Movie => movies.items.into_iter().map(CatalogItem::Movie).collect(),
            ItemKind::Book => books.items.into_iter().map(CatalogItem::Book).collect(),
        };
        Ok(())
    }

    /// Select a search result by position. Results without an id cannot be
    /// reviewed and are not selectable.
    pub fn select(&mut self, index: usize) -> bool {
        match self.results.get(index) {
            Some(item) if item.id().is_some() => {
                self.selected = Some(item.clone());
                true
            }
            _ => false,
        }
    }

    /// Set the star rating; values outside 1 to 5 are rejected.
    pub fn set_rating(&mut self, rating: u8) -> bool {
        if !RATING_RANGE.contains(&rating) {
            return false;
        }
        self.rating = rating;
        true
    }

    pub fn set_review(&mut self, text: &str) {
        self.review = text.to_owned();
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && RATING_RANGE.contains(&self.rating)
    }

    /// The review to submit, once an item and a rating are chosen.
    #[must_use]
    pub fn review(&self) -> Option<Review> {
        if !self.can_submit() {
            return None;
        }
        let item_id = self.selected.as_ref()?.id()?;
        Some(Review { item_id, item_type: self.kind, rating: self.rating, review: self.review.trim().to_owned() })
    }
}
