//! Home page: the user's movie and book list with tabs, search and paging.
//!
//! SYSTEM CONTEXT
//! ==============
//! The authenticated landing route for regular users. A UI shell binds to
//! [`ListingView`]: it forwards tab clicks, page clicks and raw search input,
//! and renders `items()` plus `page_numbers()`.
//!
//! DESIGN
//! ======
//! Every change to tab, applied query or page triggers exactly one fetch.
//! Search input goes through a [`Debouncer`] first, so a burst of keystrokes
//! produces one fetch with the final text, reset to page 1. Switching tabs
//! clears the query.
//!
//! TRADE-OFFS
//! ==========
//! The combined tab fetches both kinds with one page cursor, so its page
//! count is the larger of the two kinds' counts. Pages past the shorter
//! kind's end show only the longer kind.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Book, CatalogItem, ItemKind, ListingPage, ListingQuery, Movie, Tab};
use crate::util::debounce::Debouncer;
use crate::util::pagination;

/// View state for the home list.
pub struct ListingView {
    api: ApiClient,
    active_tab: Tab,
    search_query: String,
    current_page: u32,
    per_page: u32,
    total_pages: u32,
    movies: ListingPage<Movie>,
    books: ListingPage<Book>,
    is_loading: bool,
    error: Option<String>,
    search: Debouncer<String>,
}

impl ListingView {
    #[must_use]
    pub fn new(api: ApiClient, per_page: u32, debounce: Duration) -> Self {
        Self {
            api,
            active_tab: Tab::All,
            search_query: String::new(),
            current_page: 1,
            per_page,
            total_pages: 0,
            movies: ListingPage::default(),
            books: ListingPage::default(),
            is_loading: false,
            error: None,
            search: Debouncer::with_applied(debounce, String::new()),
        }
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn movies(&self) -> &ListingPage<Movie> {
        &self.movies
    }

    #[must_use]
    pub fn books(&self) -> &ListingPage<Book> {
        &self.books
    }

    /// Items for the active tab, movies first.
    #[must_use]
    pub fn items(&self) -> Vec<CatalogItem> {
        let movies = self.movies.items.iter().cloned().map(CatalogItem::Movie);
        let books = self.books.items.iter().cloned().map(CatalogItem::Book);
        movies
            .chain(books)
            .filter(|item| self.active_tab.includes(item.kind()))
            .collect()
    }

    /// Page links to show around the current page.
    #[must_use]
    pub fn page_numbers(&self) -> Vec<u32> {
        pagination::page_numbers(self.current_page, self.total_pages)
    }

    /// Fetch the current tab/query/page.
    ///
    /// # Errors
    ///
    /// Returns the backend error; it is also kept in `error()` for display.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let query = ListingQuery {
            kind: self.active_tab.kind(),
            search_global: false,
            query: self.search_query.clone(),
            page: self.current_page,
            per_page: self.per_page,
        };
        self.is_loading = true;
        let result = self.api.listings(&query).await;
        self.is_loading = false;

        match result {
            Ok(response) => {
                let (movies, books) = response.into_pages();
                self.total_pages = match self.active_tab {
                    Tab::Movies => movies.total_pages,
                    Tab::Books => books.total_pages,
                    Tab::All => movies.total_pages.max(books.total_pages),
                };
                self.movies = movies;
                self.books = books;
                self.error = None;
                tracing::debug!(
                    tab = self.active_tab.as_str(),
                    page = self.current_page,
                    total_pages = self.total_pages,
                    "listings loaded"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(tab = self.active_tab.as_str(), error = %e, "listings fetch failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Switch tabs, clearing the query and returning to page 1.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn set_tab(&mut self, tab: Tab) -> Result<(), ApiError> {
        if tab == self.active_tab {
            return Ok(());
        }
        self.active_tab = tab;
        self.search_query.clear();
        self.search.mark_applied(String::new());
        self.current_page = 1;
        self.load().await
    }

    /// Move to `page`. Out-of-range pages and the current page are ignored.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn change_page(&mut self, page: u32) -> Result<(), ApiError> {
        if !pagination::is_navigable(page, self.current_page, self.total_pages) {
            return Ok(());
        }
        self.current_page = page;
        self.load().await
    }

    /// Record raw search input. Nothing is fetched until the debounce
    /// window passes without further input.
    pub fn search_input(&mut self, text: &str) {
        self.search.push(text.trim().to_owned());
    }

    #[must_use]
    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    /// Wait out the pending search window, then apply the query if it
    /// changed. Returns whether a fetch happened.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn settle_search(&mut self) -> Result<bool, ApiError> {
        let Some(deadline) = self.search.deadline() else {
            return Ok(false);
        };
        tokio::time::sleep_until(deadline).await;
        match self.search.poll(Instant::now()) {
            Some(query) => self.apply_search(query).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Apply debounced search input from `rx` until the channel closes.
    /// Fetch errors are kept in `error()` and do not stop the loop.
    pub async fn run_search_loop(&mut self, mut rx: mpsc::Receiver<String>) {
        while let Some(query) = self.search.next(&mut rx).await {
            // Already logged and stored by `load`.
            let _ = self.apply_search(query).await;
        }
    }

    async fn apply_search(&mut self, query: String) -> Result<(), ApiError> {
        tracing::debug!(%query, "search applied");
        self.search_query = query;
        self.current_page = 1;
        self.load().await
    }

    /// Remove an item from the user's list and refetch. Steps back a page
    /// when the current one no longer exists.
    ///
    /// # Errors
    ///
    /// Returns the delete or fetch error.
    pub async fn remove_item(&mut self, kind: ItemKind, id: i64) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_item(kind, id).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        tracing::info!(kind = kind.as_str(), id, "item removed");
        self.load().await?;
        if self.total_pages > 0 && self.current_page > self.total_pages {
            self.current_page = self.total_pages;
            self.load().await?;
        }
        Ok(())
    }

    /// Update an item on the user's list and refetch.
    ///
    /// # Errors
    ///
    /// Returns the update or fetch error.
    pub async fn update_item(&mut self, kind: ItemKind, id: i64, changes: &serde_json::Value) -> Result<(), ApiError> {
        if let Err(e) = self.api.update_item(kind, id, changes).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        tracing::info!(kind = kind.as_str(), id, "item updated");
        self.load().await
    }
}
