//! Wire DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! The backend is loose about shapes: catalogue rows come from two table
//! layouts (`title`/`book_title`, `cast` as a string or an array, numeric ids
//! sometimes sent as strings). Deserialization absorbs those differences here
//! so the rest of the crate sees one normalized model.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Role string the backend assigns to administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Minimum rated items of each kind before onboarding can complete, used when
/// the backend omits `progress.required`.
pub const DEFAULT_REQUIRED_PER_KIND: u32 = 3;

// =============================================================================
// USER / AUTH
// =============================================================================

/// An authenticated user as returned by the auth endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    /// `"admin"` or `"user"`.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// True while the first-run flow still has to be shown.
    #[must_use]
    pub fn needs_onboarding(&self) -> bool {
        !self.onboarding_completed || self.is_new_user
    }
}

/// Body of `GET /api/auth/user` and `POST /api/auth/callback`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
}

/// Body of `GET /api/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub auth_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRequest {
    pub code: String,
    pub state: String,
}

/// Body of `GET /api/auth/onboarding-status`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub progress: OnboardingProgress,
}

/// Number of rated items per kind, and how many are required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingProgress {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub books: u32,
    #[serde(default)]
    pub required: RequiredCounts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredCounts {
    pub movies: u32,
    pub books: u32,
}

impl Default for RequiredCounts {
    fn default() -> Self {
        Self { movies: DEFAULT_REQUIRED_PER_KIND, books: DEFAULT_REQUIRED_PER_KIND }
    }
}

impl OnboardingProgress {
    /// Both kinds have reached their required count.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.movies >= self.required.movies && self.books >= self.required.books
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRequest {
    pub age: u8,
}

// =============================================================================
// CATALOGUE
// =============================================================================

/// The two kinds of trackable items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Movie,
    Book,
}

impl ItemKind {
    /// Singular form used in query strings and review payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Book => "book",
        }
    }

    /// Plural REST collection segment (`/api/movies`, `/api/books`).
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Book => "books",
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "book" | "books" => Ok(Self::Book),
            other => Err(format!("unknown item kind: {other}")),
        }
    }
}

/// Listing and recommendation tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Movies,
    Books,
}

impl Tab {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Movies => "movies",
            Self::Books => "books",
        }
    }

    /// Item kind this tab is restricted to; `None` for the combined tab.
    #[must_use]
    pub fn kind(self) -> Option<ItemKind> {
        match self {
            Self::All => None,
            Self::Movies => Some(ItemKind::Movie),
            Self::Books => Some(ItemKind::Book),
        }
    }

    #[must_use]
    pub fn includes(self, kind: ItemKind) -> bool {
        self.kind().is_none_or(|only| only == kind)
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "movies" | "movie" => Ok(Self::Movies),
            "books" | "book" => Ok(Self::Books),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// A movie row from the listings endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_cast")]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "genres")]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// A book row from the listings endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub isbn: Option<i64>,
    #[serde(alias = "book_title")]
    pub title: String,
    #[serde(default, alias = "book_author")]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, alias = "year_of_publication")]
    pub publish_year: Option<i32>,
    #[serde(default, alias = "image_url_s")]
    pub image_url: Option<String>,
}

impl Book {
    /// Identifier used by reviews and item actions (`id`, falling back to `isbn`).
    #[must_use]
    pub fn item_id(&self) -> Option<i64> {
        self.id.or(self.isbn)
    }
}

/// Either kind of catalogue item, as shown in mixed lists.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogItem {
    Movie(Movie),
    Book(Book),
}

impl CatalogItem {
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Movie(movie) => movie.id,
            Self::Book(book) => book.item_id(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Movie(movie) => &movie.title,
            Self::Book(book) => &book.title,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Movie(_) => ItemKind::Movie,
            Self::Book(_) => ItemKind::Book,
        }
    }
}

// =============================================================================
// LISTINGS
// =============================================================================

/// Query for `GET /api/listings`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    /// `None` requests both kinds.
    pub kind: Option<ItemKind>,
    /// Search the whole catalogue instead of the user's own list.
    pub search_global: bool,
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl ListingQuery {
    /// Query-string pairs in the order the backend documents them.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("type".to_owned(), self.kind.map(ItemKind::as_str).unwrap_or_default().to_owned()),
            ("search_global".to_owned(), self.search_global.to_string()),
            ("query".to_owned(), self.query.clone()),
            ("page".to_owned(), self.page.to_string()),
            ("per_page".to_owned(), self.per_page.to_string()),
        ]
    }
}

/// Pagination block for one item kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default, alias = "currentPage")]
    pub current_page: u32,
    #[serde(default, alias = "perPage")]
    pub per_page: u32,
    #[serde(default, alias = "totalItems")]
    pub total_items: u64,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPagination {
    #[serde(default)]
    pub movies: PageInfo,
    #[serde(default)]
    pub books: PageInfo,
}

/// Body of `GET /api/listings`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: ListingData,
    #[serde(default)]
    pub pagination: ListingPagination,
}

/// One page of items of a single kind, derived from a listings response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> ListingPage<T> {
    fn new(items: Vec<T>, info: PageInfo) -> Self {
        Self {
            items,
            current_page: info.current_page,
            per_page: info.per_page,
            total_items: info.total_items,
            total_pages: info.total_pages,
        }
    }
}

impl ListingResponse {
    #[must_use]
    pub fn into_pages(self) -> (ListingPage<Movie>, ListingPage<Book>) {
        (
            ListingPage::new(self.data.movies, self.pagination.movies),
            ListingPage::new(self.data.books, self.pagination.books),
        )
    }
}

// =============================================================================
// REVIEWS / RECOMMENDATIONS
// =============================================================================

/// Body of `POST /api/reviews`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub item_id: i64,
    pub item_type: ItemKind,
    /// 1 to 5 stars.
    pub rating: u8,
    pub review: String,
}

/// A single generated recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<i64>,
    pub title: String,
    /// Match score in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, deserialize_with = "deserialize_cast")]
    pub cast: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Body of `GET /api/generate-recommendation`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<Vec<Recommendation>>,
}

// =============================================================================
// ADMIN
// =============================================================================

/// Body of `POST /api/movies`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    /// TMDB identifier.
    pub id: i64,
    pub title: String,
    pub director: String,
    /// Comma-separated; the backend splits it.
    pub cast: String,
    /// `YYYY-MM-DD`.
    pub release_date: String,
    /// ISO 639-1 code.
    pub original_language: String,
    pub genres: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

/// Body of `POST /api/books`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: i64,
    pub book_title: String,
    pub book_author: String,
    pub year_of_publication: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url_s: Option<String>,
}

// =============================================================================
// DESERIALIZERS
// =============================================================================

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(number) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("expected integer id")),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("id {trimmed:?} is not numeric")))
        }
        _ => Err(D::Error::custom("expected number or numeric string")),
    }
}

/// Accept a cast list as a JSON array or a comma-separated string.
fn deserialize_cast<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(raw) => Ok(split_names(&raw)),
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(name) => Some(name.trim().to_owned()),
                _ => None,
            })
            .filter(|name| !name.is_empty())
            .collect()),
        _ => Err(D::Error::custom("expected cast as string or array")),
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
