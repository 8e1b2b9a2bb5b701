
use std::io::IsTerminal;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use companion::app::App;
use companion::components::add_item_modal::RATING_RANGE;
use companion::components::delete_account_modal::CONFIRMATION_WORD;
use companion::components::recommendation_modal::{ConfidenceBand, match_percent};
use companion::config::{ClientConfig, ConfigError, normalize_base_url};
use companion::net::error::ApiError;
use companion::net::types::{CatalogItem, ItemKind, Tab};
use companion::pages::admin::{AdminError, BookForm, MovieForm};
use companion::pages::home::ListingView;
use companion::pages::welcome::OnboardingError;
use companion::router::Route;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Onboarding(#[from] OnboardingError),
    #[error("{0}")]
    Admin(#[from] AdminError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("stdin read failed: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Parser, Debug)]
#[command(name = "companion-cli", about = "Movie and book companion client")]
struct Cli {
    /// Overrides `COMPANION_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Raw `Cookie` header; overrides `COMPANION_COOKIE`.
    #[arg(long)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the Google sign-in URL.
    Login,
    /// Exchange OAuth callback parameters for a session.
    Callback {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },
    /// Show the current session.
    Whoami,
    /// Resolve where a location lands after the route guards run.
    Open { location: String },
    Logout,
    /// List the signed-in user's items.
    Listings(ListingsArgs),
    /// Read search text from stdin, one line per keystroke burst, and list
    /// the debounced results.
    Search {
        #[arg(long, default_value = "all")]
        tab: Tab,
    },
    /// Search the catalogue and rate one result.
    Add(AddArgs),
    Update {
        kind: ItemKind,
        id: i64,
        /// JSON object with the changed fields.
        #[arg(long)]
        data: String,
    },
    Remove {
        kind: ItemKind,
        id: i64,
    },
    /// Generate recommendations.
    Recommend {
        #[arg(long, default_value = "all")]
        tab: Tab,
    },
    Onboarding(OnboardingCommand),
    /// Record the user's age.
    Age { age: u32 },
    /// Permanently delete the account.
    DeleteAccount {
        /// Must be the word `delete`.
        #[arg(long)]
        confirm: String,
    },
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct ListingsArgs {
    #[arg(long, default_value = "all")]
    tab: Tab,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    query: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    kind: ItemKind,
    query: String,
    /// Zero-based index into the search results.
    #[arg(long, default_value_t = 0)]
    pick: usize,
    #[arg(long)]
    rating: u8,
    #[arg(long, default_value = "")]
    review: String,
}

#[derive(Args, Debug)]
struct OnboardingCommand {
    #[command(subcommand)]
    command: OnboardingSubcommand,
}

#[derive(Subcommand, Debug)]
enum OnboardingSubcommand {
    Status,
    Complete,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Movie {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        director: String,
        #[arg(long, default_value = "")]
        cast: String,
        #[arg(long)]
        release_date: String,
        #[arg(long)]
        language: String,
        #[arg(long, default_value = "")]
        genres: String,
        #[arg(long, default_value = "")]
        poster_path: String,
    },
    Book {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = normalize_base_url(base_url)?;
    }
    if cli.cookie.is_some() {
        config.cookie = cli.cookie;
    }
    tracing::debug!(base_url = %config.base_url, cookie = config.cookie.is_some(), "client configured");
    let app = App::new(config)?;

    match cli.command {
        Command::Login => {
            let url = app.auth().initiate_login().await?;
            print_json(&json!({ "auth_url": url }))
        }
        Command::Callback { code, state } => {
            let route = app.auth().handle_callback(&code, &state).await;
            let route = app.navigator().navigate(route).await;
            print_session(&app, route)
        }
        Command::Whoami => {
            let route = app.start(Route::Home.path()).await;
            print_session(&app, route)
        }
        Command::Open { location } => {
            let route = app.start(&location).await;
            print_json(&json!({ "route": route.path() }))
        }
        Command::Logout => {
            let route = app.logout().await;
            print_json(&json!({ "route": route.path() }))
        }
        Command::Listings(args) => run_listings(&app, args).await,
        Command::Search { tab } => run_search(&app, tab).await,
        Command::Add(args) => run_add(&app, args).await,
        Command::Update { kind, id, data } => {
            let changes = serde_json::from_str::<Value>(&data)?;
            let mut view = app.listing_view();
            view.update_item(kind, id, &changes).await?;
            print_listing(&view)
        }
        Command::Remove { kind, id } => {
            let mut view = app.listing_view();
            view.remove_item(kind, id).await?;
            print_listing(&view)
        }
        Command::Recommend { tab } => run_recommend(&app, tab).await,
        Command::Onboarding(onboarding) => run_onboarding(&app, onboarding).await,
        Command::Age { age } => {
            app.welcome_view().set_age(age).await?;
            print_json(&json!({ "age": age }))
        }
        Command::DeleteAccount { confirm } => {
            let mut dialog = app.delete_account_dialog();
            dialog.set_confirm_text(&confirm);
            match dialog.confirm(app.auth()).await? {
                Some(route) => print_json(&json!({ "deleted": true, "route": route.path() })),
                None => Err(CliError::Rejected(format!("type `{CONFIRMATION_WORD}` to confirm"))),
            }
        }
        Command::Admin(admin) => run_admin(&app, admin).await,
    }
}

async fn run_listings(app: &App, args: ListingsArgs) -> Result<(), CliError> {
    let mut view = app.listing_view();
    if args.tab == view.active_tab() {
        view.load().await?;
    } else {
        view.set_tab(args.tab).await?;
    }
    if let Some(query) = args.query {
        view.search_input(&query);
        view.settle_search().await?;
    }
    view.change_page(args.page).await?;
    print_listing(&view)
}

async fn run_search(app: &App, tab: Tab) -> Result<(), CliError> {
    let mut view = app.listing_view();
    view.set_tab(tab).await?;
    if std::io::stdin().is_terminal() {
        eprintln!("type a search and press enter; ctrl-d to finish");
    }

    let (tx, rx) = mpsc::channel(16);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if tx.send(line).await.is_err() {
                break;
            }
        }
        Ok::<(), std::io::Error>(())
    });

    view.run_search_loop(rx).await;
    reader
        .await
        .map_err(|e| CliError::Rejected(format!("stdin reader stopped: {e}")))??;
    if let Some(error) = view.error() {
        return Err(CliError::Rejected(error.to_owned()));
    }
    print_listing(&view)
}

async fn run_add(app: &App, args: AddArgs) -> Result<(), CliError> {
    let mut modal = app.add_item_modal(args.kind);
    modal.search(&args.query).await?;
    if !modal.select(args.pick) {
        return Err(CliError::Rejected(format!(
            "no selectable result at index {} ({} found)",
            args.pick,
            modal.results().len()
        )));
    }
    if !modal.set_rating(args.rating) {
        return Err(CliError::Rejected(format!(
            "rating must be between {} and {}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )));
    }
    modal.set_review(&args.review);
    let review = modal
        .review()
        .ok_or_else(|| CliError::Rejected("nothing to submit".to_owned()))?;

    let mut welcome = app.welcome_view();
    welcome.submit_review(&review).await?;
    print_json(&json!({ "review": review, "progress": welcome.progress() }))
}

async fn run_recommend(app: &App, tab: Tab) -> Result<(), CliError> {
    let mut view = app.recommendations_view();
    view.set_tab(tab).await;
    let rows: Vec<Value> = view
        .filtered()
        .into_iter()
        .map(|item| {
            json!({
                "title": item.title,
                "type": item.kind,
                "match": match_percent(item.confidence),
                "band": format!("{:?}", ConfidenceBand::from_score(item.confidence)),
                "description": item.description,
            })
        })
        .collect();
    print_json(&Value::Array(rows))
}

async fn run_onboarding(app: &App, onboarding: OnboardingCommand) -> Result<(), CliError> {
    let mut view = app.welcome_view();
    match onboarding.command {
        OnboardingSubcommand::Status => {
            view.refresh().await?;
            print_json(&json!({ "progress": view.progress(), "can_complete": view.can_complete() }))
        }
        OnboardingSubcommand::Complete => {
            view.refresh().await?;
            let route = view.complete().await?;
            print_json(&json!({ "route": route.path() }))
        }
    }
}

async fn run_admin(app: &App, admin: AdminCommand) -> Result<(), CliError> {
    let mut view = app.admin_view();
    match admin.command {
        AdminSubcommand::Movie { id, title, director, cast, release_date, language, genres, poster_path } => {
            view.movie = MovieForm {
                id,
                title,
                director,
                cast,
                release_date,
                original_language: language,
                genres,
                poster_path,
            };
            view.submit_movie().await.map_err(report_form_errors)?;
        }
        AdminSubcommand::Book { isbn, title, author, year, image_url } => {
            view.book = BookForm {
                isbn,
                book_title: title,
                book_author: author,
                year_of_publication: year,
                image_url_s: image_url,
            };
            view.submit_book().await.map_err(report_form_errors)?;
        }
    }
    let text = view.message().map(|message| message.text.clone());
    print_json(&json!({ "message": text }))
}

/// List each rejected field on stderr before the error is returned.
fn report_form_errors(error: AdminError) -> AdminError {
    if let AdminError::Invalid(errors) = &error {
        for form_error in errors {
            eprintln!("  {}: {form_error}", form_error.field());
        }
    }
    error
}

fn print_session(app: &App, route: Route) -> Result<(), CliError> {
    let state = app.store().snapshot();
    print_json(&json!({
        "logged_in": state.is_logged_in(),
        "admin": state.is_admin(),
        "user": state.user(),
        "route": route.path(),
    }))
}

fn print_listing(view: &ListingView) -> Result<(), CliError> {
    let items: Vec<Value> = view
        .items()
        .into_iter()
        .map(|item| match item {
            CatalogItem::Movie(movie) => json!({ "type": "movie", "item": movie }),
            CatalogItem::Book(book) => json!({ "type": "book", "item": book }),
        })
        .collect();
    print_json(&json!({
        "tab": view.active_tab(),
        "query": view.search_query(),
        "page": view.current_page(),
        "total_pages": view.total_pages(),
        "pages": view.page_numbers(),
        "items": items,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
