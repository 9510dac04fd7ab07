//! cinelist - search OMDb and keep a local list of favorite movies.

/// Application configuration (TOML).
mod config;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use cinelist_api::omdb::{LocalOmdbApi, MovieDetail, MovieSummary, OmdbClient};
use cinelist_core::{
    DetailsController, FavoritesController, ListController, ListState, MovieRepository,
    SortOption, favorite_from_detail, summary_from_favorite,
};
use cinelist_db::{FavoriteStore, SqliteFavoriteStore};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search OMDb by title.
    Search(SearchArgs),
    /// Show the full record of one movie.
    Details(DetailsArgs),
    /// Manage favorites.
    Favorites(FavoritesCommand),
    /// Browse search results interactively (one command per line).
    Browse(BrowseArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for (e.g. "batman").
    #[arg(long, required = true)]
    query: String,
    /// Number of pages to load.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Sort the loaded results: "year", "title" or "none".
    #[arg(long)]
    sort: Option<SortOption>,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// IMDb ID (e.g. "tt0372784").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List stored favorites.
    List,
    /// Add or remove a favorite by IMDb ID.
    Toggle(ToggleArgs),
}

/// Arguments for the `favorites toggle` subcommand.
#[derive(clap::Args)]
struct ToggleArgs {
    /// IMDb ID (e.g. "tt0372784").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Initial query (default: `[search] default_query`).
    #[arg(long)]
    query: Option<String>,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    AppConfig::load(&path)
}

/// Builds an `OmdbClient` from config and `OMDB_API_KEY`.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_omdb_client(config: &AppConfig) -> Result<OmdbClient> {
    let api_key = config.api_key(std::env::var(config::API_KEY_ENV).ok())?;

    let mut builder = OmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(base_url) = config.omdb.base_url.as_deref() {
        let url = base_url
            .parse::<url::Url>()
            .with_context(|| format!("invalid [omdb] base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(interval) = config.min_interval() {
        builder = builder.min_interval(interval);
    }
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build OMDb client")
}

/// Opens the favorites store and wires it to a new OMDb client.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the database cannot be opened.
fn build_repository(
    config: &AppConfig,
    dir: Option<&PathBuf>,
) -> Result<Arc<MovieRepository<OmdbClient>>> {
    let client = build_omdb_client(config)?;
    let store = SqliteFavoriteStore::open(dir.map(PathBuf::as_path))
        .context("failed to open favorites database")?;
    let repository = MovieRepository::new(client, Arc::new(store))?;
    Ok(Arc::new(repository))
}

/// Logs one result row per movie.
fn log_movies(movies: &[MovieSummary]) {
    tracing::info!("Fav\timdbID\t\tYear\t\tType\tTitle");
    for movie in movies {
        tracing::info!(
            "{}\t{}\t{}\t\t{}\t{}",
            if movie.favorite { "*" } else { "-" },
            movie.imdb_id,
            movie.year,
            movie.kind,
            movie.title,
        );
    }
}

/// Logs the fields of a detail record.
fn log_detail(detail: &MovieDetail) {
    tracing::info!("Title:    {} ({})", detail.title, detail.year);
    tracing::info!("imdbID:   {}", detail.imdb_id);
    tracing::info!("Genre:    {}", detail.genre);
    tracing::info!("Director: {}", detail.director);
    tracing::info!("Writer:   {}", detail.writer);
    tracing::info!("Actors:   {}", detail.actors);
    tracing::info!("Plot:     {}", detail.plot);
    tracing::info!("Poster:   {}", detail.poster);
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the repository cannot be built or a page fails to load.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let repository = build_repository(&config, dir)?;
    let mut list = ListController::new(repository, config.search.default_query.clone());

    if !list.submit_search(&args.query).await {
        bail!("search query must not be blank");
    }
    for _ in 1..args.pages {
        if !list.load_next_page().await {
            break;
        }
        if list.state() == ListState::Error {
            break;
        }
    }
    if let Some(err) = list.error() {
        bail!("{err}");
    }
    if let Some(option) = args.sort {
        list.sort(option);
    }

    log_movies(list.visible_movies());
    tracing::info!(
        "Loaded {} movies ({} of {} pages)",
        list.movies().len(),
        list.current_page(),
        list.total_pages()
    );
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the repository cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let repository = build_repository(&config, dir)?;
    let details = DetailsController::new(repository);

    if !details.load_details(&args.id).await {
        bail!(
            "{}",
            details
                .error()
                .unwrap_or_else(|| String::from("unknown error"))
        );
    }
    if let Some(detail) = details.detail() {
        log_detail(&detail);
    }
    Ok(())
}

/// Runs the `favorites list` subcommand. Needs no API key.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read.
#[instrument(skip_all)]
fn run_favorites_list(dir: Option<&PathBuf>) -> Result<()> {
    let store = SqliteFavoriteStore::open(dir.map(PathBuf::as_path))
        .context("failed to open favorites database")?;
    let favorites: Vec<MovieSummary> = store
        .load_all()?
        .iter()
        .map(summary_from_favorite)
        .collect();

    if favorites.is_empty() {
        tracing::info!("No favorites yet.");
        return Ok(());
    }
    log_movies(&favorites);
    tracing::info!("Total: {} favorites", favorites.len());
    Ok(())
}

/// Runs the `favorites toggle` subcommand.
///
/// A stored favorite is removed; otherwise the movie is fetched and stored.
///
/// # Errors
///
/// Returns an error if the repository cannot be built or the detail fetch fails.
#[instrument(skip_all)]
async fn run_favorites_toggle(args: &ToggleArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let repository = build_repository(&config, dir)?;

    let movie = if repository.is_favorite(&args.id)? {
        MovieSummary {
            imdb_id: args.id.clone(),
            title: String::new(),
            year: String::new(),
            poster: String::new(),
            kind: String::new(),
            favorite: true,
        }
    } else {
        let detail = repository.movie_details(&args.id).await?;
        let mut movie = summary_from_favorite(&favorite_from_detail(&detail));
        movie.favorite = false;
        movie
    };

    repository.toggle_favorite(&movie);
    repository.flush_favorites().await;

    if movie.favorite {
        tracing::info!("Removed {} from favorites", args.id);
    } else {
        tracing::info!("Added {} ({}) to favorites", movie.title, args.id);
    }
    Ok(())
}

/// A parsed `browse` input line.
#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    Search(String),
    Next,
    Refresh,
    Sort(SortOption),
    Favorite(String),
    Details(String),
    Favorites,
    Help,
    Quit,
}

/// Parses one `browse` line. Blank lines yield `Ok(None)`.
fn parse_browse_command(line: &str) -> Result<Option<BrowseCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match verb {
        "search" | "s" => BrowseCommand::Search(String::from(rest)),
        "next" | "n" => BrowseCommand::Next,
        "refresh" | "r" => BrowseCommand::Refresh,
        "sort" => BrowseCommand::Sort(rest.parse()?),
        "fav" | "f" if !rest.is_empty() => BrowseCommand::Favorite(String::from(rest)),
        "details" | "d" if !rest.is_empty() => BrowseCommand::Details(String::from(rest)),
        "favorites" => BrowseCommand::Favorites,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "q" | "exit" => BrowseCommand::Quit,
        _ => bail!("unknown command: {line} (type \"help\")"),
    };
    Ok(Some(command))
}

/// Logs the `browse` command summary.
fn log_browse_help() {
    tracing::info!("Commands:");
    tracing::info!("  search <text>   new search from page 1");
    tracing::info!("  next            load the next page");
    tracing::info!("  refresh         reload page 1 and clear the sort");
    tracing::info!("  sort <option>   year | title | none");
    tracing::info!("  fav <imdbID>    toggle favorite");
    tracing::info!("  details <imdbID>");
    tracing::info!("  favorites       list stored favorites");
    tracing::info!("  quit");
}

/// Logs the list after a load, or its error.
fn log_list<A: LocalOmdbApi>(list: &ListController<A>) {
    if let Some(err) = list.error() {
        tracing::warn!("{err}");
        return;
    }
    log_movies(list.visible_movies());
    tracing::info!(
        "\"{}\": page {} of {} ({} movies{})",
        list.query(),
        list.current_page(),
        list.total_pages(),
        list.movies().len(),
        if list.has_more() { "" } else { ", end" }
    );
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the repository cannot be built or stdin fails.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let repository = build_repository(&config, dir)?;
    let mut list = ListController::new(
        Arc::clone(&repository),
        config.search.default_query.clone(),
    );
    let details = DetailsController::new(Arc::clone(&repository));
    let mut favorites = FavoritesController::new(repository.as_ref());

    let initial = args
        .query
        .clone()
        .unwrap_or_else(|| config.search.default_query.clone());
    list.submit_search(&initial).await;
    log_list(&list);
    log_browse_help();

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let command = match parse_browse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        match command {
            BrowseCommand::Search(query) => {
                if list.submit_search(&query).await {
                    log_list(&list);
                } else {
                    tracing::warn!("search text must not be blank");
                }
            }
            BrowseCommand::Next => {
                if list.load_next_page().await {
                    log_list(&list);
                } else {
                    tracing::info!("No more pages.");
                }
            }
            BrowseCommand::Refresh => {
                list.refresh().await;
                log_list(&list);
            }
            BrowseCommand::Sort(option) => {
                list.sort(option);
                log_movies(list.visible_movies());
            }
            BrowseCommand::Favorite(id) => match list.toggle_favorite(&id) {
                Some(true) => tracing::info!("Added {id} to favorites"),
                Some(false) => tracing::info!("Removed {id} from favorites"),
                None => tracing::warn!("{id} is not in the loaded results"),
            },
            BrowseCommand::Details(id) => {
                if details.load_details(&id).await {
                    if let Some(detail) = details.detail() {
                        log_detail(&detail);
                    }
                } else if let Some(err) = details.error() {
                    tracing::warn!("{err}");
                }
            }
            BrowseCommand::Favorites => {
                repository.flush_favorites().await;
                log_movies(&favorites.favorites());
            }
            BrowseCommand::Help => log_browse_help(),
            BrowseCommand::Quit => break,
        }

        repository.flush_favorites().await;
        list.sync_favorites();
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Details(args) => run_details(&args, cli.dir.as_ref()).await,
        Commands::Favorites(cmd) => match cmd.command {
            FavoritesSubcommands::List => run_favorites_list(cli.dir.as_ref()),
            FavoritesSubcommands::Toggle(args) => {
                run_favorites_toggle(&args, cli.dir.as_ref()).await
            }
        },
        Commands::Browse(args) => run_browse(&args, cli.dir.as_ref()).await,
    }
}
