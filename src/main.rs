//! canopy - taxon and sponsorship search over a JSON dataset.
//!
//! CLI entry point. Loads a dataset into the in-memory store and runs
//! the search engines against it; results print as JSON on stdout.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use canopy::config::SearchConfig;
use canopy::core::{primary_subtag, Page, Restrict};
use canopy::error::CanopyError;
use canopy::query::{plan_query, tokenize};
use canopy::search::{
    pick_best_vernaculars, resolve_names, CancelToken, NameSearchRequest, SearchEngine,
    SponsorSearchRequest,
};
use canopy::store::{EntityStore, MemoryEntityStore};

/// canopy - taxon and sponsorship search over a JSON dataset
#[derive(Parser)]
#[command(name = "canopy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON dataset to search
    #[arg(long, global = true, default_value = "dataset.json")]
    dataset: PathBuf,

    /// Language for vernacular matching (Accept-Language form accepted)
    #[arg(long, global = true, default_value = "en")]
    lang: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combined search: taxa first, sponsors gated behind sparse results
    Search {
        /// The query text
        query: String,
    },
    /// Taxon name search over scientific and vernacular names
    Names {
        query: String,
        /// Order hits by popularity, descending
        #[arg(long)]
        sorted: bool,
        /// Surface leaf prices in the hits
        #[arg(long)]
        include_price: bool,
        /// Restrict to one collection: "leaves" or "nodes"
        #[arg(long)]
        restrict: Option<String>,
        /// Maximum hits per collection
        #[arg(long)]
        limit: Option<String>,
        /// Hits to skip per collection
        #[arg(long)]
        start: Option<String>,
    },
    /// Sponsorship/dedication text search
    Sponsors {
        query: String,
        /// Sponsorship kind filter; "all" searches every kind
        #[arg(long, default_value = "all")]
        kind: String,
        /// Order each tier by recency
        #[arg(long)]
        sorted: bool,
        /// Attach a best-image reference per matched taxon
        #[arg(long)]
        default_images: bool,
        #[arg(long)]
        limit: Option<String>,
        #[arg(long)]
        start: Option<String>,
    },
    /// Inspect the vernacular resolver's view of a query
    Resolve {
        query: String,
        /// Cross-reference keys to resolve, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        keys: Vec<i64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("canopy: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> canopy::Result<()> {
    let json = fs::read_to_string(&cli.dataset)
        .map_err(|err| CanopyError::dataset(format!("{}: {}", cli.dataset.display(), err)))?;
    let store = MemoryEntityStore::from_json(&json)?;
    let engine = SearchEngine::with_config(store, SearchConfig::load());
    let cancel = CancelToken::new();

    match cli.command {
        Commands::Search { query } => {
            print_json(&engine.search(&query, &cli.lang, &cancel)?)?;
        }
        Commands::Names {
            query,
            sorted,
            include_price,
            restrict,
            limit,
            start,
        } => {
            let req = NameSearchRequest::new(query, &cli.lang)
                .order_by_popularity(sorted)
                .include_price(include_price)
                .restrict(Restrict::from_param(restrict.as_deref()))
                .page(Page::from_params(limit.as_deref(), start.as_deref()));
            print_json(&engine.search_names(&req, &cancel)?)?;
        }
        Commands::Sponsors {
            query,
            kind,
            sorted,
            default_images,
            limit,
            start,
        } => {
            let mut req = SponsorSearchRequest::new(query, &cli.lang)
                .order_by_recent(sorted)
                .default_images(default_images)
                .page(Page::from_params(limit.as_deref(), start.as_deref()));
            if !kind.is_empty() && kind != "all" {
                req = req.kind(kind);
            }
            print_json(&engine.search_sponsors(&req, &cancel)?)?;
        }
        Commands::Resolve { query, keys } => {
            let lang_primary = primary_subtag(&cli.lang);
            let Some(strategy) =
                plan_query(&query, &lang_primary, engine.config().min_index_token_len)
            else {
                println!("{{}}");
                tracing::warn!("query rejected by the short-token guard");
                return Ok(());
            };
            let resolved =
                resolve_names(engine.store(), &keys, &[], &strategy, &lang_primary)?;
            let rows = engine
                .store()
                .vernaculars_by_key(&keys, &strategy, &lang_primary)?;
            let best = pick_best_vernaculars(
                &rows,
                &tokenize(&query),
                engine.config().order_sensitive_match,
            );
            print_json(&serde_json::json!({
                "resolved": resolved,
                "best": best,
            }))?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> canopy::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
