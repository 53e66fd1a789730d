//! Lookoot CLI - Fixture loading, search and store pages against the
//! in-memory backend.
//!
//! # Usage
//!
//! ```bash
//! # Check a fixture file loads
//! lookoot seed crates/cli/fixtures/glasgow.yaml
//!
//! # Search items and stores
//! lookoot search crates/cli/fixtures/glasgow.yaml shoe --sort price-ascending
//!
//! # Narrow by category and distance from a point
//! lookoot search crates/cli/fixtures/glasgow.yaml --category Footwear \
//!     --radius 2 --lat 55.8642 --lon -4.2518
//!
//! # Show a store page
//! lookoot store crates/cli/fixtures/glasgow.yaml shoe-world
//!
//! # Render a push message
//! lookoot notify message.json
//! ```
//!
//! # Environment Variables
//!
//! See `lookoot_client::config` for the `LOOKOOT_*` settings. `RUST_LOG`
//! controls log output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lookoot_client::AppState;
use lookoot_client::config::ClientConfig;
use lookoot_client::db::StoreRepository;
use lookoot_client::search::SortOption;
use lookoot_core::GeoPoint;

mod commands;

use commands::fixture::{Fixture, FixtureCounts};
use commands::search::SearchOptions;

#[derive(Parser)]
#[command(name = "lookoot")]
#[command(author, version, about = "Lookoot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a fixture and report what it contains
    Seed {
        /// Path to the YAML fixture
        fixture: String,
    },
    /// Search items and stores in a fixture
    Search {
        /// Path to the YAML fixture
        fixture: String,

        /// Search text; empty lists everything
        #[arg(default_value = "")]
        query: String,

        /// Sort order, repeatable; earlier orders take precedence
        #[arg(short, long, value_parser = commands::search::parse_sort)]
        sort: Vec<SortOption>,

        /// Only show results in this category, repeatable
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Search radius in kilometres
        #[arg(short, long)]
        radius: Option<f64>,

        /// Latitude of the search origin
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the search origin
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Show a store with its items and reviews
    Store {
        /// Path to the YAML fixture
        fixture: String,

        /// Store ID
        id: String,
    },
    /// Render a JSON push message as local notifications
    Notify {
        /// Path to the JSON message
        message: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Results go to stdout; keep logs quiet unless RUST_LOG asks otherwise
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lookoot=warn,lookoot_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { fixture } => {
            let (state, counts) = load_state(&fixture).await?;
            print_summary(&fixture, counts, &state).await?;
        }
        Commands::Search {
            fixture,
            query,
            sort,
            categories,
            radius,
            lat,
            lon,
        } => {
            let (state, _) = load_state(&fixture).await?;
            let options = SearchOptions {
                sort,
                categories,
                radius_km: radius,
                location: lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon)),
            };
            commands::search::run(&state, &query, options).await?;
        }
        Commands::Store { fixture, id } => {
            let (state, _) = load_state(&fixture).await?;
            commands::store::show(&state, &id).await?;
        }
        Commands::Notify { message } => commands::notify::push(&message).await?,
    }
    Ok(())
}

/// In-memory state populated from a fixture file.
async fn load_state(
    fixture: &str,
) -> Result<(AppState, FixtureCounts), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let state = AppState::in_memory(config);
    let counts = Fixture::load(fixture).await?.apply(state.store()).await?;
    Ok((state, counts))
}

#[allow(clippy::print_stdout)]
async fn print_summary(
    fixture: &str,
    counts: FixtureCounts,
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{fixture}: {} document(s)", counts.total());
    println!("  {} user(s)", counts.users);
    println!("  {} item(s)", counts.items);
    println!("  {} store(s)", counts.stores);

    let stores = state.stores();
    for store in StoreRepository::new(state.store()).list_all().await? {
        let detail = stores.store_detail(&store.id).await?;
        println!(
            "    {}: {} item(s), {} review(s)",
            detail.store.name,
            detail.items.len(),
            detail.reviews.len()
        );
    }
    Ok(())
}
