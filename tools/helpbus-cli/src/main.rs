use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{Level, info};

use helpbus_core::catalog::{demo_catalog, parse_catalog};
use helpbus_core::geocode::NominatimGeocoder;
use helpbus_core::location::{FixedLocation, cache_user_location, cached_user_location};
use helpbus_core::storage::SqliteStore;
use helpbus_core::transit::prelude::*;
use helpbus_core::{Config, RouteRequest, TripPlanner, plan_route};

mod output;

#[derive(Parser, Debug)]
#[command(
    name = "helpbus",
    author,
    version,
    about = "Find bus lines serving a destination",
    long_about = "Geocodes a destination, suggests the bus lines with a stop nearby, \
                  and shows the route of a line with travel time, the stop closest \
                  to you, and the next stops.\n\n\
                  Recent searches, favorite lines and your last known position are \
                  kept in a small SQLite database."
)]
struct Args {
    /// Line catalog JSON file (defaults to the built-in demo lines)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// SQLite database for recents, favorites and the cached position
    #[arg(long, global = true, env = "HELPBUS_DATABASE")]
    database: Option<PathBuf>,

    /// Max distance in meters between the destination and a stop
    #[arg(long, global = true)]
    radius: Option<f64>,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every line in the catalog
    Lines,

    /// Suggest lines for a destination
    Search {
        /// Free-text destination, e.g. "Trindade, Florianópolis"
        destination: String,

        /// Where the trip starts (defaults to your position)
        #[arg(long)]
        origin: Option<String>,

        /// Pick one of the suggested lines and show its route
        #[arg(long)]
        select: Option<String>,
    },

    /// Show the route of a line
    Route {
        /// Line id from the catalog
        line: Option<String>,

        /// Map-page query string (line=...&userLat=...)
        #[arg(long, conflicts_with = "line")]
        query: Option<String>,

        #[arg(long, requires = "user_lng", allow_negative_numbers = true)]
        user_lat: Option<f64>,

        #[arg(long, requires = "user_lat", allow_negative_numbers = true)]
        user_lng: Option<f64>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches
    Recents {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Add a line to favorites, or remove it if already there
    Favorite {
        line: String,
    },

    /// Show favorite lines
    Favorites,

    /// Remember your current position
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

fn load_catalog(path: Option<&Path>) -> Result<StaticLineCatalog> {
    let Some(path) = path else {
        return demo_catalog().context("Failed to load demo catalog");
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let lines = parse_catalog(&json).with_context(|| format!("Invalid catalog {}", path.display()))?;

    info!("Loaded {} lines from {}", lines.len(), path.display());
    Ok(StaticLineCatalog::from_lines(lines))
}

fn find_line(catalog: &dyn LineCatalog, id: &str) -> Result<Arc<Line>> {
    match catalog.get_line(&LineIdentifier::new(id)) {
        Some(line) => Ok(line),
        None => bail!("No line '{}' in the catalog (try `helpbus lines`)", id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut config = Config::from_env();
    if let Some(radius) = args.radius {
        if !(radius > 0.0 && radius.is_finite()) {
            bail!("--radius must be a positive number of meters, got {}", radius);
        }
        config.search_radius_m = radius;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    let catalog = load_catalog(args.catalog.as_deref())?;
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    let geocoder = NominatimGeocoder::new(&config.geocoder).context("Failed to set up geocoder")?;
    let planner = TripPlanner::new(config, Arc::new(catalog), geocoder, store);

    match args.command {
        Command::Lines => {
            output::print_lines(planner.catalog().all_lines());
        }

        Command::Search {
            destination,
            origin,
            select,
        } => {
            let search = planner
                .search_destination(&destination, None, origin.as_deref())
                .await
                .with_context(|| format!("Search for '{}' failed", destination))?;
            output::print_suggestions(&search);

            if let Some(id) = select {
                let line = find_line(planner.catalog(), &id)?;
                if !search.suggestions.lines().iter().any(|l| l.id() == line.id()) {
                    info!("Line {} was not among the suggestions", line.number());
                }

                let request = planner.select_line(
                    &line,
                    Some(search.destination.position),
                    origin.as_deref(),
                    &search.destination.name,
                )?;
                println!();
                println!("map.html?{}", request.to_query()?);

                let source = FixedLocation(None);
                let view = plan_route(&request, &source, planner.config().location_timeout).await?;
                output::print_view(&view);
            }
        }

        Command::Route {
            line,
            query,
            user_lat,
            user_lng,
            json,
        } => {
            let mut request = match (query, line) {
                (Some(query), _) => RouteRequest::from_query(&query).context("Invalid query string")?,
                (None, Some(id)) => RouteRequest {
                    line: Some((*find_line(planner.catalog(), &id)?).clone()),
                    ..RouteRequest::default()
                },
                (None, None) => RouteRequest::default(),
            };

            if let (Some(lat), Some(lng)) = (user_lat, user_lng) {
                let position = Coordinate::try_new(lat, lng).context("Invalid --user-lat/--user-lng")?;
                request.user = Some(position);
            }

            // No device GPS here: the last position saved with `locate` stands in
            let cached = cached_user_location(planner.store(), planner.config().location_max_age, Utc::now())?;
            let source = FixedLocation(cached);

            let view = plan_route(&request, &source, planner.config().location_timeout).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_view(&view);
            }
        }

        Command::Recents { clear } => {
            if clear {
                planner.recents().clear()?;
                info!("Cleared recent searches");
            } else {
                output::print_recents(&planner.recents().load()?);
            }
        }

        Command::Favorite { line } => {
            let line = find_line(planner.catalog(), &line)?;
            if planner.toggle_favorite(&line)? {
                println!("★ {} {} added to favorites", line.number(), line.name());
            } else {
                println!("{} {} removed from favorites", line.number(), line.name());
            }
        }

        Command::Favorites => {
            output::print_favorites(&planner.favorites().load()?);
        }

        Command::Locate { lat, lng } => {
            let position = Coordinate::try_new(lat, lng).context("Invalid --lat/--lng")?;
            cache_user_location(planner.store(), position, Utc::now())?;
            info!("Saved position {}", position);

            if let Some(closest) = planner.catalog().nearest_stops(position, 1).first() {
                println!(
                    "Closest stop: {} (line {}), {:.0} m",
                    closest.stop.name,
                    closest.line.number(),
                    closest.distance_m
                );
            }
        }
    }

    Ok(())
}
