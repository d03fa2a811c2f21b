//! dubdb CLI
//!
//! Populates the local dub-cast database by scraping season and actor
//! pages from the dub wiki. This is the write side of the store that
//! tvtidy reads during organize runs.

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tvtidy::services::scraper::{CastScraper, ScrapedActor, ScrapedCastEntry};
use tvtidy::services::store::SqliteDubStore;

/// dubdb - manage the local dub-cast database
#[derive(Parser, Debug)]
#[command(name = "dubdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(long, env = "DUBDB_PATH", default_value = "dubdb.sqlite3", value_name = "PATH")]
    db: PathBuf,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage seasons
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },

    /// Manage people
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },
}

#[derive(Subcommand, Debug)]
enum SeasonAction {
    /// List the seasons stored for a show
    List {
        /// TMDB id of the show
        #[arg(value_name = "SHOW_ID")]
        show_id: i64,
    },

    /// Scrape a season page and store its dub cast
    Scrape {
        /// URL of the season page
        #[arg(value_name = "URL")]
        url: String,

        /// TMDB id of the show
        #[arg(value_name = "SHOW_ID")]
        show_id: i64,

        /// Season number
        #[arg(value_name = "SEASON_NUMBER")]
        season_number: u32,

        /// Season name (defaults to "Season N")
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum PersonAction {
    /// Scrape an actor page and store the person
    Scrape {
        /// URL of the actor page
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = SqliteDubStore::create(&cli.db).await?;
    let scraper = CastScraper::new();

    match cli.command {
        Commands::Season { action } => match action {
            SeasonAction::List { show_id } => {
                list_seasons(&store, show_id).await?;
            }
            SeasonAction::Scrape {
                url,
                show_id,
                season_number,
                name,
            } => {
                scrape_season(&store, &scraper, &url, show_id, season_number, name).await?;
            }
        },
        Commands::Person { action } => match action {
            PersonAction::Scrape { url } => {
                let actor = scraper.scrape_actor(&url).await?;
                let id = store_person(&store, &actor).await?;
                println!("{} {} (id {id})", "Stored".green().bold(), actor.name);
            }
        },
    }

    Ok(())
}

async fn list_seasons(store: &SqliteDubStore, show_id: i64) -> anyhow::Result<()> {
    let seasons = store.list_seasons(show_id).await?;
    if seasons.is_empty() {
        println!("{}", "No seasons found in the database for that show".red());
        return Ok(());
    }

    let title = store
        .show_title(show_id)
        .await?
        .unwrap_or_else(|| format!("show {show_id}"));

    println!("{}", format!("Seasons of {title}").bold());
    for season in seasons {
        println!(
            "  {:>4}  S{:02}  {}",
            season.id, season.season_number, season.title
        );
    }

    Ok(())
}

async fn scrape_season(
    store: &SqliteDubStore,
    scraper: &CastScraper,
    url: &str,
    show_id: i64,
    season_number: u32,
    name: Option<String>,
) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| format!("Season {season_number}"));
    println!(
        "{}",
        format!("Scraping season {season_number} - {name} from {url}...").blue()
    );

    let season = scraper.scrape_season(url).await?;
    let show_title = season.title.clone().unwrap_or_else(|| name.clone());

    let show_row_id = store.create_show(show_id, &show_title).await?;
    let season_id = match store.create_season(show_row_id, &name, season_number).await {
        Ok(id) => {
            println!("{}", format!("Season {season_number} {name} created").green());
            id
        }
        Err(e) => match store.get_season_id(show_row_id, season_number).await? {
            // Already stored: reuse the row and keep adding cast.
            Some(id) => {
                println!(
                    "{}",
                    format!("Season {season_number} already in database: {e}").yellow()
                );
                id
            }
            None => return Err(e.into()),
        },
    };

    if season.cast.is_empty() {
        println!("{}", "No cast table found on the page".yellow());
        return Ok(());
    }

    let pb = ProgressBar::new(season.cast.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut stored = 0;
    let mut failed = 0;

    for entry in &season.cast {
        pb.set_message(entry.name.clone());

        match store_cast_entry(store, scraper, entry, show_row_id, season_id).await {
            Ok(()) => stored += 1,
            Err(e) => {
                tracing::error!("Failed to store {}: {e}", entry.name);
                failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "{} {stored} cast entries stored, {failed} failed",
        "Summary:".bold()
    );

    Ok(())
}

async fn store_cast_entry(
    store: &SqliteDubStore,
    scraper: &CastScraper,
    entry: &ScrapedCastEntry,
    show_row_id: i64,
    season_id: i64,
) -> anyhow::Result<()> {
    // Linked actors get their own page scraped for the full record.
    let actor = match &entry.url {
        Some(url) => scraper.scrape_actor(url).await.unwrap_or_else(|e| {
            tracing::warn!("Actor page scrape failed for {}: {e}", entry.name);
            ScrapedActor {
                name: entry.name.clone(),
                ..Default::default()
            }
        }),
        None => ScrapedActor {
            name: entry.name.clone(),
            ..Default::default()
        },
    };

    let people_id = store_person(store, &actor).await?;

    if let Err(e) = store
        .create_role("actor", &entry.role, people_id, show_row_id, season_id)
        .await
    {
        // Duplicate roles from a re-run are fine.
        tracing::debug!("Role {} already recorded: {e}", entry.role);
    }

    Ok(())
}

async fn store_person(store: &SqliteDubStore, actor: &ScrapedActor) -> anyhow::Result<i64> {
    match store
        .create_person(
            &actor.name,
            actor.full_name.as_deref(),
            actor.birth_date.as_deref(),
            actor.birth_year,
            actor.birth_place.as_deref(),
            actor.known_for.as_deref(),
            actor.biography.as_deref(),
            actor.photo_url.as_deref(),
        )
        .await
    {
        Ok(id) => Ok(id),
        Err(e) => match store.get_person_by_name(&actor.name).await? {
            Some(person) => {
                tracing::debug!("Person {} already in database", person.name);
                Ok(person.id)
            }
            None => Err(e.into()),
        },
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tvtidy=debug,dubdb=debug")
    } else {
        EnvFilter::new("tvtidy=info,dubdb=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
