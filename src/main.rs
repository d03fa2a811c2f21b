//! tvtidy CLI
//!
//! Organizes a directory of TV episode files: renames them against TMDB
//! metadata and writes NFO sidecars.

use clap::Parser;
use std::path::PathBuf;
use tvtidy::cli::args::Cli;
use tvtidy::core::reconciler::{OrganizeOptions, Outcome, Reconciler};
use tvtidy::preflight;
use tvtidy::services::probe::FfprobeProbe;
use tvtidy::services::store::{DubStore, SqliteDubStore};
use tvtidy::services::tmdb::TmdbClient;
use tvtidy::ui::{Panel, TermUi, Ui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, when present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if cli.movie {
        anyhow::bail!(tvtidy::Error::UnsupportedMode("movie".to_string()));
    }
    if cli.person {
        anyhow::bail!(tvtidy::Error::UnsupportedMode("person".to_string()));
    }

    // Run preflight checks unless skipped
    if !cli.skip_preflight {
        run_preflight_checks()?;
    }

    let directory = cli
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let provider = TmdbClient::from_env()?;
    let probe = FfprobeProbe::new();
    let ui = TermUi::new();

    // The dub store is optional: no path, or no database file, means the
    // run proceeds without local cast enrichment.
    let store = match &cli.dub_db {
        Some(path) if path.exists() => Some(SqliteDubStore::open(path).await?),
        Some(path) => {
            ui.render(
                Panel::Warning,
                &format!(
                    "Dub database {} not found, continuing without local cast",
                    path.display()
                ),
            );
            None
        }
        None => None,
    };

    let opts = OrganizeOptions {
        show_id: cli.media_id,
        directory,
        season: cli.season,
        suffix: cli.suffix.clone(),
        nfo_only: cli.nfo_only,
    };

    let reconciler = Reconciler::new(
        &provider,
        store.as_ref().map(|s| s as &dyn DubStore),
        &probe,
        &ui,
        opts,
    );

    match reconciler.run().await? {
        Outcome::Done => {}
        Outcome::Aborted => std::process::exit(0),
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tvtidy=debug")
    } else {
        EnvFilter::new("tvtidy=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
fn run_preflight_checks() -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks();
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
