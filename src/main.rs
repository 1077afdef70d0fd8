//! Cafe Scout CLI - inspect and seed the response cache
//!
//! Exits with status 1 when a lookup misses, so scripts can branch on it.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cafescout::cache::CacheManager;
use cafescout::cli::{self, Cli, Outcome};
use cafescout::config::Config;

/// Loads config, opens the cache and runs the parsed command
fn run(cli: &Cli) -> Result<Outcome, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = config.resolve_cache_path(cli.db.as_deref())?;

    let cache = CacheManager::open(&path)?;
    let mut stdout = io::stdout().lock();
    let outcome = cli::execute(&cli.command, &cache, config.default_ttl_hours, &mut stdout)?;
    stdout.flush()?;
    cache.close()?;
    Ok(outcome)
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cafescout=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Miss) => {
            eprintln!("miss");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
