mod config;
mod error;
mod logging;
mod ports;
mod services;
mod spotify_rs;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    logging::init_tracing,
    ports::spotify::SpotifyClient,
    services::{
        curation::{CurationService, RemovalMode, RunReport},
        spotify::client::SpotifyHttpAdapter,
        track_store::JsonTrackStore,
    },
    spotify_rs::auth::{LoginOutcome, TokenCache, login},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_CURATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the playlist snapshots and the auth token
    #[arg(long, env = "CACHE_DIR", global = true)]
    cache_dir: Option<String>,

    /// Only curate playlists owned by this Spotify user (default: the logged in user)
    #[arg(short, long, env = "SPOTIFY_USERNAME", global = true)]
    username: Option<String>,

    /// Log filter, e.g. `info` or `playlist_curator=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Export traces to this OTLP gRPC endpoint
    #[arg(long, env = "OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in to Spotify and cache the access token
    Login {
        /// The URL Spotify redirected to after authorizing this application
        #[arg(long, env = "RESPONSE_URL")]
        response_url: Option<String>,
    },
    /// Refresh the local cache of playlists that changed
    Sync,
    /// Sync, then remove disliked and already-sorted tracks and report duplicates
    Run {
        /// Log removals instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Report probable duplicate tracks from the local cache
    Duplicates,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(args.otlp_endpoint.as_deref(), &args.log_level)?;

    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider {
        tracer_provider
            .shutdown()
            .wrap_err("Failed to flush traces")?;
    }
    result
}

async fn run(args: Args) -> Result<()> {
    tracing::debug!("Loading configuration");
    let mut config = {
        if let Some(ref config) = args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load playlist-curator config")?;

    if let Some(cache_dir) = args.cache_dir {
        config.set_cache_dir(cache_dir);
    }
    if args.username.is_some() {
        config.username = args.username;
    }

    match args.command {
        Commands::Config(ConfigCommands::CreateDefault) => {
            let path = Config::create_default()?;
            tracing::info!("Default config available at {}", path.display());
            Ok(())
        }
        Commands::Config(ConfigCommands::Path) => {
            match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            }
            Ok(())
        }
        Commands::Login { response_url } => {
            authenticate(&config, response_url.as_deref()).await?;
            Ok(())
        }
        Commands::Sync => {
            let Some(client) = authenticate(&config, None).await? else {
                return Ok(());
            };
            let service = curation_service(&config, client).await?;
            print_report(&service.sync().await?);
            Ok(())
        }
        Commands::Run { dry_run } => {
            let Some(client) = authenticate(&config, None).await? else {
                return Ok(());
            };
            let removal_mode = if dry_run {
                RemovalMode::DryRun
            } else {
                RemovalMode::Apply
            };
            let service = curation_service(&config, client)
                .await?
                .with_removal_mode(removal_mode);
            print_report(&service.run().await?);
            Ok(())
        }
        Commands::Duplicates => {
            let Some(client) = authenticate(&config, None).await? else {
                return Ok(());
            };
            let service = curation_service(&config, client).await?;
            print_report(&service.duplicates().await?);
            Ok(())
        }
    }
}

/// `None` when the user still has to authorize the application.
async fn authenticate(
    config: &Config,
    response_url: Option<&str>,
) -> Result<Option<SpotifyHttpAdapter>> {
    let credentials = config.spotify_config()?;
    let cache = TokenCache::new(&config.cache_dir_path());

    match login(&credentials, &cache, response_url).await? {
        LoginOutcome::Authenticated(token) => {
            Ok(Some(SpotifyHttpAdapter::new(token.access_token)))
        }
        LoginOutcome::AuthorizationRequired { url } => {
            tracing::warn!(
                "Access token not found. Open the URL below to authorize this application, \
                 then run `login --response-url <URL Spotify redirected to>`"
            );
            println!("{}", url);
            Ok(None)
        }
    }
}

async fn curation_service<C: SpotifyClient>(
    config: &Config,
    client: C,
) -> Result<CurationService<C, JsonTrackStore>> {
    let owner_id = match config.username {
        Some(ref username) => username.clone(),
        None => client
            .current_user_id()
            .await
            .wrap_err("Failed to get the current Spotify user")?,
    };
    let store = JsonTrackStore::in_cache_dir(&config.cache_dir_path());
    Ok(CurationService::new(client, store, owner_id))
}

fn print_report(report: &RunReport) {
    println!("Playlists: {}", report.playlists);
    for name in &report.refreshed {
        println!("Refreshed cache: {}", name);
    }
    for (name, removed) in &report.removed {
        println!("Removed {} tracks from {}: {}", removed.len(), name, removed.join(", "));
    }
    for (name, duplicates) in &report.duplicates {
        println!(
            "Possible duplicates in {}: {}",
            name,
            duplicates.join(", ")
        );
    }
    for failure in &report.failures {
        match failure.playlist {
            Some(ref playlist) => {
                println!("Failed {} for {}: {}", failure.stage, playlist, failure.error)
            }
            None => println!("Failed {}: {}", failure.stage, failure.error),
        }
    }
}
