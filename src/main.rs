//! yt-feeds - command-line front end for the GData feed client.
//!
//! Fetches one feed per invocation and writes the raw body to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yt_feeds::{ClientConfig, FeedClient, FeedRequest, OrderBy, Pagination, ResponseFormat};

#[derive(Parser, Debug)]
#[command(name = "yt-feeds", about = "Fetch raw GData video feeds")]
struct Args {
    /// Config file (defaults to <config dir>/yt-feeds/config.jsonc)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Developer key, overrides the config file
    #[arg(long, value_name = "KEY")]
    key: Option<String>,

    /// Base URL feed paths are appended to
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Response format: atom, rss or json
    #[arg(long, value_name = "FORMAT")]
    format: Option<ResponseFormat>,

    /// Fail on non-2xx responses instead of printing the body
    #[arg(long)]
    strict: bool,

    /// Log each request URL
    #[arg(long)]
    debug: bool,

    /// Print the request URL without fetching it
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

/// Pagination flags shared by paged feeds.
#[derive(clap::Args, Debug, Clone, Copy)]
struct PageArgs {
    /// Maximum number of entries (0 = server default)
    #[arg(long, default_value_t = 0)]
    max_results: u32,

    /// 1-based index of the first entry (0 = server default)
    #[arg(long, default_value_t = 0)]
    start_index: u32,
}

impl From<PageArgs> for Pagination {
    fn from(args: PageArgs) -> Self {
        Pagination::new(args.max_results, args.start_index)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// A user's playlists
    Playlists {
        username: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// A user's favorite videos
    Favorites { username: String },
    /// A single playlist
    Playlist { playlist_id: String },
    /// A single playlist entry
    Entry {
        playlist_id: String,
        entry_id: String,
    },
    /// A user's subscriptions
    Subscriptions {
        username: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// A user's uploads
    Uploads {
        username: String,
        #[command(flatten)]
        page: PageArgs,
        /// Sort order, e.g. published or viewCount (default: relevance)
        #[arg(long)]
        order_by: Option<OrderBy>,
    },
    /// Videos related to a video
    Related {
        video_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

impl From<Command> for FeedRequest {
    fn from(command: Command) -> Self {
        match command {
            Command::Playlists { username, page } => FeedRequest::UserPlaylists {
                username,
                page: page.into(),
            },
            Command::Favorites { username } => FeedRequest::UserFavorites { username },
            Command::Playlist { playlist_id } => FeedRequest::Playlist { playlist_id },
            Command::Entry {
                playlist_id,
                entry_id,
            } => FeedRequest::PlaylistEntry {
                playlist_id,
                entry_id,
            },
            Command::Subscriptions { username, page } => FeedRequest::UserSubscriptions {
                username,
                page: page.into(),
            },
            Command::Uploads {
                username,
                page,
                order_by,
            } => FeedRequest::UserUploads {
                username,
                page: page.into(),
                order_by,
            },
            Command::Related { video_id, page } => FeedRequest::RelatedVideos {
                video_id,
                page: page.into(),
            },
        }
    }
}

/// Overlay command-line flags on the loaded configuration.
///
/// Flags win over the config file; `--strict` and `--debug` can only turn
/// their setting on.
fn apply_args(mut config: ClientConfig, args: &Args) -> ClientConfig {
    if let Some(key) = &args.key {
        config = config.with_developer_key(key.clone());
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    config.strict_status |= args.strict;
    config.debug |= args.debug;
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = apply_args(ClientConfig::load(args.config.as_deref())?, &args);

    let default_filter = if config.debug { "yt_feeds=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = FeedClient::new(config)?;
    let request = FeedRequest::from(args.command);

    if args.dry_run {
        println!("{}", client.feed_url(&request));
        return Ok(());
    }

    let response = client
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch {}", client.feed_url(&request)))?;

    if !response.is_success() {
        tracing::warn!(status = response.status, url = %response.url, "Server returned an error status");
    }
    println!("{}", response.body);

    Ok(())
}
