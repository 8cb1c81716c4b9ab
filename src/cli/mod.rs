pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pulpit")]
#[command(about = "Command-line client for the ministry content platform", long_about = None)]
pub struct Cli {
    /// Behave like the packaged native app (offline fallbacks, LAN backend)
    #[arg(long, global = true)]
    pub native: bool,

    /// Treat the device as offline
    #[arg(long, global = true)]
    pub offline: bool,

    /// Path to the local database (default: data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file (default: ~/.config/pulpit/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// GET an endpoint and print the JSON response
    Get {
        /// Endpoint path, e.g. /sermons?page=1
        endpoint: String,
        /// Skip the cached copy
        #[arg(long)]
        refresh: bool,
    },
    /// List a resource family
    List {
        /// sermons, devotions, events, podcasts, live-broadcasts, ministries, news, prayer-requests
        family: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search all content
    Search {
        query: String,
        /// Restrict to one content type
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Log in and remember the session
    Login {
        email: String,
        /// Password (falls back to $PULPIT_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Upload a file as multipart form data
    Upload {
        /// Endpoint path, e.g. /upload/thumbnail
        endpoint: String,
        file: PathBuf,
        /// Form field name for the file
        #[arg(long, default_value = "file")]
        field: String,
    },
    /// Warm the cache with the main content lists
    Prefetch,
    /// Inspect or clear cached responses
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// List cached keys
    List,
    /// Remove cached responses
    Clear {
        /// Only entries for this family (e.g. podcasts)
        #[arg(long)]
        family: Option<String>,
    },
}
