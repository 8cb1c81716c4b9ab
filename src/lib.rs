//! # Pulpit
//!
//! Client for the ministry content platform (sermons, devotions, podcasts,
//! live radio, events, ministries, news, prayer requests, giving).
//!
//! ## Architecture
//!
//! ```text
//! api → client → (cache ↔ store) → transport
//! ```
//!
//! - [`client`]: request/upload with bearer auth, caching, retry and
//!   offline degradation
//! - [`cache`]: 24h response cache over durable key-value storage
//! - [`store`]: SQLite key-value persistence
//! - [`transport`]: reqwest-based HTTP, behind an async trait
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch an endpoint (cached for 24h)
//! pulpit get "/sermons?page=1"
//!
//! # Log in; the token is kept for later runs
//! pulpit login anna@example.org --password secret
//!
//! # Run as the native app with no connectivity
//! pulpit --native --offline list devotions
//!
//! # Drop cached podcast lists
//! pulpit cache clear --family podcasts
//! ```

/// Typed endpoints: per-family CRUD handles, auth, search, comments, giving.
pub mod api;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together store,
/// transport, session, network status and the client.
pub mod app;

/// Response cache with lazy expiry and per-family purges.
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Resilient API client.
///
/// - [`ApiClient`](client::ApiClient): JSON requests and multipart uploads
/// - [`RetryPolicy`](client::RetryPolicy): bounded doubling backoff
pub mod client;

/// Configuration from `~/.config/pulpit/config.toml` and base URL selection.
pub mod config;

/// Core value types: methods, request options, cache keys, resource families.
pub mod domain;

/// Platform capabilities and connectivity status.
pub mod platform;

/// Bearer token and logout callback.
pub mod session;

/// Durable key-value storage.
///
/// - [`KeyValueStore`](store::KeyValueStore): storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// HTTP transport.
///
/// - [`Transport`](transport::Transport): async trait for sending requests
/// - [`HttpTransport`](transport::HttpTransport): reqwest implementation
pub mod transport;
