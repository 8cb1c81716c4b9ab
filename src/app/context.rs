use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::app::error::{PulpitError, Result};
use crate::cache::ResponseCache;
use crate::client::ApiClient;
use crate::config::{self, Config};
use crate::platform::{NetworkStatus, PlatformCapabilities};
use crate::session::Session;
use crate::store::{KeyValueStore, SqliteStore};
use crate::transport::{HttpTransport, Transport};

/// KV key the CLI uses to persist the session token between runs.
pub const SESSION_TOKEN_KEY: &str = "session_token";

/// Everything a consumer needs, built once at startup and dropped on exit.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub network: Arc<NetworkStatus>,
    pub session: Arc<Session>,
    pub client: ApiClient,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let store = Arc::new(SqliteStore::new(&db_path)?);
        let transport: Arc<dyn Transport + Send + Sync> = Arc::new(HttpTransport::with_timeout(
            Duration::from_secs(config.http.timeout_secs),
        )?);

        Self::with_parts(config, store, transport)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let transport: Arc<dyn Transport + Send + Sync> = Arc::new(HttpTransport::with_timeout(
            Duration::from_secs(config.http.timeout_secs),
        )?);

        Self::with_parts(config, store, transport)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<SqliteStore>,
        transport: Arc<dyn Transport + Send + Sync>,
    ) -> Result<Self> {
        let ttl = chrono::Duration::try_hours(config.cache.ttl_hours).ok_or_else(|| {
            PulpitError::Config(format!(
                "cache.ttl_hours out of range: {}",
                config.cache.ttl_hours
            ))
        })?;
        let network = Arc::new(NetworkStatus::default());
        let session = Arc::new(Session::new());
        let platform = PlatformCapabilities::new(config.platform.kind, network.clone());
        let cache = ResponseCache::new(store.clone()).with_ttl(ttl);

        let client = ApiClient::new(config.api_url(), transport, cache, platform)
            .with_retry_policy(config.retry.policy())
            .with_uncached_paths(config.cache.uncached_paths.clone())
            .with_session(session.clone());

        Ok(Self {
            config,
            store,
            network,
            session,
            client,
        })
    }

    /// Registers the logout callback. A rejected token is dropped from
    /// memory and from the store before `notify` runs.
    pub fn on_logout<F>(&self, notify: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let session = self.session.clone();
        let store = self.store.clone();
        self.client.set_logout_callback(move || {
            session.clear_token();
            if let Err(e) = store.remove(SESSION_TOKEN_KEY) {
                warn!(error = %e, "failed to drop persisted session token");
            }
            notify();
        });
    }

    pub fn asset_url(&self, path: &str) -> String {
        config::asset_url(&config::backend_url(self.client.base_url()), path)
    }

    /// Restores a token saved by a previous run, if any.
    pub fn restore_session(&self) -> Result<bool> {
        match self.store.get(SESSION_TOKEN_KEY)? {
            Some(token) => {
                self.session.set_token(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn persist_session(&self) -> Result<()> {
        match self.session.token() {
            Some(token) => self.store.set(SESSION_TOKEN_KEY, &token),
            None => self.store.remove(SESSION_TOKEN_KEY),
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PulpitError::Config("Could not find data directory".into()))?;
        let pulpit_dir = data_dir.join("pulpit");
        std::fs::create_dir_all(&pulpit_dir)?;
        Ok(pulpit_dir.join("pulpit.db"))
    }
}
