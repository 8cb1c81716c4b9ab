//! Resilient API client: bearer auth, response caching, retry with
//! backoff and offline degradation over a [`Transport`].

mod response;
pub mod retry;


use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{PulpitError, Result};
use crate::cache::ResponseCache;
use crate::domain::{CacheKey, FormData, Method, RequestOptions, ResourceFamily};
use crate::platform::PlatformCapabilities;
use crate::session::Session;
use crate::transport::{ApiRequest, RequestBody, Transport};

pub use retry::RetryPolicy;

/// Endpoints containing one of these are never written to the cache.
pub const DEFAULT_UNCACHED_PATHS: &[&str] = &["/admin"];

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport + Send + Sync>,
    cache: ResponseCache,
    session: Arc<Session>,
    platform: PlatformCapabilities,
    retry: RetryPolicy,
    uncached_paths: Vec<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport + Send + Sync>,
        cache: ResponseCache,
        platform: PlatformCapabilities,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            cache,
            session: Arc::new(Session::new()),
            platform,
            retry: RetryPolicy::default(),
            uncached_paths: DEFAULT_UNCACHED_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn with_uncached_paths(mut self, paths: Vec<String>) -> Self {
        self.uncached_paths = paths;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.session.set_token(token);
    }

    pub fn clear_token(&self) {
        self.session.clear_token();
    }

    /// Registers the single callback run on any 401/403.
    pub fn set_logout_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.session.set_logout_callback(callback);
    }

    pub fn clear_logout_callback(&self) {
        self.session.clear_logout_callback();
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn clear_all_cache(&self) -> Result<usize> {
        self.cache.clear_all()
    }

    pub fn clear_cache_by_type(&self, family: &str) -> Result<usize> {
        self.cache.clear_matching(family)
    }

    pub fn cached_keys(&self) -> Result<Vec<String>> {
        self.cache.keys()
    }

    /// Issues a JSON call.
    ///
    /// Reads are served from the cache when possible. On a platform that
    /// degrades offline, a missing network yields cached data or the
    /// family's empty default instead of an error.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let method = options.method;
        let body = options.serialized_body();
        let key = CacheKey::new(method, endpoint, &body);
        let online = self.platform.is_online();

        if !options.force_refresh && (!online || !method.is_mutating()) {
            if let Some(data) = self.cached(&key) {
                return Ok(data);
            }
        }

        if !online && self.platform.degrades_offline() {
            info!(endpoint, "offline with nothing cached, serving empty default");
            return Ok(ResourceFamily::offline_default(endpoint));
        }

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Cache-Control".to_string(), "no-cache".to_string()),
        ];
        headers.extend(options.headers);

        let request = ApiRequest {
            method,
            url: self.url_for(endpoint)?,
            headers,
            body: if body.is_empty() {
                RequestBody::Empty
            } else {
                RequestBody::Json(body)
            },
        };

        match self.execute(endpoint, request).await {
            Ok(data) => {
                if method.is_mutating() {
                    self.invalidate_family(endpoint);
                } else if self.is_cacheable(endpoint) {
                    if let Err(e) = self.cache.write(&key, &data) {
                        warn!(key = %key, error = %e, "failed to cache response");
                    }
                }
                Ok(data)
            }
            Err(PulpitError::Network { message })
                if self.platform.degrades_offline()
                    && !ResourceFamily::is_auth_endpoint(endpoint) =>
            {
                info!(endpoint, error = %message, "network unavailable, degrading to cached data");
                Ok(self
                    .cached(&key)
                    .unwrap_or_else(|| ResourceFamily::offline_default(endpoint)))
            }
            Err(e) => Err(e),
        }
    }

    /// Multipart POST. Same auth and retry rules as [`request`](Self::request),
    /// but never cached and never degraded.
    pub async fn upload(&self, endpoint: &str, form: FormData) -> Result<Value> {
        let request = ApiRequest {
            method: Method::Post,
            url: self.url_for(endpoint)?,
            headers: vec![("Cache-Control".to_string(), "no-cache".to_string())],
            body: RequestBody::Multipart(form),
        };

        let data = self.execute(endpoint, request).await?;
        self.invalidate_family(endpoint);
        Ok(data)
    }

    /// Retry loop shared by JSON calls and uploads.
    async fn execute(&self, endpoint: &str, request: ApiRequest) -> Result<Value> {
        let retry_network = !ResourceFamily::is_auth_endpoint(endpoint);
        let mut retries = 0;

        loop {
            let error = match self.send_once(&request).await {
                Ok(data) => return Ok(data),
                Err(e) => e,
            };

            if error.is_auth() {
                warn!(endpoint, error = %error, "authentication rejected, logging out");
                self.session.notify_logout();
                return Err(error);
            }

            let retryable = error.is_retryable()
                && (retry_network || !matches!(error, PulpitError::Network { .. }));
            if !retryable {
                return Err(error);
            }

            let Some(backoff) = self.retry.next_delay(retries) else {
                warn!(endpoint, retries, error = %error, "retries exhausted");
                return Err(error);
            };
            retries += 1;

            warn!(
                endpoint,
                error = %error,
                retry = retries,
                max_retries = self.retry.max_retries(),
                backoff_ms = backoff.as_millis() as u64,
                "retrying request"
            );

            tokio::time::sleep(backoff).await;
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<Value> {
        let mut request = request.clone();
        if let Some(bearer) = self.session.bearer() {
            request.headers.push(("Authorization".to_string(), bearer));
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        response::classify(response)
    }

    fn cached(&self, key: &CacheKey) -> Option<Value> {
        match self.cache.read(key) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed");
                None
            }
        }
    }

    fn is_cacheable(&self, endpoint: &str) -> bool {
        !self
            .uncached_paths
            .iter()
            .any(|path| endpoint.contains(path.as_str()))
    }

    fn invalidate_family(&self, endpoint: &str) {
        let Some(family) = ResourceFamily::from_endpoint(endpoint) else {
            return;
        };
        if let Err(e) = self.cache.clear_matching(family.as_str()) {
            warn!(family = %family, error = %e, "failed to purge cache");
        }
    }

    fn url_for(&self, endpoint: &str) -> Result<String> {
        let url = if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };
        Ok(Url::parse(&url)?.into())
    }
}
