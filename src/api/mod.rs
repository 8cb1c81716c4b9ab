//! Typed surface used by screens and the CLI.
//!
//! Payloads stay opaque JSON; this layer only knows paths.

mod auth;
mod community;

use serde_json::Value;

use crate::app::Result;
use crate::client::ApiClient;
use crate::domain::{Method, RequestOptions, ResourceFamily};

/// Appends `params` as a query string.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

/// CRUD handle for one resource family.
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a ApiClient,
    family: ResourceFamily,
}

impl<'a> Resource<'a> {
    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.family.base_path(), id)
    }

    pub async fn list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let endpoint = with_query(&self.family.base_path(), params);
        self.client.request(&endpoint, RequestOptions::get()).await
    }

    /// Like [`list`](Self::list) but bypasses the cached copy.
    pub async fn refresh(&self, params: &[(&str, &str)]) -> Result<Value> {
        let endpoint = with_query(&self.family.base_path(), params);
        self.client
            .request(&endpoint, RequestOptions::get().force_refresh(true))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        self.client
            .request(&self.item_path(id), RequestOptions::get())
            .await
    }

    pub async fn create(&self, body: Value) -> Result<Value> {
        self.client
            .request(&self.family.base_path(), RequestOptions::post(body))
            .await
    }

    pub async fn update(&self, id: &str, body: Value) -> Result<Value> {
        self.client
            .request(&self.item_path(id), RequestOptions::put(body))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        self.client
            .request(&self.item_path(id), RequestOptions::delete())
            .await
    }

    /// Admin listing, never cached.
    pub async fn admin_list(&self, params: &[(&str, &str)]) -> Result<Value> {
        let endpoint = with_query(&format!("{}/admin/all", self.family.base_path()), params);
        self.client.request(&endpoint, RequestOptions::get()).await
    }
}

impl ApiClient {
    pub fn resource(&self, family: ResourceFamily) -> Resource<'_> {
        Resource {
            client: self,
            family,
        }
    }

    pub fn sermons(&self) -> Resource<'_> {
        self.resource(ResourceFamily::Sermons)
    }

    pub fn devotions(&self) -> Resource<'_> {
        self.resource(ResourceFamily::Devotions)
    }

    pub fn events(&self) -> Resource<'_> {
        self.resource(ResourceFamily::Events)
    }

    pub fn podcasts(&self) -> Resource<'_> {
        self.resource(ResourceFamily::Podcasts)
    }

    pub fn live_broadcasts(&self) -> Resource<'_> {
        self.resource(ResourceFamily::LiveBroadcasts)
    }

    pub fn ministries(&self) -> Resource<'_> {
        self.resource(ResourceFamily::Ministries)
    }

    pub fn news(&self) -> Resource<'_> {
        self.resource(ResourceFamily::News)
    }

    pub fn prayer_requests(&self) -> Resource<'_> {
        self.resource(ResourceFamily::PrayerRequests)
    }

    /// Today's devotion.
    pub async fn get_daily_devotion(&self) -> Result<Value> {
        self.request("/devotions/today", RequestOptions::get()).await
    }

    pub async fn get_upcoming_events(&self, limit: u32) -> Result<Value> {
        let limit = limit.to_string();
        let endpoint = with_query("/events/upcoming", &[("limit", limit.as_str())]);
        self.request(&endpoint, RequestOptions::get()).await
    }

    /// Broadcast currently on air, if the backend reports one.
    pub async fn get_current_broadcast(&self) -> Result<Value> {
        self.request("/live-broadcasts/current", RequestOptions::get())
            .await
    }

    pub async fn start_broadcast(&self, body: Value) -> Result<Value> {
        self.request("/live-broadcasts/start", RequestOptions::post(body))
            .await
    }

    pub async fn stop_broadcast(&self, id: &str) -> Result<Value> {
        let endpoint = format!("/live-broadcasts/{}/stop", id);
        self.request(&endpoint, RequestOptions::new(Method::Post)).await
    }

    pub async fn pray_for(&self, prayer_request_id: &str) -> Result<Value> {
        let endpoint = format!("/prayer-requests/{}/pray", prayer_request_id);
        self.request(&endpoint, RequestOptions::new(Method::Post)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_encodes() {
        assert_eq!(with_query("/sermons", &[]), "/sermons");
        assert_eq!(
            with_query("/sermons", &[("page", "2"), ("limit", "10")]),
            "/sermons?page=2&limit=10"
        );
        assert_eq!(
            with_query("/search", &[("q", "faith & hope")]),
            "/search?q=faith+%26+hope"
        );
        assert_eq!(
            with_query("/news?sort=new", &[("page", "1")]),
            "/news?sort=new&page=1"
        );
    }
}
