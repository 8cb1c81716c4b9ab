use std::fmt;

use serde_json::{Map, Value};

/// Logical group of endpoints that are invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFamily {
    Auth,
    Sermons,
    Devotions,
    Events,
    Podcasts,
    LiveBroadcasts,
    Ministries,
    News,
    PrayerRequests,
    Giving,
    Comments,
    Search,
    Upload,
}

/// Offline defaults, checked in order against the endpoint.
const OFFLINE_SHAPES: &[(&str, &str)] = &[
    ("devotions", "devotions"),
    ("podcasts", "podcasts"),
    ("broadcasts", "broadcasts"),
    ("sermons", "sermons"),
    ("events", "events"),
    ("ministries", "ministries"),
    ("news", "news"),
];

impl ResourceFamily {
    pub const ALL: [ResourceFamily; 13] = [
        ResourceFamily::Auth,
        ResourceFamily::Sermons,
        ResourceFamily::Devotions,
        ResourceFamily::Events,
        ResourceFamily::Podcasts,
        ResourceFamily::LiveBroadcasts,
        ResourceFamily::Ministries,
        ResourceFamily::News,
        ResourceFamily::PrayerRequests,
        ResourceFamily::Giving,
        ResourceFamily::Comments,
        ResourceFamily::Search,
        ResourceFamily::Upload,
    ];

    /// Path segment, also the substring used for cache purges.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFamily::Auth => "auth",
            ResourceFamily::Sermons => "sermons",
            ResourceFamily::Devotions => "devotions",
            ResourceFamily::Events => "events",
            ResourceFamily::Podcasts => "podcasts",
            ResourceFamily::LiveBroadcasts => "live-broadcasts",
            ResourceFamily::Ministries => "ministries",
            ResourceFamily::News => "news",
            ResourceFamily::PrayerRequests => "prayer-requests",
            ResourceFamily::Giving => "giving",
            ResourceFamily::Comments => "comments",
            ResourceFamily::Search => "search",
            ResourceFamily::Upload => "upload",
        }
    }

    pub fn base_path(&self) -> String {
        format!("/{}", self.as_str())
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches('/').to_lowercase();
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Family of an endpoint, from its first path segment.
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        let path = endpoint.split(['?', '#']).next().unwrap_or(endpoint);
        let first = path.trim_start_matches('/').split('/').next()?;
        Self::parse(first)
    }

    pub fn is_auth_endpoint(endpoint: &str) -> bool {
        endpoint.trim_start_matches('/').starts_with("auth/")
            || endpoint.trim_start_matches('/') == "auth"
    }

    /// Well-shaped empty payload served when offline with nothing cached.
    pub fn offline_default(endpoint: &str) -> Value {
        OFFLINE_SHAPES
            .iter()
            .find(|(needle, _)| endpoint.contains(needle))
            .map(|(_, field)| {
                let mut shape = Map::new();
                shape.insert(field.to_string(), Value::Array(Vec::new()));
                Value::Object(shape)
            })
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_endpoint() {
        assert_eq!(
            ResourceFamily::from_endpoint("/podcasts?page=1"),
            Some(ResourceFamily::Podcasts)
        );
        assert_eq!(
            ResourceFamily::from_endpoint("/live-broadcasts/12/stop"),
            Some(ResourceFamily::LiveBroadcasts)
        );
        assert_eq!(
            ResourceFamily::from_endpoint("prayer-requests"),
            Some(ResourceFamily::PrayerRequests)
        );
        assert_eq!(ResourceFamily::from_endpoint("/unknown/1"), None);
    }

    #[test]
    fn test_auth_endpoints() {
        assert!(ResourceFamily::is_auth_endpoint("/auth/login"));
        assert!(ResourceFamily::is_auth_endpoint("/auth/signup"));
        assert!(ResourceFamily::is_auth_endpoint("auth/me"));
        assert!(!ResourceFamily::is_auth_endpoint("/authors"));
        assert!(!ResourceFamily::is_auth_endpoint("/sermons"));
    }

    #[test]
    fn test_offline_defaults() {
        assert_eq!(
            ResourceFamily::offline_default("/devotions?limit=10"),
            json!({"devotions": []})
        );
        assert_eq!(
            ResourceFamily::offline_default("/podcasts/3/episodes"),
            json!({"podcasts": []})
        );
        assert_eq!(
            ResourceFamily::offline_default("/live-broadcasts/current"),
            json!({"broadcasts": []})
        );
        assert_eq!(ResourceFamily::offline_default("/giving/history"), json!({}));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ResourceFamily::parse("Sermons"), Some(ResourceFamily::Sermons));
        assert_eq!(ResourceFamily::parse("/news/"), Some(ResourceFamily::News));
        assert_eq!(ResourceFamily::parse("bulletins"), None);
    }
}
