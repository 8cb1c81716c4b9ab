pub mod http_transport;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{FormData, Method};

pub use http_transport::HttpTransport;

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(FormData),
}

/// One fully-resolved HTTP call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network seam. Implementations return `Err` only when no response arrived;
/// any HTTP status, including 4xx/5xx, is an `Ok`.
#[async_trait]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
