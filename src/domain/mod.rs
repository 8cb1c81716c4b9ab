pub mod cache;
pub mod family;
pub mod request;

pub use cache::{CacheKey, CachedResponse};
pub use family::ResourceFamily;
pub use request::{FormData, FormPart, Method, RequestOptions};
