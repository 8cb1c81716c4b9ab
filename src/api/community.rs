use serde_json::{json, Value};

use super::with_query;
use crate::app::Result;
use crate::client::ApiClient;
use crate::domain::{FormData, RequestOptions};

impl ApiClient {
    pub async fn search(&self, query: &str, kind: Option<&str>) -> Result<Value> {
        let mut params = vec![("q", query)];
        if let Some(kind) = kind {
            params.push(("type", kind));
        }
        self.request(&with_query("/search", &params), RequestOptions::get())
            .await
    }

    /// Comments on a sermon, devotion, podcast, etc.
    pub async fn get_comments(&self, content_type: &str, content_id: &str) -> Result<Value> {
        let endpoint = format!("/comments/{}/{}", content_type, content_id);
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn add_comment(
        &self,
        content_type: &str,
        content_id: &str,
        text: &str,
    ) -> Result<Value> {
        let endpoint = format!("/comments/{}/{}", content_type, content_id);
        self.request(&endpoint, RequestOptions::post(json!({ "text": text })))
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<Value> {
        let endpoint = format!("/comments/{}", comment_id);
        self.request(&endpoint, RequestOptions::delete()).await
    }

    pub async fn give(&self, donation: Value) -> Result<Value> {
        self.request("/giving", RequestOptions::post(donation)).await
    }

    pub async fn get_giving_history(&self) -> Result<Value> {
        self.request("/giving/history", RequestOptions::get()).await
    }

    pub async fn upload_thumbnail(
        &self,
        file_name: &str,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Value> {
        let form = FormData::new().file("thumbnail", file_name, mime, bytes);
        self.upload("/upload/thumbnail", form).await
    }
}
