use serde_json::{json, Value};
use tracing::info;

use crate::app::Result;
use crate::client::ApiClient;
use crate::domain::RequestOptions;

impl ApiClient {
    /// Logs in and keeps the returned token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value> {
        let body = json!({ "email": email, "password": password });
        let data = self
            .request("/auth/login", RequestOptions::post(body))
            .await?;

        if let Some(token) = data.get("token").and_then(Value::as_str) {
            self.set_token(token);
            info!(email, "logged in");
        }

        Ok(data)
    }

    pub async fn signup(&self, details: Value) -> Result<Value> {
        let data = self
            .request("/auth/signup", RequestOptions::post(details))
            .await?;

        if let Some(token) = data.get("token").and_then(Value::as_str) {
            self.set_token(token);
        }

        Ok(data)
    }

    pub async fn current_user(&self) -> Result<Value> {
        self.request("/auth/me", RequestOptions::get().force_refresh(true))
            .await
    }

    pub async fn update_profile(&self, profile: Value) -> Result<Value> {
        self.request("/auth/profile", RequestOptions::put(profile))
            .await
    }

    /// Drops the token locally; the backend keeps no session state.
    pub fn logout(&self) {
        self.clear_token();
        info!("logged out");
    }
}
