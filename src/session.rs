//! Bearer token and logout hook shared by every call of one client.

use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

pub type LogoutCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct Session {
    token: RwLock<Option<String>>,
    on_logout: Mutex<Option<LogoutCallback>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
        debug!("session token set");
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        debug!("session token cleared");
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    /// Replaces any previously registered callback.
    pub fn set_logout_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_logout.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(callback));
    }

    pub fn clear_logout_callback(&self) {
        *self.on_logout.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub(crate) fn notify_logout(&self) {
        // Clone out so the callback may re-enter the session.
        let callback = self
            .on_logout
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}
