//! Runtime capabilities that change how the client degrades offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Packaged app that may run without a backend for long periods.
    Native,
    #[default]
    Web,
}

pub trait Connectivity {
    fn is_online(&self) -> bool;
}

type StatusObserver = Arc<dyn Fn(bool) + Send + Sync>;

/// Connectivity flag with its own observer list.
pub struct NetworkStatus {
    online: AtomicBool,
    observers: Mutex<Vec<StatusObserver>>,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Updates the flag and notifies observers when it actually changed.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return;
        }

        info!(online, "network status changed");
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            observer(online);
        }
    }

    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(observer));
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct PlatformCapabilities {
    kind: PlatformKind,
    connectivity: Arc<dyn Connectivity + Send + Sync>,
}

impl PlatformCapabilities {
    pub fn new(kind: PlatformKind, connectivity: Arc<dyn Connectivity + Send + Sync>) -> Self {
        Self { kind, connectivity }
    }

    /// Web platform, always reported online.
    pub fn web() -> Self {
        Self::new(PlatformKind::Web, Arc::new(NetworkStatus::default()))
    }

    pub fn kind(&self) -> PlatformKind {
        self.kind
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Whether failures become cached-or-empty payloads instead of errors.
    pub fn degrades_offline(&self) -> bool {
        self.kind == PlatformKind::Native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_observers_fire_on_change_only() {
        let status = NetworkStatus::new(true);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        status.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        status.set_online(true);
        status.set_online(false);
        status.set_online(false);
        status.set_online(true);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_may_resubscribe_while_notified() {
        let status = Arc::new(NetworkStatus::new(true));
        let calls = Arc::new(AtomicUsize::new(0));
        let inner_status = status.clone();
        let seen = calls.clone();
        status.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            inner_status.subscribe(|_| {});
        });

        status.set_online(false);
        status.set_online(true);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(status.observers.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_capabilities_follow_status() {
        let status = Arc::new(NetworkStatus::new(false));
        let platform = PlatformCapabilities::new(PlatformKind::Native, status.clone());

        assert!(!platform.is_online());
        assert!(platform.degrades_offline());

        status.set_online(true);
        assert!(platform.is_online());
    }

    #[test]
    fn test_web_never_degrades() {
        assert!(!PlatformCapabilities::web().degrades_offline());
    }
}
