//! Poll-friendly cache over `get-session`.
//!
//! UI code reads a single three-state value instead of awaiting the network:
//! the cache starts out loading, and each manual [`SessionCache::refresh`]
//! settles it to either the latest session snapshot or a transport error.
//! There is no background task; staleness is bounded by how often the caller
//! refreshes.

use crate::api_client::{ApiClient, SessionData};
use tokio::sync::RwLock;

/// Observable state of the cached session
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    /// No refresh has completed yet
    Loading,
    /// The last refresh failed to reach the server
    Error(String),
    /// The last refresh succeeded; `None` means signed out
    Ready(Option<SessionData>),
}

impl CacheState {
    /// The signed-in session, if the cache holds one
    pub fn session(&self) -> Option<&SessionData> {
        match self {
            CacheState::Ready(session) => session.as_ref(),
            _ => None,
        }
    }
}

/// Shared session snapshot, refreshed on demand
pub struct SessionCache {
    state: RwLock<CacheState>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::Loading),
        }
    }

    /// Current snapshot
    pub async fn state(&self) -> CacheState {
        self.state.read().await.clone()
    }

    /// Re-resolve the session through the client and settle the state.
    ///
    /// A transport failure moves the cache to [`CacheState::Error`] but a
    /// later successful refresh recovers it; an auth failure is not an error,
    /// it is `Ready(None)`.
    pub async fn refresh(&self, client: &ApiClient) -> CacheState {
        let next = match client.get_session().await {
            Ok(session) => CacheState::Ready(session),
            Err(e) => CacheState::Error(e.to_string()),
        };
        *self.state.write().await = next.clone();
        next
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_starts_loading() {
        let cache = SessionCache::new();
        assert_eq!(cache.state().await, CacheState::Loading);
        assert!(cache.state().await.session().is_none());
    }

    #[tokio::test]
    async fn refresh_against_unreachable_server_reports_error() {
        // Reserved port with no listener.
        let client = ApiClient::new("http://127.0.0.1:1".to_string()).expect("client");
        let cache = SessionCache::new();

        let state = cache.refresh(&client).await;
        assert!(matches!(state, CacheState::Error(_)));
        assert_eq!(cache.state().await, state, "snapshot settles to the error");
    }
}
