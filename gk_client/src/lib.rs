//! Client mirror of the session auth API.
//!
//! [`ApiClient`] speaks the server's wire actions over HTTP with a cookie
//! jar carrying the session token; [`SessionCache`] layers a poll-friendly
//! three-state view (loading, error, ready) on top of `get-session`.

pub mod api_client;
pub mod session_cache;

pub use api_client::{ApiClient, SessionData, SessionInfo, UserInfo};
pub use session_cache::{CacheState, SessionCache};
