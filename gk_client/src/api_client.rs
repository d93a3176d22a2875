//! HTTP API client for the session auth server.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API client for communicating with the auth server.
///
/// Carries a cookie jar so the session token issued by sign-up/sign-in is
/// replayed automatically on subsequent calls.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SignUpRequest {
    name: Option<String>,
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: Option<SessionData>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Public projection of a user account
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// Session metadata as reported by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A resolved session: its owner plus its metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionData {
    pub user: UserInfo,
    pub session: SessionInfo,
}

impl ApiClient {
    /// Create a new API client with a cookie jar
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// Register a new account; the session cookie lands in the jar
    pub async fn sign_up(
        &self,
        name: Option<String>,
        email: String,
        password: String,
    ) -> Result<UserInfo> {
        let request = SignUpRequest {
            name,
            email,
            password,
        };

        let response = self
            .client
            .post(format!("{}/api/auth/sign-up", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send sign-up request")?;

        let envelope: UserEnvelope = read_success(response, "sign-up").await?;
        Ok(envelope.user)
    }

    /// Sign in with email and password; the session cookie lands in the jar
    pub async fn sign_in(&self, email: String, password: String) -> Result<UserInfo> {
        let request = SignInRequest { email, password };

        let response = self
            .client
            .post(format!("{}/api/auth/sign-in", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send sign-in request")?;

        let envelope: UserEnvelope = read_success(response, "sign-in").await?;
        Ok(envelope.user)
    }

    /// Revoke the current session; the server expires the cookie
    pub async fn sign_out(&self) -> Result<UserInfo> {
        let response = self
            .client
            .post(format!("{}/api/auth/sign-out", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to send sign-out request")?;

        let envelope: UserEnvelope = read_success(response, "sign-out").await?;
        Ok(envelope.user)
    }

    /// Resolve the current session. `None` means signed out, expired, or no
    /// cookie at all; this call never fails on auth state, only on transport.
    pub async fn get_session(&self) -> Result<Option<SessionData>> {
        let response = self
            .client
            .get(format!("{}/api/auth/get-session", self.base_url))
            .send()
            .await
            .context("Failed to send get-session request")?;

        let envelope: SessionEnvelope = response
            .json()
            .await
            .context("Failed to parse get-session response")?;
        Ok(envelope.session)
    }
}

/// Parse a success envelope, surfacing the server's error message otherwise
async fn read_success<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("status {status}"),
        };
        anyhow::bail!("{action} failed: {message}");
    }

    response
        .json()
        .await
        .with_context(|| format!("Failed to parse {action} response"))
}
