//! Authentication wire-action handlers.
//!
//! Each inbound action maps to exactly one authority operation. Failures
//! surface in two distinct status bands:
//!
//! - adapter band: unknown action → 404, malformed/incomplete body → 400,
//!   both rejected before the authority runs
//! - authority band: duplicate email → 409, credential and session failures
//!   → 401, store/internal faults → 500 with a sanitized message
//!
//! `get-session` is the deliberate exception: every failure collapses to a
//! `200 {"session": null}` so polling for "am I logged in" never needs
//! error handling on the client side.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json, Response},
};
use gatekeeper::auth::{AuthError, PublicUser, SessionState, SignInRequest, SignUpRequest};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{AppState, cookies::CookieTransport};

#[derive(Debug, Deserialize)]
pub struct SignUpPayload {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Option<SessionState>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Route a POST wire action to its authority operation
pub async fn dispatch_post(
    State(state): State<AppState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let transport = CookieTransport::from_headers(&headers, state.secure_cookies);
    match action.as_str() {
        "sign-up" => sign_up(&state, &transport, &body).await.attach(transport),
        "sign-in" => sign_in(&state, &transport, &body).await.attach(transport),
        "sign-out" => sign_out(&state, &transport).await.attach(transport),
        "get-session" => get_session(&state, &transport).await.attach(transport),
        _ => unknown_action(&action),
    }
}

/// `get-session` is also reachable via GET for polling clients
pub async fn dispatch_get(
    State(state): State<AppState>,
    Path(action): Path<String>,
    headers: HeaderMap,
) -> Response {
    if action != "get-session" {
        return unknown_action(&action);
    }
    let transport = CookieTransport::from_headers(&headers, state.secure_cookies);
    get_session(&state, &transport).await.attach(transport)
}

async fn sign_up(state: &AppState, transport: &CookieTransport, body: &Bytes) -> Response {
    let payload: SignUpPayload = match parse_body(body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };
    if payload.email.is_empty() || payload.password.is_empty() {
        return reject_incomplete();
    }

    let request = SignUpRequest {
        name: payload.name,
        email: payload.email,
        password: payload.password,
    };
    match state.authority.register(request, transport).await {
        Ok(user) => (StatusCode::OK, Json(AuthResponse { user })).into_response(),
        Err(e) => authority_error(&e),
    }
}

async fn sign_in(state: &AppState, transport: &CookieTransport, body: &Bytes) -> Response {
    let payload: SignInPayload = match parse_body(body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };
    if payload.email.is_empty() || payload.password.is_empty() {
        return reject_incomplete();
    }

    let request = SignInRequest {
        email: payload.email,
        password: payload.password,
    };
    match state.authority.authenticate(request, transport).await {
        Ok(user) => (StatusCode::OK, Json(AuthResponse { user })).into_response(),
        Err(e) => authority_error(&e),
    }
}

async fn sign_out(state: &AppState, transport: &CookieTransport) -> Response {
    match state.authority.terminate(transport).await {
        Ok(user) => (StatusCode::OK, Json(AuthResponse { user })).into_response(),
        Err(e) => authority_error(&e),
    }
}

/// Downgrades every failure to an empty-session success so callers can poll
/// without special-casing error statuses.
async fn get_session(state: &AppState, transport: &CookieTransport) -> Response {
    let session = match state.authority.validate(transport).await {
        Ok(session_state) => Some(session_state),
        Err(e) => {
            tracing::debug!("get-session resolved to empty: {e}");
            None
        }
    };
    (StatusCode::OK, Json(SessionResponse { session })).into_response()
}

/// Deserialize a request body, mapping failures into the adapter status band
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: AuthError::Transport(format!("malformed request body: {e}"))
                    .client_message(),
            }),
        )
            .into_response()
    })
}

fn reject_incomplete() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "email and password are required".to_string(),
        }),
    )
        .into_response()
}

fn unknown_action(action: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("unknown action: {action}"),
        }),
    )
        .into_response()
}

/// Map an authority failure to its status band and client-safe message
fn authority_error(err: &AuthError) -> Response {
    let status = match err {
        AuthError::DuplicateUser => StatusCode::CONFLICT,
        AuthError::InvalidCredentials
        | AuthError::NoActiveSession
        | AuthError::SessionNotFound
        | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::Transport(_) => StatusCode::BAD_REQUEST,
        AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("authority failure: {err}");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
        .into_response()
}

/// Attach a staged `Set-Cookie` header to the response, if any operation
/// touched the token
trait AttachCookie {
    fn attach(self, transport: CookieTransport) -> Response;
}

impl AttachCookie for Response {
    fn attach(mut self, transport: CookieTransport) -> Response {
        if let Some(cookie) = transport.take_set_cookie() {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                self.headers_mut().insert(SET_COOKIE, value);
            }
        }
        self
    }
}
