//! Route handlers standing in for the social app backend.

use super::pages::MockDocument;
use crate::network::{InterceptedRequest, MockResponse, RouteOutcome};
use serde::{Deserialize, Serialize};

/// Email echoed when the registration body has none
pub const FALLBACK_EMAIL: &str = "test@example.com";
/// Username echoed when the registration body has none
pub const FALLBACK_USERNAME: &str = "testuser";
/// Message returned by a successful registration
pub const REGISTRATION_MESSAGE: &str = "Registration successful";
/// Prefix of issued login tokens
pub const TOKEN_PREFIX: &str = "mock_jwt_token_";

/// Body returned by `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// `user_<unix millis>`
    pub id: String,
    /// Echoed email
    pub email: String,
    /// Echoed username
    pub username: String,
    /// Human readable outcome
    pub message: String,
}

/// User record embedded in the login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockUser {
    /// User id
    pub id: String,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Display name
    pub full_name: String,
}

impl Default for MockUser {
    fn default() -> Self {
        Self {
            id: "user_1".to_string(),
            username: FALLBACK_USERNAME.to_string(),
            email: FALLBACK_EMAIL.to_string(),
            full_name: "Test User".to_string(),
        }
    }
}

/// Body returned by `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// `mock_jwt_token_<unix millis>`
    pub token: String,
    /// The canned user
    pub user: MockUser,
}

#[derive(Debug, Default, Deserialize)]
struct RegisterBody {
    email: Option<String>,
    username: Option<String>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn json_response<T: Serialize>(status: u16, body: &T) -> RouteOutcome {
    match MockResponse::json(body) {
        Ok(response) => RouteOutcome::Fulfill(response.with_status(status)),
        Err(err) => RouteOutcome::Fulfill(MockResponse::error(500, &err.to_string())),
    }
}

/// Build the registration response for a request body
///
/// Fields missing from the body, or a body that is not JSON at all, are
/// replaced by the fixed fallbacks.
#[must_use]
pub fn registration_response(body: Option<&[u8]>) -> RegisterResponse {
    let parsed = body
        .and_then(|b| serde_json::from_slice::<RegisterBody>(b).ok())
        .unwrap_or_default();
    RegisterResponse {
        id: format!("user_{}", now_millis()),
        email: parsed.email.unwrap_or_else(|| FALLBACK_EMAIL.to_string()),
        username: parsed
            .username
            .unwrap_or_else(|| FALLBACK_USERNAME.to_string()),
        message: REGISTRATION_MESSAGE.to_string(),
    }
}

/// Build the login response; credentials are never checked
#[must_use]
pub fn login_response() -> LoginResponse {
    LoginResponse {
        token: format!("{TOKEN_PREFIX}{}", now_millis()),
        user: MockUser::default(),
    }
}

/// `POST **/auth/register`: 201 echoing email and username
pub fn handle_register(request: &InterceptedRequest) -> RouteOutcome {
    let response = registration_response(request.body.as_deref());
    tracing::info!(username = %response.username, "mock registration");
    json_response(201, &response)
}

/// `POST **/auth/login`: 200 with a fresh token
pub fn handle_login(_request: &InterceptedRequest) -> RouteOutcome {
    json_response(200, &login_response())
}

/// Any other path under the mock origin: one of the HTML documents
///
/// API paths are declined so a misordered table still reaches the API rules.
pub fn handle_document(request: &InterceptedRequest) -> RouteOutcome {
    let path = request.path();
    if path.contains("/auth/") {
        return RouteOutcome::Fallback;
    }
    RouteOutcome::Fulfill(MockResponse::html(MockDocument::for_path(path).render()))
}
