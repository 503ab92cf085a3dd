//! Mock social application.
//!
//! A route table that stands in for a social app backend, the HTML documents
//! it serves, and an HTTP server exposing the same table over a real socket.
//!
//! Rule order, first registered wins:
//!
//! | # | pattern                 | method | response                         |
//! |---|-------------------------|--------|----------------------------------|
//! | 1 | `**/auth/register`      | POST   | 201 JSON, echoes email/username  |
//! | 2 | `**/auth/login`         | POST   | 200 JSON, token + canned user    |
//! | 3 | `<origin>/**`           | any    | HTML document by path            |
//!
//! The document rule also declines `/auth/` paths itself, so it never shadows
//! the API rules even if a caller appends rules in a different order.

pub mod handlers;
pub mod pages;
pub mod server;

use crate::network::{HttpMethod, MockRoutes, RouteRule, UrlPattern};

pub use handlers::{LoginResponse, MockUser, RegisterResponse};
pub use pages::MockDocument;
pub use server::MockAppServer;

/// Origin the mock social app is addressed at
pub const DEFAULT_MOCK_ORIGIN: &str = "http://localhost:3001";

/// Glob for the registration endpoint
pub const REGISTER_PATTERN: &str = "**/auth/register";
/// Glob for the login endpoint
pub const LOGIN_PATTERN: &str = "**/auth/login";

/// The full route table for a mock origin
#[must_use]
pub fn social_app_routes(origin: &str) -> MockRoutes {
    let origin = origin.trim_end_matches('/');
    MockRoutes::new()
        .with_route(RouteRule::new(
            UrlPattern::glob(REGISTER_PATTERN),
            HttpMethod::Post,
            handlers::handle_register,
        ))
        .with_route(RouteRule::new(
            UrlPattern::glob(LOGIN_PATTERN),
            HttpMethod::Post,
            handlers::handle_login,
        ))
        .with_route(RouteRule::new(
            UrlPattern::glob(format!("{origin}/**")),
            HttpMethod::Any,
            handlers::handle_document,
        ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::network::InterceptedRequest;

    #[test]
    fn test_rule_order() {
        let routes = social_app_routes(DEFAULT_MOCK_ORIGIN);
        let patterns: Vec<String> = routes.rules().iter().map(|r| r.pattern.to_string()).collect();
        assert_eq!(
            patterns,
            vec![
                "**/auth/register".to_string(),
                "**/auth/login".to_string(),
                "http://localhost:3001/**".to_string()
            ]
        );
    }

    #[test]
    fn test_api_not_shadowed_by_documents() {
        let routes = social_app_routes("http://localhost:3001/");
        let resp = routes
            .handle(&InterceptedRequest::post_json(
                "http://localhost:3001/auth/login",
                &serde_json::json!({}),
            ))
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
    }

    #[test]
    fn test_get_on_api_path_is_unhandled() {
        let routes = social_app_routes(DEFAULT_MOCK_ORIGIN);
        assert!(routes
            .handle(&InterceptedRequest::get("http://localhost:3001/auth/register"))
            .is_none());
    }

    #[test]
    fn test_other_origin_is_unhandled() {
        let routes = social_app_routes(DEFAULT_MOCK_ORIGIN);
        assert!(routes
            .handle(&InterceptedRequest::get("https://www.instagram.com/demo"))
            .is_none());
    }
}
