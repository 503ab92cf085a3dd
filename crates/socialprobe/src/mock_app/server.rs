//! HTTP server exposing a [`MockRoutes`] table.
//!
//! Every request is rewritten to `<origin><path?query>` before it reaches
//! the table, so the same rules answer intercepted browser traffic and
//! plain HTTP clients alike.

use super::{social_app_routes, DEFAULT_MOCK_ORIGIN};
use crate::network::{HttpMethod, InterceptedRequest, MockResponse, MockRoutes};
use crate::result::ProbeResult;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest request body the server will buffer
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default port, matching the mock origin
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug)]
struct ServerState {
    routes: MockRoutes,
    origin: String,
}

/// Mock social app server
#[derive(Debug, Clone)]
pub struct MockAppServer {
    routes: MockRoutes,
    origin: String,
}

impl Default for MockAppServer {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_ORIGIN)
    }
}

impl MockAppServer {
    /// Server for the standard social app table at `origin`
    #[must_use]
    pub fn new(origin: &str) -> Self {
        Self::with_routes(social_app_routes(origin), origin)
    }

    /// Server for a custom table
    #[must_use]
    pub fn with_routes(routes: MockRoutes, origin: &str) -> Self {
        Self {
            routes,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Serve without recording requests, for long-running servers
    #[must_use]
    pub fn without_capture(mut self) -> Self {
        self.routes = self.routes.without_capture();
        self
    }

    /// The route table, sharing its request log with the server
    #[must_use]
    pub const fn routes(&self) -> &MockRoutes {
        &self.routes
    }

    /// Origin requests are rewritten to
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        let state = Arc::new(ServerState {
            routes: self.routes.clone(),
            origin: self.origin.clone(),
        });
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
    }

    /// Serve until the task is cancelled
    pub async fn serve(self, addr: SocketAddr) -> ProbeResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, origin = %self.origin, "mock app listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Serve on a background task and return once the socket is bound
    pub async fn spawn(self, addr: SocketAddr) -> ProbeResult<RunningServer> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = self.router();
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(%err, "mock app server stopped");
            }
        });
        tracing::info!(addr = %local_addr, "mock app spawned");
        Ok(RunningServer { local_addr, handle })
    }
}

/// A server running on a background task
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl RunningServer {
    /// Bound socket address
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL of the bound socket
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stop serving
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn dispatch(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    let path_and_query = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut intercepted = InterceptedRequest::new(
        HttpMethod::parse(parts.method.as_str()),
        format!("{}{}", state.origin, path_and_query),
    );
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            intercepted
                .headers
                .insert(name.as_str().to_string(), value.to_string());
        }
    }
    if !bytes.is_empty() {
        intercepted.body = Some(bytes.to_vec());
    }

    match state.routes.handle(&intercepted) {
        Some(response) => into_http(response).await,
        None => (
            StatusCode::NOT_FOUND,
            format!("No mock route for {} {}", parts.method, parts.uri.path()),
        )
            .into_response(),
    }
}

async fn into_http(mock: MockResponse) -> Response {
    if mock.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(mock.delay_ms)).await;
    }
    let status = StatusCode::from_u16(mock.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, mock.content_type.as_str())
        .header(header::CACHE_CONTROL, "no-cache");
    for (key, value) in &mock.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }
    builder
        .body(Body::from(mock.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::network::{RouteRule, UrlPattern};
    use tower::ServiceExt;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_demo_page() {
        let app = MockAppServer::default().router();
        let response = app
            .oneshot(Request::builder().uri("/demo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
        assert!(body_text(response).await.contains("Mock Social App Demo"));
    }

    #[tokio::test]
    async fn test_without_capture_does_not_accumulate() {
        let server = MockAppServer::default().without_capture();
        let app = server.router();
        for _ in 0..50 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/demo").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert!(server.routes().captured_requests().is_empty());

        let capturing = MockAppServer::default();
        capturing
            .router()
            .oneshot(Request::builder().uri("/demo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(capturing.routes().captured_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_is_404() {
        let app = MockAppServer::default().router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/register")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_custom_headers_and_delay() {
        let routes = MockRoutes::new().with_route(RouteRule::fixed(
            UrlPattern::Any,
            HttpMethod::Any,
            MockResponse::text("ok")
                .with_header("x-mock", "yes")
                .with_delay(1),
        ));
        let server = MockAppServer::with_routes(routes, "http://mock.test");
        let response = server
            .router()
            .oneshot(Request::builder().uri("/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers().get("x-mock").unwrap(), "yes");
        assert_eq!(body_text(response).await, "ok");
        let seen = server.routes().captured_requests();
        assert_eq!(seen[0].url, "http://mock.test/x");
    }

    #[tokio::test]
    async fn test_spawn_binds_ephemeral_port() {
        let running = MockAppServer::default()
            .spawn(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        assert_ne!(running.local_addr().port(), 0);
        assert!(running.url().starts_with("http://127.0.0.1:"));
        running.shutdown();
    }
}
