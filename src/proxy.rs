//! HTTP forwarding server
//!
//! One handler serves everything: CORS preflights are answered locally,
//! `/` and `/index.html` get a static landing page, and every other
//! request is relayed to the configured upstream with permissive CORS
//! headers overlaid on the response.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, Response, StatusCode, Uri},
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};

/// Methods advertised in CORS headers
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Landing page served on `/` and `/index.html`
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>cors-relay</title>
</head>
<body>
  <h1>cors-relay is running</h1>
  <p>Requests to any other path are forwarded to the configured upstream
  with permissive CORS headers added to the response.</p>
</body>
</html>
"#;

/// Shared relay state, injected into the handler
pub struct RelayState {
    /// HTTP client for forwarding (follows redirects)
    pub client: reqwest::Client,
    /// Upstream base URL, without trailing slash
    pub base_url: String,
    /// Log one line per forwarded request
    pub log_requests: bool,
}

/// Relay server
pub struct RelayServer {
    config: RelayConfig,
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a new relay server
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| RelayError::Http(format!("Failed to create HTTP client: {}", e)))?;

        let state = Arc::new(RelayState {
            client,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            log_requests: config.server.log_requests,
        });

        Ok(Self { config, state })
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/*path", any(relay_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured listen address and serve forever
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.server.listen_addr).await?;
        self.serve(listener).await
    }

    /// Serve on a pre-bound listener (lets tests bind port 0)
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;

        info!("cors-relay v{} ready", env!("CARGO_PKG_VERSION"));
        info!("Local URL: http://{}", addr);
        info!("Forwarding to: {}", self.state.base_url);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Single entry point for every inbound request
async fn relay_handler(
    State(state): State<Arc<RelayState>>,
    req: Request<Body>,
) -> Response<Body> {
    if req.method() == Method::OPTIONS {
        return preflight_response();
    }

    let path = req.uri().path();
    if path == "/" || path == "/index.html" {
        return landing_page();
    }

    forward(state, req).await
}

/// Answer a CORS preflight locally, no upstream round-trip
fn preflight_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "*")
        .header(header::ACCESS_CONTROL_MAX_AGE, "86400")
        .body(Body::empty())
        .unwrap()
}

/// Static landing page
fn landing_page() -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(INDEX_HTML))
        .unwrap()
}

/// Upstream target for an inbound request URI
fn target_url(base_url: &str, uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}{}?{}", base_url, uri.path(), query),
        None => format!("{}{}", base_url, uri.path()),
    }
}

/// Forward one request to the upstream and relay the response
async fn forward(state: Arc<RelayState>, req: Request<Body>) -> Response<Body> {
    let target = target_url(&state.base_url, req.uri());

    if state.log_requests {
        info!("{} {} -> {}", req.method(), req.uri().path(), target);
    }

    let (mut parts, body) = req.into_parts();

    // The client sets its own Host for the upstream origin
    parts.headers.remove(header::HOST);
    // Framing is the client's job, whatever the inbound connection used
    parts.headers.remove(header::TRANSFER_ENCODING);

    let suppress_body = parts.method == Method::GET || parts.method == Method::HEAD;
    if suppress_body {
        // A dropped body must not leave its length header behind
        parts.headers.remove(header::CONTENT_LENGTH);
    }

    let mut outbound = state
        .client
        .request(parts.method.clone(), &target)
        .headers(parts.headers);

    // GET/HEAD never carry a forwarded body
    if !suppress_body {
        outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    match outbound.send().await {
        Ok(upstream) => relay_response(upstream),
        Err(e) => {
            error!("Upstream request to {} failed: {}", target, e);
            proxy_error_response(&e.to_string())
        }
    }
}

/// Relay an upstream response, overlaying CORS headers
fn relay_response(upstream: reqwest::Response) -> Response<Body> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();

    // The client already decoded upstream framing; hyper re-frames the
    // body when it is streamed back out
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Transport failure surfaced to the caller as a plain-text 500
fn proxy_error_response(message: &str) -> Response<Body> {
    let message = if message.is_empty() {
        "Unknown error"
    } else {
        message
    };

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from(format!("Proxy Error: {}", message)))
        .unwrap()
}
