//! Development server: static output plus a reverse proxy for API prefixes.
//!
//! Requests whose path matches a [`ProxyRule`] are forwarded to the rule's
//! target through the rule's shared HTTP client. Everything else is served
//! from the variant's output directory.

use crate::error::{CliError, Result};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use nut_build::ProxyRule;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{debug, warn};

/// Largest request body forwarded upstream.
const MAX_PROXY_BODY: usize = 32 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Everything one dev server instance needs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_root: PathBuf,
    pub rules: Arc<[ProxyRule]>,
    pub cors: bool,
    pub headers: BTreeMap<String, String>,
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// A bound server running in the background.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task
            .await
            .map_err(|e| CliError::Unexpected(format!("dev server task: {e}")))?
    }
}

/// Development server.
pub struct DevServer {
    config: ServerConfig,
}

impl DevServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind the configured address and serve until the handle is shut down.
    ///
    /// # Errors
    ///
    /// Returns error if the server cannot bind to the configured address.
    pub async fn start(self) -> Result<ServerHandle> {
        let bind_to = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&bind_to)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", bind_to, e)))?;
        let addr = listener.local_addr()?;

        let app = build_router(&self.config)?;
        let (shutdown, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .map_err(|e| CliError::Server(format!("Server error: {}", e)))
        });

        debug!(%addr, "dev server listening");
        Ok(ServerHandle {
            addr,
            shutdown,
            task,
        })
    }
}

/// Build the axum router: proxy first, static files as fallback.
fn build_router(config: &ServerConfig) -> Result<Router> {
    let mut router = Router::new()
        .fallback_service(ServeDir::new(&config.static_root).append_index_html_on_directories(true))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&config.rules),
            proxy_requests,
        ));

    if !config.headers.is_empty() {
        let headers = Arc::new(parse_headers(&config.headers)?);
        router = router.layer(middleware::from_fn_with_state(headers, add_headers));
    }

    if config.cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    Ok(router)
}

fn parse_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| CliError::InvalidArgument(format!("devServer.headers `{name}`: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| CliError::InvalidArgument(format!("devServer.headers `{name}`: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn add_headers(
    State(headers): State<Arc<HeaderMap>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    for (name, value) in headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}

async fn proxy_requests(
    State(rules): State<Arc<[ProxyRule]>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let Some(rule) = rules.iter().find(|rule| rule.matches(&path)) else {
        return next.run(request).await;
    };

    match forward(rule, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(%path, target = rule.target(), "proxy request failed: {e}");
            (StatusCode::BAD_GATEWAY, format!("Proxy error: {e}")).into_response()
        }
    }
}

#[derive(Debug, Error)]
enum ForwardError {
    #[error("could not read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

async fn forward(rule: &ProxyRule, request: Request) -> std::result::Result<Response, ForwardError> {
    let url = upstream_url(rule, request.uri());
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_PROXY_BODY).await?;

    let mut headers = forwardable(&parts.headers);
    if rule.change_origin() {
        // reqwest fills in the target's Host
        headers.remove(header::HOST);
    }

    debug!(method = %parts.method, %url, "proxy");
    let upstream = rule
        .agent()
        .client()
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let upstream_headers = forwardable(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = (status, Body::from(bytes)).into_response();
    response.headers_mut().extend(upstream_headers);
    Ok(response)
}

/// Target origin plus the rewritten path and the original query.
fn upstream_url(rule: &ProxyRule, uri: &Uri) -> String {
    let path = rule.path_rewrite(uri.path());
    match uri.query() {
        Some(query) => format!("{}{}?{}", rule.target(), path, query),
        None => format!("{}{}", rule.target(), path),
    }
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in &HOP_BY_HOP {
        out.remove(name);
    }
    out
}
