//! HTTP side of the development server.
//!
//! Request flow, outermost first:
//!
//! 1. compression (when enabled)
//! 2. the render passthrough: host check, attaches the current
//!    [`BuildContext`] to the request, fixes content types for overridden
//!    extensions and injects the reload script into HTML responses
//! 3. the last good bundle from memory
//! 4. the reserved `/__goban__/` routes
//! 5. the static directories, in order, first hit wins

use std::convert::Infallible;
use std::path::Path;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use goban_config::AllowedHosts;
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::dev::{BuildContext, SharedState};
use crate::error::{CliError, Result, ResultExt};

pub const EVENTS_PATH: &str = "/__goban__/events";
pub const RELOAD_SCRIPT_PATH: &str = "/__goban__/reload.js";
pub const BUILD_CONTEXT_PATH: &str = "/__goban__/build";

const RELOAD_SCRIPT: &str = include_str!("../../assets/reload-client.js");

pub struct DevServer {
    state: SharedState,
}

impl DevServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let state = self.state.clone();

        let app = Router::new()
            .route(EVENTS_PATH, get(handle_sse))
            .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
            .route(BUILD_CONTEXT_PATH, get(handle_build_context))
            .fallback(serve_static)
            .layer(middleware::from_fn_with_state(state.clone(), serve_from_cache))
            .layer(middleware::from_fn_with_state(state.clone(), passthrough))
            .with_state(state.clone());

        if state.settings.compress {
            app.layer(CompressionLayer::new())
        } else {
            app
        }
    }

    /// Bind the configured address and serve until the task is dropped.
    pub async fn start(self) -> Result<()> {
        let addr = self.state.settings.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
            .with_hint(format!(
                "Is another process using port {}? Pass --port <PORT> to pick another",
                addr.port()
            ))?;
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        crate::ui::success(&format!("Development server listening on http://{}", local));
        axum::serve(listener, self.router())
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "reload client connected");

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

/// The context the passthrough attached, or a fresh one when server-side
/// rendering is off.
async fn handle_build_context(State(state): State<SharedState>, req: Request) -> Json<BuildContext> {
    let ctx = req
        .extensions()
        .get::<BuildContext>()
        .cloned()
        .unwrap_or_else(|| state.build_context());
    Json(ctx)
}

async fn serve_from_cache(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    match state.get_cached_file(req.uri().path()) {
        Some((content, content_type)) => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "no-cache".to_string()),
            ],
            content,
        )
            .into_response(),
        None => next.run(req).await,
    }
}

/// Try each static directory in order.
async fn serve_static(State(state): State<SharedState>, req: Request) -> Response {
    let (parts, _) = req.into_parts();

    for dir in &state.settings.static_dirs {
        let mut service = ServeDir::new(state.root().join(dir))
            .append_index_html_on_directories(state.settings.index);
        let attempt = Request::from_parts(parts.clone(), Body::empty());
        match service.try_call(attempt).await {
            Ok(res) if res.status() == StatusCode::NOT_FOUND => continue,
            Ok(res) => return res.map(Body::new),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "static file error");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (
        StatusCode::NOT_FOUND,
        format!("Not found: {}", parts.uri.path()),
    )
        .into_response()
}

/// The render passthrough wrapped around every request.
async fn passthrough(State(state): State<SharedState>, mut req: Request, next: Next) -> Response {
    if !host_allowed(&state.settings.allowed_hosts, &req) {
        return (StatusCode::FORBIDDEN, "Invalid Host header").into_response();
    }

    let override_type = extension_of(req.uri().path())
        .and_then(|ext| state.settings.mime_override(ext))
        .map(str::to_string);

    if state.settings.server_side_render {
        req.extensions_mut().insert(state.build_context());
    }

    let mut res = next.run(req).await;

    if let Some(content_type) = override_type {
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            res.headers_mut().insert(header::CONTENT_TYPE, value);
        }
    }

    if res.status().is_success() && is_html(&res) {
        return inject_into_response(res).await;
    }
    res
}

fn host_allowed(allowed: &AllowedHosts, req: &Request) -> bool {
    let AllowedHosts::List(hosts) = allowed else {
        return true;
    };
    let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
    else {
        return false;
    };
    let name = host.rsplit_once(':').map(|(name, _)| name).unwrap_or(host);
    hosts.iter().any(|h| h == name)
}

fn extension_of(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|ext| ext.to_str())
}

fn is_html(res: &Response) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

async fn inject_into_response(res: Response) -> Response {
    let (mut parts, body) = res.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(inject_reload_script(&bytes)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read HTML response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Insert the reload client before `</body>`, or append it.
pub fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let tag = format!(r#"<script src="{}"></script>"#, RELOAD_SCRIPT_PATH);

    let mut result = String::with_capacity(html.len() + tag.len() + 4);
    match html.rfind("</body>") {
        Some(pos) => {
            result.push_str(&html[..pos]);
            result.push_str(&tag);
            result.push('\n');
            result.push_str(&html[pos..]);
        }
        None => {
            result.push_str(&html);
            result.push('\n');
            result.push_str(&tag);
        }
    }
    result.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let out = inject_reload_script(b"<html><body><div id=goban></div></body></html>");
        let out = String::from_utf8(out).unwrap();
        let script = out.find(RELOAD_SCRIPT_PATH).unwrap();
        assert!(script < out.find("</body>").unwrap());
    }

    #[test]
    fn test_inject_without_body_appends() {
        let out = String::from_utf8(inject_reload_script(b"<p>fragment</p>")).unwrap();
        assert!(out.starts_with("<p>fragment</p>\n<script"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/demo/index.phtml"), Some("phtml"));
        assert_eq!(extension_of("/"), None);
    }

    #[test]
    fn test_host_list_strips_port() {
        let allowed = AllowedHosts::List(vec!["localhost".to_string()]);
        let req = Request::builder()
            .header(header::HOST, "localhost:9000")
            .body(Body::empty())
            .unwrap();
        assert!(host_allowed(&allowed, &req));

        let req = Request::builder()
            .header(header::HOST, "evil.example:9000")
            .body(Body::empty())
            .unwrap();
        assert!(!host_allowed(&allowed, &req));
        assert!(host_allowed(&AllowedHosts::All, &req));
    }
}
