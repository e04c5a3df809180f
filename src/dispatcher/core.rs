use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;
use url::Url;

use crate::ids::RequestId;
use crate::middleware::cors::CorsState;
use crate::middleware::Middleware;

/// Maximum inline headers before heap allocation. Most requests carry well
/// under sixteen headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names use `Arc<str>` because the same names repeat across requests
/// (`Origin`, `Host`, `Content-Type`, ...) and `Arc::clone()` is an O(1)
/// atomic increment; values are per-request data and stay `String`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// An incoming request as seen by the middleware pipeline.
///
/// The `origin` cell backs the CORS request capability
/// ([`CorsRequest`](crate::middleware::cors::CorsRequest)): the `Origin`
/// header is parsed at most once per request and the parse result is cached
/// for the request's lifetime.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Correlation id for tracing, taken from `X-Request-Id` when present
    pub request_id: RequestId,
    /// HTTP method (GET, OPTIONS, ...)
    pub method: Method,
    /// Full request path as received from the transport
    pub path: String,
    /// Prefix under which the application is mounted; empty when mounted at root
    pub mount: String,
    /// HTTP request headers
    pub headers: HeaderVec,
    /// Request body parsed as JSON, if any
    pub body: Option<Value>,
    pub(crate) origin: OnceCell<Option<Url>>,
}

impl HandlerRequest {
    /// Create a request for an application mounted at the server root.
    #[must_use]
    pub fn new(method: Method, path: &str, headers: HeaderVec) -> Self {
        Self::mounted(method, "", path, headers)
    }

    /// Create a request for an application mounted under `mount`; `path` is
    /// the full path as received, including the mount prefix.
    #[must_use]
    pub fn mounted(method: Method, mount: &str, path: &str, headers: HeaderVec) -> Self {
        let request_id = RequestId::from_header_or_new(find_header(&headers, "x-request-id"));
        Self {
            request_id,
            method,
            path: path.to_string(),
            mount: mount.to_string(),
            headers,
            body: None,
            origin: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a header value by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The path relative to the mounted application: the full path with the
    /// mount prefix stripped. Access-control rules match against this form.
    #[must_use]
    pub fn app_path(&self) -> &str {
        if self.mount.is_empty() {
            return &self.path;
        }
        match self.path.strip_prefix(self.mount.as_str()) {
            Some("") => "/",
            Some(rest) => rest,
            None => &self.path,
        }
    }
}

/// A response flowing back through the middleware pipeline.
///
/// Every response carries a fresh [`CorsState`]: the per-response CORS
/// negotiation state that rule handlers and the application mutate before
/// the `Access-Control-*` headers are assembled.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
    /// Per-response CORS negotiation state, discarded when the response is sent
    #[serde(skip_serializing)]
    pub cors: CorsState,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
            cors: CorsState::default(),
        }
    }

    /// A JSON response with the content type preset.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    /// Get a header value by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Add or replace a header (replacement is case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Minimal synchronous dispatch seam between the transport and the
/// application handler.
///
/// Middleware runs in registration order: every `before` hook is invoked and
/// the first early response short-circuits the inner handler; `after` hooks
/// then run against whichever response was produced. Each request is handled
/// synchronously and independently, so a `Dispatcher` shared across threads
/// needs no locking once configured.
#[derive(Clone, Default)]
pub struct Dispatcher {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add middleware to the pipeline. Execution order is registration order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run `req` through the middleware pipeline around the inner `handler`.
    pub fn dispatch<F>(&self, req: HandlerRequest, handler: F) -> HandlerResponse
    where
        F: FnOnce(&HandlerRequest) -> HandlerResponse,
    {
        debug!(
            request_id = %req.request_id,
            method = ?req.method,
            path = %req.path,
            "dispatching request"
        );

        let mut early: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            if early.is_none() {
                early = mw.before(&req);
            } else {
                mw.before(&req);
            }
        }

        let (mut resp, latency) = match early {
            Some(resp) => (resp, Duration::ZERO),
            None => {
                let start = Instant::now();
                let resp = handler(&req);
                (resp, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&req, &mut resp, latency);
        }

        debug!(
            request_id = %req.request_id,
            status = resp.status,
            latency_ms = latency.as_millis() as u64,
            "request complete"
        );
        resp
    }
}
