//! Cross-Origin Resource Sharing (CORS) negotiation.
//!
//! Decides, per request, whether and how to expose cross-origin access, and
//! assembles the `Access-Control-*` response headers. Three pieces:
//!
//! - [`CorsRequest`]: origin extraction and cross-origin/preflight
//!   classification on the request,
//! - [`AccessControlRegistry`]: the ordered, path-scoped rule registry
//!   configured once at setup,
//! - [`CorsState`]/[`CorsResponse`]: per-response negotiation state and the
//!   deterministic header-assembly algorithm.
//!
//! [`CorsMiddleware`] ties them together as a middleware over the inner
//! application handler:
//!
//! - no `Origin` header: the request and response pass through untouched;
//! - preflight (`OPTIONS` + `Origin` + `Access-Control-Request-Method`):
//!   matching rule handlers run, then a terminal `204 No Content` response
//!   is returned without ever invoking the inner handler;
//! - any other request with an origin: the inner handler runs and the CORS
//!   headers are merged onto its response.
//!
//! Rules only configure headers. Whether a cross-origin caller may actually
//! do anything is the application's authorization decision, not this
//! module's.

mod builder;
mod error;
mod origin;
mod registry;
mod response;

pub use builder::CorsMiddlewareBuilder;
pub use error::CorsConfigError;
pub use origin::CorsRequest;
pub use registry::{AccessControlRegistry, AccessControlRule, RuleHandler, RulePattern};
pub use response::{build_header_list, canonicalize_header_name, CorsResponse, CorsState};

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::dispatcher::{HandlerRequest, HandlerResponse, HeaderVec};
use crate::middleware::Middleware;

/// CORS middleware: wraps the inner application handler and negotiates
/// cross-origin access per request.
///
/// Configured once at setup (see [`CorsMiddleware::builder`]) and read-only
/// afterwards; safe to share across concurrently handled requests without
/// locking.
#[derive(Debug)]
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    defaults: CorsState,
    registry: AccessControlRegistry,
}

impl CorsMiddleware {
    /// Simple mode: allow the given origins, no rules, no other defaults.
    #[must_use]
    pub fn new(origins: &[&str]) -> Self {
        Self::from_parts(
            origins.iter().map(|s| s.to_string()).collect(),
            CorsState::default(),
            AccessControlRegistry::new(),
        )
    }

    #[must_use]
    pub fn builder() -> CorsMiddlewareBuilder {
        CorsMiddlewareBuilder::new()
    }

    pub(crate) fn from_parts(
        allowed_origins: Vec<String>,
        defaults: CorsState,
        registry: AccessControlRegistry,
    ) -> Self {
        Self {
            allowed_origins,
            defaults,
            registry,
        }
    }

    /// Resolve the statically configured origin for this request, if the
    /// allow-list says anything at all. An empty string means "suppress":
    /// the list is non-empty and the request's origin is not on it, so
    /// header assembly skips the origin headers entirely.
    fn static_origin(&self, req: &HandlerRequest) -> Option<String> {
        if self.allowed_origins.is_empty() {
            return None;
        }
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }
        let raw = req.origin().and_then(|_| req.get_header("origin"))?;
        if self.allowed_origins.iter().any(|o| o == raw) {
            Some(raw.to_string())
        } else {
            debug!(
                request_id = %req.request_id,
                origin = %raw,
                "origin not on the allow-list, suppressing origin headers"
            );
            Some(String::new())
        }
    }

    /// Fill the static configuration into a response's state without
    /// overriding anything a rule handler or the application already set.
    fn apply_defaults(&self, req: &HandlerRequest, state: &mut CorsState) {
        state.merge_defaults(&self.defaults);
        if state.allowed_origin().is_none() {
            if let Some(origin) = self.static_origin(req) {
                state.allow_origin(origin);
            }
        }
    }

    /// Drive rule evaluation for a preflight request and produce the
    /// terminal response. The inner application handler is never invoked.
    ///
    /// Every rule matching the application-relative path runs, in
    /// registration order; each handler mutates the shared response state
    /// cumulatively, so a later `allow_origin` wins over an earlier one
    /// while header/method additions union. A rule handler that panics
    /// propagates: it indicates a misconfigured security policy and is
    /// never swallowed here.
    #[must_use]
    pub fn handle_preflight(&self, req: &HandlerRequest) -> HandlerResponse {
        let mut res = HandlerResponse::new(204, HeaderVec::new(), Value::Null);
        self.apply_defaults(req, &mut res.cors);

        let path = req.app_path();
        let mut matched = 0usize;
        // Fan-out: every matching rule runs, not just the first.
        for rule in self.registry.matching_rules(path) {
            matched += 1;
            if let Some(handler) = rule.handler() {
                handler(req, &mut res);
            }
        }
        debug!(
            request_id = %req.request_id,
            path = %path,
            matched,
            "preflight rules evaluated"
        );

        res.add_cors_headers(req);
        // Terminal 204 regardless of what the rules did to status or body.
        res.status = 204;
        res.body = Value::Null;
        res
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        if req.origin().is_none() {
            return None;
        }
        if req.is_preflight() {
            debug!(
                request_id = %req.request_id,
                path = %req.app_path(),
                "preflight request, short-circuiting the inner handler"
            );
            return Some(self.handle_preflight(req));
        }
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        if req.origin().is_none() {
            // Not a CORS request; leave the inner handler's response
            // byte-identical.
            return;
        }
        if req.is_preflight() {
            // Fully assembled in before().
            return;
        }
        self.apply_defaults(req, &mut res.cors);
        res.add_cors_headers(req);
    }
}
