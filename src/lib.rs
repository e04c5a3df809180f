//! # crossgate
//!
//! **crossgate** is a Cross-Origin Resource Sharing (CORS) negotiation
//! middleware. It decides, per incoming HTTP request, whether and how to
//! expose cross-origin access, and assembles the correct set of
//! `Access-Control-*` response headers; routing, sessions, authentication
//! and the HTTP transport itself stay with the host application it wraps.
//!
//! ## Architecture
//!
//! - **[`dispatcher`]** - concrete request/response types and the
//!   synchronous middleware seam around the inner application handler
//! - **[`middleware`]** - the pluggable `before`/`after` middleware trait
//! - **[`middleware::cors`]** - origin/preflight classification, the
//!   ordered access-control rule registry with path-pattern matching, and
//!   the header-assembly algorithm (canonicalization, deduplication,
//!   `Vary` merging)
//! - **[`ids`]** - ULID request ids for log correlation
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use crossgate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec};
//! use crossgate::middleware::cors::{CorsMiddleware, RulePattern};
//! use http::Method;
//!
//! let cors = CorsMiddleware::builder()
//!     .access_control(RulePattern::Exact("/verify".into()), |_req, res| {
//!         res.cors.allow_headers(["content-type", "x-requested-with"]);
//!         res.cors.set_max_age(300);
//!     })
//!     .build()
//!     .expect("valid CORS configuration");
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_middleware(Arc::new(cors));
//!
//! // A cross-origin GET: the inner handler runs and the CORS headers are
//! // merged onto its response, reflecting the request's own origin.
//! let mut headers = HeaderVec::new();
//! headers.push((Arc::from("origin"), "https://acme.com".to_string()));
//! let req = HandlerRequest::new(Method::GET, "/verify", headers);
//! let res = dispatcher.dispatch(req, |_req| {
//!     HandlerResponse::json(200, serde_json::json!({ "ok": true }))
//! });
//!
//! assert_eq!(res.status, 200);
//! assert_eq!(
//!     res.get_header("access-control-allow-origin"),
//!     Some("https://acme.com")
//! );
//! ```
//!
//! Preflight `OPTIONS` requests short-circuit: matching access-control rule
//! handlers run against the response state, the headers are assembled, and
//! a terminal `204 No Content` is returned without invoking the inner
//! handler. Requests without an `Origin` header pass through byte-identical.

pub mod dispatcher;
pub mod ids;
pub mod middleware;

pub use middleware::cors::{
    AccessControlRegistry, AccessControlRule, CorsConfigError, CorsMiddleware,
    CorsMiddlewareBuilder, CorsRequest, CorsResponse, CorsState, RulePattern,
};
pub use middleware::Middleware;
