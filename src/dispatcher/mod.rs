//! # Dispatcher Module
//!
//! The synchronous seam between the host transport and the application
//! handler. It owns the concrete request/response types the middleware
//! pipeline operates on and applies middleware hooks around the inner
//! handler:
//!
//! 1. Every middleware's `before` hook runs in registration order; the first
//!    one to return a response short-circuits the inner handler (this is how
//!    a CORS preflight terminates without reaching the application).
//! 2. The inner handler runs (unless short-circuited).
//! 3. Every middleware's `after` hook runs against the shared response.
//!
//! There is no blocking I/O and no suspension point anywhere in this module;
//! requests are handled one at a time per thread and the dispatcher itself is
//! immutable once configured.

mod core;

pub use self::core::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS};
