use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// A hook pair applied around the inner application handler.
///
/// `before` may return a response to short-circuit the inner handler
/// entirely (a terminal response, e.g. a CORS preflight). `after` runs
/// against the shared response object once one exists, whether it came from
/// the inner handler or from an earlier middleware's short-circuit.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
