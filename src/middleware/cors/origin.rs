use http::Method;
use tracing::debug;
use url::Url;

use crate::dispatcher::HandlerRequest;

/// The CORS view of an incoming request: origin extraction and the
/// cross-origin/preflight classification the middleware branches on.
///
/// Implemented for [`HandlerRequest`]; the parsed `Origin` header is cached
/// in the request for its lifetime, so repeated queries never re-parse.
pub trait CorsRequest {
    /// The URI in the `Origin` header, parsed once per request. `None` when
    /// the header is absent or unparsable (fail-soft: a malformed origin is
    /// treated as no origin, never an error).
    fn origin(&self) -> Option<&Url>;

    /// True iff an origin is present and its host differs from the `Host`
    /// header value. The compare is a case-sensitive string compare on the
    /// host alone; scheme and port are not considered.
    fn is_cross_origin(&self) -> bool;

    /// True iff the request is a CORS preflight: an origin is present, the
    /// method is `OPTIONS`, and `Access-Control-Request-Method` is set (its
    /// value is not otherwise validated).
    fn is_preflight(&self) -> bool;
}

impl CorsRequest for HandlerRequest {
    fn origin(&self) -> Option<&Url> {
        self.origin
            .get_or_init(|| {
                let raw = self.get_header("origin")?;
                match Url::parse(raw) {
                    Ok(origin) => Some(origin),
                    Err(err) => {
                        debug!(
                            request_id = %self.request_id,
                            origin = %raw,
                            error = %err,
                            "unparsable Origin header, treating as absent"
                        );
                        None
                    }
                }
            })
            .as_ref()
    }

    fn is_cross_origin(&self) -> bool {
        match self.origin() {
            Some(origin) => origin.host_str() != self.get_header("host"),
            None => false,
        }
    }

    fn is_preflight(&self) -> bool {
        self.origin().is_some()
            && self.method == Method::OPTIONS
            && self.get_header("access-control-request-method").is_some()
    }
}
