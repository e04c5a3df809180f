use http::Method;
use tracing::debug;

use super::registry::{AccessControlRegistry, AccessControlRule, RulePattern};
use super::response::CorsState;
use super::{CorsConfigError, CorsMiddleware};

/// Builder for [`CorsMiddleware`].
///
/// Two configuration styles compose freely:
///
/// - the static allow-list and per-response defaults (`allow_origins`,
///   `allow_credentials`, ...), applied to every response before header
///   assembly, and
/// - path-scoped access-control rules (`access_control`), whose handlers
///   run during preflight handling and may split configuration by concern:
///   one rule can pin the allowed origin while another adds allowed
///   headers, cumulatively.
///
/// Everything here happens once at application setup; the built middleware
/// is immutable and shared across all concurrent requests.
///
/// # Example
///
/// ```rust,ignore
/// use crossgate::middleware::cors::{CorsMiddleware, RulePattern};
///
/// let cors = CorsMiddleware::builder()
///     .allow_origins(&["https://acme.com"])
///     .access_control(RulePattern::Exact("/verify".into()), |_req, res| {
///         res.cors.allow_headers(["content-type"]);
///         res.cors.set_max_age(300);
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct CorsMiddlewareBuilder {
    allowed_origins: Vec<String>,
    defaults: CorsState,
    registry: AccessControlRegistry,
}

impl CorsMiddlewareBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the static origin allow-list (legacy simple mode). An entry
    /// `"*"` allows any origin. With a non-empty list, responses to requests
    /// from unlisted origins carry no origin headers at all; with no list,
    /// the request's own origin is reflected.
    #[must_use]
    pub fn allow_origins(mut self, origins: &[&str]) -> Self {
        self.allowed_origins
            .extend(origins.iter().map(|s| s.to_string()));
        self
    }

    /// Shorthand for an allow-list of just `"*"`.
    #[must_use]
    pub fn allow_any_origin(self) -> Self {
        self.allow_origins(&["*"])
    }

    /// Allow credentials on every response by default.
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        if allow {
            self.defaults.allow_credentials();
        }
        self
    }

    /// Header names exposed on every regular response by default.
    #[must_use]
    pub fn expose_headers(mut self, names: &[&str]) -> Self {
        self.defaults.expose_headers(names.iter().copied());
        self
    }

    /// Header names allowed on every preflighted request by default.
    #[must_use]
    pub fn allowed_headers(mut self, names: &[&str]) -> Self {
        self.defaults.allow_headers(names.iter().copied());
        self
    }

    /// HTTP verbs allowed on every preflighted request by default.
    #[must_use]
    pub fn allowed_methods(mut self, verbs: &[Method]) -> Self {
        self.defaults.allow_methods(verbs.iter().cloned());
        self
    }

    /// Default preflight cache duration in seconds.
    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.defaults.set_max_age(seconds);
        self
    }

    /// Register an access-control rule: `handler` runs for every preflight
    /// whose application-relative path matches `pattern`, in registration
    /// order relative to the other rules. Duplicate and overlapping
    /// patterns are legal and all run.
    #[must_use]
    pub fn access_control<F>(mut self, pattern: RulePattern, handler: F) -> Self
    where
        F: Fn(&crate::dispatcher::HandlerRequest, &mut crate::dispatcher::HandlerResponse)
            + Send
            + Sync
            + 'static,
    {
        self.registry
            .register(AccessControlRule::new(pattern).with_handler(handler));
        self
    }

    /// Register a pre-built rule (pattern-less, handler-less, or carrying
    /// advisory verb options).
    #[must_use]
    pub fn access_control_rule(mut self, rule: AccessControlRule) -> Self {
        self.registry.register(rule);
        self
    }

    /// Validate the static configuration and build the middleware.
    ///
    /// # Errors
    ///
    /// [`CorsConfigError::WildcardWithCredentials`] when the allow-list
    /// contains `"*"` and credentials are allowed by default.
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        if self.defaults.credentials_allowed() && self.allowed_origins.iter().any(|o| o == "*") {
            return Err(CorsConfigError::WildcardWithCredentials);
        }

        debug!(
            origins = self.allowed_origins.len(),
            rules = self.registry.len(),
            "cors middleware configured"
        );
        Ok(CorsMiddleware::from_parts(
            self.allowed_origins,
            self.defaults,
            self.registry,
        ))
    }
}
