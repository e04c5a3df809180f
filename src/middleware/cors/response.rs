use http::Method;
use tracing::debug;

use super::origin::CorsRequest;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Per-response CORS negotiation state.
///
/// Created fresh for every response and discarded when the response is
/// sent; mutated only by rule handlers and by the application while one
/// request is being handled, so it needs no synchronization. The "add"
/// setters are cumulative; `allow_origin`/`allow_any_origin` are
/// last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct CorsState {
    allowed_origin: Option<String>,
    exposed_headers: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<String>,
    credentials_allowed: bool,
    max_age: Option<u64>,
}

impl CorsState {
    /// Set the origin the response will allow. The most recent call before
    /// header assembly wins.
    pub fn allow_origin(&mut self, origin: impl Into<String>) {
        self.allowed_origin = Some(origin.into());
    }

    /// Allow any origin (`*`).
    pub fn allow_any_origin(&mut self) {
        self.allow_origin("*");
    }

    /// Add header names to expose on regular (non-preflight) responses.
    pub fn expose_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_headers.extend(names.into_iter().map(Into::into));
    }

    /// Add header names to allow on a preflighted request.
    pub fn allow_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers.extend(names.into_iter().map(Into::into));
    }

    /// Add HTTP verbs to allow on a preflighted request.
    pub fn allow_methods<I>(&mut self, verbs: I)
    where
        I: IntoIterator<Item = Method>,
    {
        self.allowed_methods
            .extend(verbs.into_iter().map(|m| m.as_str().to_ascii_uppercase()));
    }

    /// Allow credentials (cookies, authorization headers) on the request.
    pub fn allow_credentials(&mut self) {
        self.credentials_allowed = true;
    }

    /// Number of seconds a preflight response may be cached.
    pub fn set_max_age(&mut self, seconds: u64) {
        self.max_age = Some(seconds);
    }

    #[must_use]
    pub fn allowed_origin(&self) -> Option<&str> {
        self.allowed_origin.as_deref()
    }

    #[must_use]
    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    #[must_use]
    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    /// Allowed verbs as uppercase tokens.
    #[must_use]
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    #[must_use]
    pub fn credentials_allowed(&self) -> bool {
        self.credentials_allowed
    }

    #[must_use]
    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    /// Fill in static configuration without overriding anything already set
    /// on this state: option fields only when unset, set fields by union,
    /// the credentials flag by or-ing.
    pub(crate) fn merge_defaults(&mut self, defaults: &CorsState) {
        if self.allowed_origin.is_none() {
            self.allowed_origin = defaults.allowed_origin.clone();
        }
        self.exposed_headers
            .extend(defaults.exposed_headers.iter().cloned());
        self.allowed_headers
            .extend(defaults.allowed_headers.iter().cloned());
        self.allowed_methods
            .extend(defaults.allowed_methods.iter().cloned());
        self.credentials_allowed |= defaults.credentials_allowed;
        if self.max_age.is_none() {
            self.max_age = defaults.max_age;
        }
    }
}

/// Canonicalize a header name: split on any run of `-` or `_`, capitalize
/// each segment, rejoin with `-`.
///
/// `x_thingfish_owner` becomes `X-Thingfish-Owner`.
#[must_use]
pub fn canonicalize_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if i > 0 {
            out.push('-');
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

fn join_sorted(mut tokens: Vec<String>) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    tokens.sort();
    tokens.dedup();
    Some(tokens.join(" "))
}

/// Build a header value from a collection of header names: canonicalized,
/// sorted, deduplicated, and joined with a single space. `None` when the
/// collection is empty, so the header is omitted entirely.
///
/// Space-joining is this system's existing wire convention and is preserved
/// for compatibility.
pub fn build_header_list<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join_sorted(
        names
            .into_iter()
            .map(|name| canonicalize_header_name(name.as_ref()))
            .collect(),
    )
}

/// The CORS view of an outgoing response: assembly of the
/// `Access-Control-*` headers from the response's [`CorsState`].
pub trait CorsResponse {
    /// Assemble the CORS headers onto the response. Run once per response,
    /// just before it is returned.
    ///
    /// The allowed origin falls back to reflecting the request's own origin
    /// (verbatim header value) when none was configured; an absent or empty
    /// resolved origin skips the origin-related headers entirely. Preflight
    /// responses get the `Allow-Headers`/`Allow-Methods`/`Max-Age` family
    /// and never `Expose-Headers`; regular responses get the inverse.
    fn add_cors_headers(&mut self, req: &HandlerRequest);
}

impl CorsResponse for HandlerResponse {
    fn add_cors_headers(&mut self, req: &HandlerRequest) {
        let resolved = self
            .cors
            .allowed_origin()
            .map(str::to_string)
            .or_else(|| {
                // Reflect the raw header value, not the parsed URI: the
                // parser normalizes (e.g. appends a path slash) and the
                // reflected origin must match the request byte for byte.
                req.origin()
                    .and_then(|_| req.get_header("origin"))
                    .map(String::from)
            })
            .filter(|origin| !origin.is_empty());

        if let Some(origin) = resolved {
            if origin != "*" {
                let vary = match self.get_header("Vary") {
                    Some(existing) => {
                        let already = existing
                            .split(',')
                            .any(|token| token.trim().eq_ignore_ascii_case("origin"));
                        if already {
                            None
                        } else {
                            Some(format!("{existing}, origin"))
                        }
                    }
                    None => Some("origin".to_string()),
                };
                if let Some(value) = vary {
                    self.set_header("Vary", value);
                }
            }
            self.set_header("Access-Control-Allow-Origin", origin);
        }

        if self.cors.credentials_allowed() {
            self.set_header("Access-Control-Allow-Credentials", "true".to_string());
        }

        if req.is_preflight() {
            debug!(request_id = %req.request_id, "preflight response, adding -Allow- headers");
            if let Some(value) = build_header_list(self.cors.allowed_headers()) {
                self.set_header("Access-Control-Allow-Headers", value);
            }
            // Verb tokens stay raw: uppercase, sorted, deduplicated, space-joined.
            if let Some(value) = join_sorted(self.cors.allowed_methods().to_vec()) {
                self.set_header("Access-Control-Allow-Methods", value);
            }
            if let Some(seconds) = self.cors.max_age() {
                self.set_header("Access-Control-Max-Age", seconds.to_string());
            }
        } else {
            debug!(request_id = %req.request_id, "regular response, adding -Expose- headers");
            if let Some(value) = build_header_list(self.cors.exposed_headers()) {
                self.set_header("Access-Control-Expose-Headers", value);
            }
        }
    }
}
