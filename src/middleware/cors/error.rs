use std::fmt;

/// CORS configuration error, returned by
/// [`CorsMiddlewareBuilder::build`](super::CorsMiddlewareBuilder::build)
/// when the static configuration is invalid. Misconfiguration is a
/// setup-time error; nothing on the per-request path can produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// A wildcard allow-list entry (`*`) combined with the static
    /// credentials default. The CORS protocol forbids the combination;
    /// exact origins must be listed when credentials are on by default.
    WildcardWithCredentials,
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: cannot combine a wildcard origin (*) \
                    with credentials allowed by default; list exact origins instead"
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
