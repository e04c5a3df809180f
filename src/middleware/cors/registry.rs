use std::fmt;
use std::sync::Arc;

use http::Method;
use regex::Regex;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// What a rule matches its path against.
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// No pattern: the rule applies to every path
    Any,
    /// Exact string equality against the application-relative path
    Exact(String),
    /// Regex match (partial, not anchored) against the application-relative path
    Regex(Regex),
}

impl RulePattern {
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RulePattern::Any => true,
            RulePattern::Exact(p) => p == path,
            RulePattern::Regex(re) => re.is_match(path),
        }
    }
}

/// Callback invoked for each matching rule during preflight handling; may
/// call any [`CorsState`](super::CorsState) setter on the response.
pub type RuleHandler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync>;

/// A configured `(pattern, handler)` pair that customizes CORS response
/// state for matching request paths.
#[derive(Clone)]
pub struct AccessControlRule {
    pattern: RulePattern,
    verbs: Option<Vec<Method>>,
    handler: Option<RuleHandler>,
}

impl AccessControlRule {
    #[must_use]
    pub fn new(pattern: RulePattern) -> Self {
        Self {
            pattern,
            verbs: None,
            handler: None,
        }
    }

    /// Restrict the rule to the given HTTP verbs.
    ///
    /// Advisory only: the verbs are stored with the rule but matching does
    /// not consult them. TODO: filter matching rules by request verb once
    /// the semantics of verb-scoped rules are settled.
    #[must_use]
    pub fn with_verbs(mut self, verbs: &[Method]) -> Self {
        self.verbs = Some(verbs.to_vec());
        self
    }

    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    #[must_use]
    pub fn verbs(&self) -> Option<&[Method]> {
        self.verbs.as_deref()
    }

    #[must_use]
    pub fn handler(&self) -> Option<&RuleHandler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for AccessControlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlRule")
            .field("pattern", &self.pattern)
            .field("verbs", &self.verbs)
            .field(
                "handler",
                &self.handler.as_ref().map(|_| "<function>"),
            )
            .finish()
    }
}

/// The ordered access-control rule registry.
///
/// Rules are appended at application setup time and are read-only for the
/// rest of the process lifetime, so concurrent readers need no locking.
/// Duplicate and overlapping patterns are legal; matching is a fan-out, not
/// a first-match short-circuit, so several rules can each configure a
/// different facet of the same response.
#[derive(Debug, Clone, Default)]
pub struct AccessControlRegistry {
    rules: Vec<AccessControlRule>,
}

impl AccessControlRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Insertion order is significant and preserved.
    pub fn register(&mut self, rule: AccessControlRule) {
        self.rules.push(rule);
    }

    /// Every rule whose pattern matches `path`, in registration order.
    pub fn matching_rules<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a AccessControlRule> {
        self.rules.iter().filter(move |rule| rule.pattern.matches(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
