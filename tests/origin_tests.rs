use std::sync::Arc;

use crossgate::dispatcher::{HandlerRequest, HeaderVec};
use crossgate::middleware::cors::CorsRequest;
use http::Method;

// Helper to build a request with the given header pairs
fn request_with_headers(method: Method, path: &str, pairs: &[(&str, &str)]) -> HandlerRequest {
    let mut headers = HeaderVec::new();
    for (name, value) in pairs {
        headers.push((Arc::from(*name), value.to_string()));
    }
    HandlerRequest::new(method, path, headers)
}

#[test]
fn test_origin_parsed_from_header() {
    let req = request_with_headers(Method::GET, "/", &[("origin", "https://acme.com")]);

    let origin = req.origin().expect("origin should parse");
    assert_eq!(origin.scheme(), "https");
    assert_eq!(origin.host_str(), Some("acme.com"));
}

#[test]
fn test_origin_header_lookup_is_case_insensitive() {
    // HTTP headers are case-insensitive per RFC 7230
    let req = request_with_headers(Method::GET, "/", &[("Origin", "https://acme.com")]);

    assert!(req.origin().is_some());
}

#[test]
fn test_missing_origin_header() {
    let req = request_with_headers(Method::GET, "/", &[("host", "acme.com")]);

    assert!(req.origin().is_none());
    assert!(!req.is_cross_origin());
    assert!(!req.is_preflight());
}

#[test]
fn test_unparsable_origin_treated_as_absent() {
    // Fail-soft: a malformed Origin is no origin, never an error
    let req = request_with_headers(Method::GET, "/", &[("origin", "not a uri")]);

    assert!(req.origin().is_none());
    assert!(!req.is_cross_origin());
}

#[test]
fn test_opaque_null_origin_treated_as_absent() {
    // Browsers send `Origin: null` for sandboxed documents; it has no host
    // and does not parse as an absolute URI
    let req = request_with_headers(Method::GET, "/", &[("origin", "null")]);

    assert!(req.origin().is_none());
}

#[test]
fn test_same_host_is_not_cross_origin() {
    let req = request_with_headers(
        Method::POST,
        "/",
        &[("origin", "https://acme.com"), ("host", "acme.com")],
    );

    assert!(!req.is_cross_origin());
}

#[test]
fn test_different_host_is_cross_origin() {
    let req = request_with_headers(
        Method::GET,
        "/",
        &[("origin", "https://other.example"), ("host", "acme.com")],
    );

    assert!(req.is_cross_origin());
}

#[test]
fn test_missing_host_header_counts_as_cross_origin() {
    let req = request_with_headers(Method::GET, "/", &[("origin", "https://acme.com")]);

    assert!(req.is_cross_origin());
}

#[test]
fn test_preflight_classification() {
    let req = request_with_headers(
        Method::OPTIONS,
        "/verify",
        &[
            ("origin", "https://acme.com"),
            ("access-control-request-method", "POST"),
        ],
    );

    assert!(req.is_preflight());
}

#[test]
fn test_options_without_request_method_is_not_preflight() {
    let req = request_with_headers(Method::OPTIONS, "/verify", &[("origin", "https://acme.com")]);

    assert!(!req.is_preflight());
}

#[test]
fn test_non_options_with_request_method_is_not_preflight() {
    let req = request_with_headers(
        Method::GET,
        "/verify",
        &[
            ("origin", "https://acme.com"),
            ("access-control-request-method", "POST"),
        ],
    );

    assert!(!req.is_preflight());
}

#[test]
fn test_options_without_origin_is_not_preflight() {
    let req = request_with_headers(
        Method::OPTIONS,
        "/verify",
        &[("access-control-request-method", "POST")],
    );

    assert!(!req.is_preflight());
}
