use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossgate::dispatcher::{HandlerRequest, HandlerResponse, HeaderVec};
use crossgate::middleware::cors::{build_header_list, canonicalize_header_name, CorsResponse};
use http::Method;
use serde_json::Value;

fn bench_canonicalize(c: &mut Criterion) {
    c.bench_function("canonicalize_header_name", |b| {
        b.iter(|| {
            for name in ["content_type", "x-thingfish-owner", "X_OFFSET", "accept"] {
                black_box(canonicalize_header_name(black_box(name)));
            }
        })
    });
}

fn bench_build_header_list(c: &mut Criterion) {
    let names = [
        "content_type",
        "vary",
        "x-ordered-by",
        "x-offset",
        "x-set-size",
    ];
    c.bench_function("build_header_list", |b| {
        b.iter(|| black_box(build_header_list(black_box(names))))
    });
}

fn bench_add_cors_headers(c: &mut Criterion) {
    let mut headers = HeaderVec::new();
    headers.push((Arc::from("origin"), "https://other.example".to_string()));
    headers.push((Arc::from("host"), "acme.com".to_string()));
    let req = HandlerRequest::new(Method::GET, "/verify", headers);

    c.bench_function("add_cors_headers", |b| {
        b.iter(|| {
            let mut res = HandlerResponse::new(200, HeaderVec::new(), Value::Null);
            res.cors.expose_headers(["x-set-size", "x-offset"]);
            res.add_cors_headers(black_box(&req));
            black_box(res)
        })
    });
}

criterion_group!(
    benches,
    bench_canonicalize,
    bench_build_header_list,
    bench_add_cors_headers
);
criterion_main!(benches);
