mod core;
pub mod cors;

pub use self::core::Middleware;
pub use cors::{CorsMiddleware, CorsMiddlewareBuilder};
