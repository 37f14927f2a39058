//! HTTP middleware stack for the gateway.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, performance)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlate gateway logs with frontend reports)
//! 4. CORS (the storefront frontend is served from another origin)

pub mod request_id;

pub use request_id::request_id_middleware;
