//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`errors`]**: [`AppError`] and the JSON error body every endpoint returns
//! - **[`server`]**: router factory with OpenAPI docs, health endpoints,
//!   graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`extractors`]**: [`JsonBody`], a JSON extractor rejecting with [`AppError`]

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::JsonBody;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
