//! Route configuration for the verification API.

use crate::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};

/// Create the router with all API routes.
pub fn create_router() -> Router {
    Router::new()
        .route(
            "/api/verify",
            get(verify_query_handler)
                .post(verify_body_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/isPrime",
            get(is_prime_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/api/explain",
            get(explain_handler).fallback(method_not_allowed_handler),
        )
}
