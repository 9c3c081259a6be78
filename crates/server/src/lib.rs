//! Verification service.
//!
//! Serves the endpoint the simulator's [`HttpVerifier`](modsum_verify::HttpVerifier)
//! consumes, plus two number-theory helpers:
//!
//! | Route | Description |
//! |---|---|
//! | `GET/POST /api/verify` | sender and receiver checksums for a frame |
//! | `GET /api/isPrime` | primality of `value` |
//! | `GET /api/explain` | floor quotient and remainder of `data` by the key's magnitude |

mod handlers;
mod routes;
mod server;
pub mod types;

pub use handlers::{
    MESSAGE_METHOD_NOT_ALLOWED, MESSAGE_MISSING_EXPLAIN, MESSAGE_MISSING_VALUE,
    MESSAGE_MISSING_VERIFY,
};
pub use routes::create_router;
pub use server::{ServerConfig, ServerError, ServerHandle, VerifyServer};
