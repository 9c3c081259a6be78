//! Response bodies specific to the service.
//!
//! `/api/verify` bodies live in [`modsum_verify::wire`] so the client and the
//! service share one definition.

use serde::{Deserialize, Serialize};

/// Response from `GET /api/isPrime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsPrimeResponse {
    pub ok: bool,
    pub value: i64,
    pub is_prime: bool,
}

/// Response from `GET /api/explain`: floor division of `data` by `|key|`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub ok: bool,
    pub data: i64,
    pub key: i64,
    pub quotient: i64,
    pub remainder: i64,
}
