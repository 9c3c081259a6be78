//! HTTP request handlers for the verification API.
//!
//! Every response is JSON with `Cache-Control: no-store`. Failures carry
//! `{ "ok": false, "message": ... }`.

use crate::types::{ExplainResponse, IsPrimeResponse};
use axum::{
    extract::{rejection::QueryRejection, FromRequest, Query, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use modsum_numeric::{floor_divide, is_prime, NumericError};
use modsum_verify::wire::{ErrorResponse, VerifyResponse, MESSAGE_CORRUPTED, MESSAGE_NO_ERROR};
use modsum_verify::LocalVerifier;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub const MESSAGE_MISSING_VERIFY: &str = "Missing parameters: sentData, key, receivedData";
pub const MESSAGE_MISSING_VALUE: &str = "Missing parameter: value";
pub const MESSAGE_MISSING_EXPLAIN: &str = "Missing parameters: data, key";
pub const MESSAGE_METHOD_NOT_ALLOWED: &str = "Method not allowed";

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_response(status, &ErrorResponse::new(message))
}

/// Named request parameters, from a query string, form body or JSON body.
#[derive(Debug, Default)]
struct Params(HashMap<String, String>);

impl Params {
    fn from_query(query: Result<Query<HashMap<String, String>>, QueryRejection>) -> Self {
        query.map(|Query(map)| Self(map)).unwrap_or_default()
    }

    fn from_json(map: serde_json::Map<String, Value>) -> Self {
        let values = map
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::Number(n) => Some((name, n.to_string())),
                Value::String(s) => Some((name, s)),
                _ => None,
            })
            .collect();
        Self(values)
    }

    fn int(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// The key, accepting the legacy `prime` name.
    fn key(&self) -> Option<i64> {
        self.int("key").or_else(|| self.int("prime"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Verify
// ═══════════════════════════════════════════════════════════════════════════

/// Handler for `GET /api/verify?sentData=&key=&receivedData=`.
pub async fn verify_query_handler(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    verify(&Params::from_query(query))
}

/// Handler for `POST /api/verify` with a JSON or form-encoded body.
pub async fn verify_body_handler(request: Request) -> Response {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let params = if is_json {
        match Json::<serde_json::Map<String, Value>>::from_request(request, &()).await {
            Ok(Json(map)) => Params::from_json(map),
            Err(e) => {
                debug!(error = %e, "Unreadable JSON body");
                Params::default()
            }
        }
    } else {
        match Form::<HashMap<String, String>>::from_request(request, &()).await {
            Ok(Form(map)) => Params(map),
            Err(e) => {
                debug!(error = %e, "Unreadable form body");
                Params::default()
            }
        }
    };

    verify(&params)
}

fn verify(params: &Params) -> Response {
    let (Some(sent_data), Some(key), Some(received_data)) = (
        params.int("sentData"),
        params.key(),
        params.int("receivedData"),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, MESSAGE_MISSING_VERIFY);
    };

    match LocalVerifier::new().verify_now(sent_data, key, received_data) {
        Ok(result) => {
            debug!(sent_data, key, received_data, ok = result.ok, "Verified");
            json_response(
                StatusCode::OK,
                &VerifyResponse {
                    ok: result.ok,
                    sender_checksum: result.sender_checksum,
                    receiver_checksum: result.receiver_checksum,
                    sent_data: Some(sent_data),
                    key: Some(key),
                    received_data: Some(received_data),
                    message: Some(
                        if result.ok {
                            MESSAGE_NO_ERROR
                        } else {
                            MESSAGE_CORRUPTED
                        }
                        .to_string(),
                    ),
                },
            )
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Number theory helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Handler for `GET /api/isPrime?value=`.
pub async fn is_prime_handler(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    let params = Params::from_query(query);
    let Some(value) = params.int("value") else {
        return error_response(StatusCode::BAD_REQUEST, MESSAGE_MISSING_VALUE);
    };

    json_response(
        StatusCode::OK,
        &IsPrimeResponse {
            ok: true,
            value,
            is_prime: is_prime(value),
        },
    )
}

/// Handler for `GET /api/explain?data=&key=` - floor quotient and remainder.
pub async fn explain_handler(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    let params = Params::from_query(query);
    let (Some(data), Some(key)) = (params.int("data"), params.key()) else {
        return error_response(StatusCode::BAD_REQUEST, MESSAGE_MISSING_EXPLAIN);
    };

    match floor_divide(data, key) {
        Ok((quotient, remainder)) => json_response(
            StatusCode::OK,
            &ExplainResponse {
                ok: true,
                data,
                key,
                quotient,
                remainder,
            },
        ),
        Err(e @ NumericError::ZeroModulus) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// Fallback for unsupported methods on a known path.
pub async fn method_not_allowed_handler() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, MESSAGE_METHOD_NOT_ALLOWED)
}
