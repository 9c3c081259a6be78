//! Numeric utilities for the modulo checksum scheme.
//!
//! - [`checksum`] and [`floor_divide`]: floor-mod arithmetic against `|key|`
//! - [`parse_strict_integer`]: input validation for data/key/delta fields
//! - [`mod_explain`]: the "because value = q×m + r" derivation shown next to a checksum
//! - [`binary`]: exact, sign-preserving binary ↔ decimal conversion on `BigInt`
//!
//! Everything here is pure and synchronous.

pub mod binary;
mod modulo;
mod parse;

pub use binary::{
    binary_to_integer, explain_binary_to_decimal, explain_decimal_to_binary, integer_to_binary,
    normalize_binary, parse_decimal_integer, EXPLAIN_MAX_BITS,
};
pub use modulo::{checksum, floor_divide, is_prime, mod_explain, EXPLAIN_UNAVAILABLE};
pub use num_bigint::BigInt;
pub use parse::parse_strict_integer;

/// Errors from checksum arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    /// A zero key has no meaningful modulus.
    #[error("Key/modulus must be non-zero")]
    ZeroModulus,
}
