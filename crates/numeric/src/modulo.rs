//! Floor-mod checksum arithmetic.
//!
//! The modulus is always `|key|`, so the checksum lies in `0..|key|` for any
//! sign of data or key. Intermediate values are widened to `i128` so keys such
//! as `i64::MIN` cannot overflow.

use crate::NumericError;

/// Placeholder rendered when a modulo derivation cannot be shown.
pub const EXPLAIN_UNAVAILABLE: &str = "-";

/// Compute `data mod |key|` with floor semantics.
pub fn checksum(data: i64, key: i64) -> Result<i64, NumericError> {
    floor_divide(data, key).map(|(_, remainder)| remainder)
}

/// Divide `data` by `|key|`, returning `(quotient, remainder)` such that
/// `data = quotient × |key| + remainder` and `0 <= remainder < |key|`.
pub fn floor_divide(data: i64, key: i64) -> Result<(i64, i64), NumericError> {
    let modulus = (key as i128).abs();
    if modulus == 0 {
        return Err(NumericError::ZeroModulus);
    }
    let data = data as i128;
    let quotient = data.div_euclid(modulus);
    let remainder = data.rem_euclid(modulus);
    // |quotient| <= |data| and remainder < |key|, both fit back into i64.
    Ok((quotient as i64, remainder as i64))
}

/// Render the derivation of a remainder that was computed elsewhere.
///
/// Output looks like `"13 mod 5 = 3  (because 13 = 2×5 + 3)"`.
///
/// Returns [`EXPLAIN_UNAVAILABLE`] when the key is zero or when `remainder`
/// is not the floor-mod remainder of `value` by `|key|`.
pub fn mod_explain(value: i64, key: i64, remainder: i64) -> String {
    let Ok((quotient, expected)) = floor_divide(value, key) else {
        return EXPLAIN_UNAVAILABLE.to_string();
    };
    if remainder != expected {
        return EXPLAIN_UNAVAILABLE.to_string();
    }
    let modulus = (key as i128).abs();

    format!(
        "{value} mod {modulus} = {remainder}  (because {value} = {quotient}×{modulus} + {remainder})"
    )
}

/// Trial-division primality test.
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let n = n as i128;
    let mut i: i128 = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
