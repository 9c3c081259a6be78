//! Binary ↔ decimal conversion on arbitrary-precision integers.
//!
//! Signs are carried as a leading `-` on the magnitude rather than as a
//! two's-complement bit pattern, so `-6` is `"-110"` at any width.

use num_bigint::BigInt;
use num_traits::One;

/// Longest bit string that still gets a term-by-term breakdown.
///
/// Longer inputs convert exactly but only show the final value.
pub const EXPLAIN_MAX_BITS: usize = 32;

/// Validate and canonicalise a binary string.
///
/// Accepts an optional leading `-` followed by one or more `0`/`1` digits,
/// ignoring surrounding whitespace. Redundant leading zeros are removed
/// (keeping at least one digit). Negative zero canonicalises to `"0"`.
pub fn normalize_binary(text: &str) -> Option<String> {
    let t = text.trim();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }

    let trimmed = digits.trim_start_matches('0');
    let bits = if trimmed.is_empty() { "0" } else { trimmed };

    if negative && bits != "0" {
        Some(format!("-{bits}"))
    } else {
        Some(bits.to_string())
    }
}

/// Parse a binary string into an exact integer.
pub fn binary_to_integer(text: &str) -> Option<BigInt> {
    let norm = normalize_binary(text)?;
    let (negative, bits) = split_sign(&norm);
    let magnitude = BigInt::parse_bytes(bits.as_bytes(), 2)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Render an integer as a signed binary string.
pub fn integer_to_binary(n: &BigInt) -> String {
    n.to_str_radix(2)
}

/// Parse a signed decimal string (`-?[0-9]+`) into an exact integer.
pub fn parse_decimal_integer(text: &str) -> Option<BigInt> {
    let t = text.trim();
    let digits = t.strip_prefix('-').unwrap_or(t);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigInt::parse_bytes(t.as_bytes(), 10)
}

/// Explain a binary string as a sum of powers of two.
///
/// `"101"` renders as `"101₂ = 4 + 1 = 5₁₀"`; the sign is applied to the
/// final value only (`"-110₂ = 4 + 2 = -6₁₀"`). Strings longer than
/// [`EXPLAIN_MAX_BITS`] skip the breakdown.
pub fn explain_binary_to_decimal(text: &str) -> Option<String> {
    let norm = normalize_binary(text)?;
    let value = binary_to_integer(&norm)?;
    let (_, bits) = split_sign(&norm);

    if bits.len() > EXPLAIN_MAX_BITS {
        return Some(format!(
            "{norm}₂ → (too many bits to show steps) → {value}₁₀"
        ));
    }

    let len = bits.len();
    let terms: Vec<String> = bits
        .bytes()
        .enumerate()
        .filter(|&(_, bit)| bit == b'1')
        .map(|(i, _)| (BigInt::one() << (len - 1 - i)).to_string())
        .collect();
    let terms = if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    };

    Some(format!("{norm}₂ = {terms} = {value}₁₀"))
}

/// Explain a decimal string as its binary form: `"6₁₀ → 110₂"`.
pub fn explain_decimal_to_binary(text: &str) -> Option<String> {
    let n = parse_decimal_integer(text)?;
    Some(format!("{n}₁₀ → {}₂", integer_to_binary(&n)))
}

fn split_sign(norm: &str) -> (bool, &str) {
    match norm.strip_prefix('-') {
        Some(bits) => (true, bits),
        None => (false, norm),
    }
}
