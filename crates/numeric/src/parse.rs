//! Strict integer parsing for user-entered fields.

/// Parse user text as an exact integer.
///
/// Surrounding whitespace is ignored. An empty field or a lone `-` (a value
/// still being typed) is `None`, as is anything with a non-zero fractional
/// part or a magnitude outside `i64`. A fractional part made only of zeros
/// (`"12.0"`) still denotes an exact integer and is accepted.
pub fn parse_strict_integer(text: &str) -> Option<i64> {
    let t = text.trim();
    if t.is_empty() || t == "-" {
        return None;
    }

    let (whole, fraction) = match t.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (t, None),
    };

    if let Some(fraction) = fraction {
        if !fraction.bytes().all(|b| b == b'0') {
            return None;
        }
    }

    let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    whole.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_integers() {
        assert_eq!(parse_strict_integer("42"), Some(42));
        assert_eq!(parse_strict_integer("  -7 "), Some(-7));
        assert_eq!(parse_strict_integer("+5"), Some(5));
        assert_eq!(parse_strict_integer("007"), Some(7));
    }

    #[test]
    fn test_rejects_incomplete_input() {
        assert_eq!(parse_strict_integer(""), None);
        assert_eq!(parse_strict_integer("   "), None);
        assert_eq!(parse_strict_integer("-"), None);
        assert_eq!(parse_strict_integer("+"), None);
    }

    #[test]
    fn test_rejects_fractions_and_garbage() {
        assert_eq!(parse_strict_integer("1.5"), None);
        assert_eq!(parse_strict_integer("abc"), None);
        assert_eq!(parse_strict_integer("1 2"), None);
        assert_eq!(parse_strict_integer("--1"), None);
        assert_eq!(parse_strict_integer(".0"), None);
    }

    #[test]
    fn test_zero_fraction_is_exact() {
        assert_eq!(parse_strict_integer("12.0"), Some(12));
        assert_eq!(parse_strict_integer("-3.000"), Some(-3));
        assert_eq!(parse_strict_integer("4."), Some(4));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(parse_strict_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_strict_integer("9223372036854775808"), None);
    }
}
