//! Fractional-to-decimal odds conversion.

/// Convert fractional odds text ("5/2") to decimal odds text ("3.5").
///
/// Decimal odds are 1 + numerator/denominator, rounded at the third decimal
/// place and formatted without trailing zeros. Returns `None` for anything
/// that is not two numeric parts separated by a single `/`, or when the
/// denominator is zero; callers keep the original fractional text either way.
pub fn frac_to_decimal(text: &str) -> Option<String> {
    let mut parts = text.trim().split('/');
    let numerator: f64 = parts.next()?.parse().ok()?;
    let denominator: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || denominator == 0.0 {
        return None;
    }

    let decimal = ((1.0 + numerator / denominator) * 1000.0).round() / 1000.0;
    Some(decimal.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_common_prices() {
        assert_eq!(frac_to_decimal("5/2"), Some("3.5".to_string()));
        assert_eq!(frac_to_decimal("1/2"), Some("1.5".to_string()));
        assert_eq!(frac_to_decimal("6/4"), Some("2.5".to_string()));
        assert_eq!(frac_to_decimal("1/1"), Some("2".to_string()));
    }

    #[test]
    fn rounds_at_third_decimal() {
        assert_eq!(frac_to_decimal("1/3"), Some("1.333".to_string()));
        assert_eq!(frac_to_decimal("10/11"), Some("1.909".to_string()));
        assert_eq!(frac_to_decimal("2/3"), Some("1.667".to_string()));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(frac_to_decimal(" 5/2 "), Some("3.5".to_string()));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(frac_to_decimal(""), None);
        assert_eq!(frac_to_decimal("52"), None);
        assert_eq!(frac_to_decimal("5/2/1"), None);
        assert_eq!(frac_to_decimal("a/b"), None);
        assert_eq!(frac_to_decimal("evens"), None);
    }

    #[test]
    fn rejects_zero_denominator() {
        assert_eq!(frac_to_decimal("5/0"), None);
    }
}
