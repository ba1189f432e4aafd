use rust_decimal::Decimal;
use std::str::FromStr;

/// Characters stripped before a numeric string is interpreted.
const NOISE: &[char] = &['€', '$', '£', '\u{a0}', '\u{202f}', ' ', '\t'];

/// Parse a receipt amount written in either decimal locale.
///
/// Separator rule:
/// - both `,` and `.` present: the last one is the decimal point, the other groups thousands
/// - one kind present exactly once: it is the decimal point (`21,860` is 21.860)
/// - one kind present more than once: it only groups thousands
///
/// Returns `None` for anything that is not a plain signed number once currency
/// symbols, an `EUR` code in any case, and whitespace are removed.
pub fn parse_locale_decimal(input: &str) -> Option<Decimal> {
    let trimmed = strip_currency_code(input.trim());
    let cleaned: String = trimmed.chars().filter(|c| !NOISE.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }

    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        || !digits.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }

    let decimal_sep = decimal_separator(digits);
    let canonical: String = digits
        .chars()
        .filter_map(|c| match c {
            ',' | '.' if Some(c) == decimal_sep => Some('.'),
            ',' | '.' => None,
            d => Some(d),
        })
        .collect();

    Decimal::from_str(&format!("{sign}{canonical}")).ok()
}

/// Drop a leading or trailing `EUR`, in any letter case.
fn strip_currency_code(s: &str) -> &str {
    const CODE: &str = "EUR";
    let n = CODE.len();
    let split = s.len().saturating_sub(n);
    match (s.get(..n), s.get(split..)) {
        (_, Some(tail)) if s.len() >= n && tail.eq_ignore_ascii_case(CODE) => &s[..split],
        (Some(head), _) if head.eq_ignore_ascii_case(CODE) => &s[n..],
        _ => s,
    }
}

fn decimal_separator(digits: &str) -> Option<char> {
    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');
    match (last_comma, last_dot) {
        (Some(c), Some(d)) => Some(if c > d { ',' } else { '.' }),
        (Some(_), None) => single_occurrence(digits, ','),
        (None, Some(_)) => single_occurrence(digits, '.'),
        (None, None) => None,
    }
}

fn single_occurrence(digits: &str, sep: char) -> Option<char> {
    (digits.matches(sep).count() == 1).then_some(sep)
}

/// Convert a JSON number into a `Decimal` without passing through a lossy float
/// when the textual form is exact.
pub fn decimal_from_json_number(n: &serde_json::Number) -> Option<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn plain_dot_decimal() {
        assert_eq!(parse_locale_decimal("12.34"), Some(dec("12.34")));
    }

    #[test]
    fn comma_decimal_matches_dot_decimal_by_value() {
        assert_eq!(parse_locale_decimal("12,50"), parse_locale_decimal("12.50"));
        assert_eq!(parse_locale_decimal("12,50"), Some(dec("12.5")));
    }

    #[test]
    fn three_trailing_digits_after_single_comma_is_decimal() {
        assert_eq!(parse_locale_decimal("21,860"), Some(dec("21.86")));
    }

    #[test]
    fn mixed_separators_last_one_wins() {
        assert_eq!(parse_locale_decimal("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_locale_decimal("1,234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn repeated_separator_is_grouping() {
        assert_eq!(parse_locale_decimal("1.234.567"), Some(dec("1234567")));
        assert_eq!(parse_locale_decimal("1,234,567"), Some(dec("1234567")));
    }

    #[test]
    fn currency_noise_is_stripped() {
        assert_eq!(parse_locale_decimal("45,30€"), Some(dec("45.30")));
        assert_eq!(parse_locale_decimal("€ 45.30"), Some(dec("45.30")));
        assert_eq!(parse_locale_decimal("45,30 EUR"), Some(dec("45.30")));
    }

    #[test]
    fn currency_code_in_any_case() {
        assert_eq!(parse_locale_decimal("45,30 eur"), Some(dec("45.30")));
        assert_eq!(parse_locale_decimal("Eur 12.5"), Some(dec("12.5")));
        assert_eq!(parse_locale_decimal("eur"), None);
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(parse_locale_decimal("-3,10"), Some(dec("-3.10")));
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(parse_locale_decimal(""), None);
        assert_eq!(parse_locale_decimal("n/a"), None);
        assert_eq!(parse_locale_decimal("12a"), None);
        assert_eq!(parse_locale_decimal(",."), None);
        assert_eq!(parse_locale_decimal("€"), None);
    }

    #[test]
    fn json_number_keeps_exact_value() {
        let n: serde_json::Number = serde_json::from_str("1.499").unwrap();
        assert_eq!(decimal_from_json_number(&n), Some(dec("1.499")));
        let n: serde_json::Number = serde_json::from_str("30").unwrap();
        assert_eq!(decimal_from_json_number(&n), Some(dec("30")));
    }
}
