//! Numeric token recognition and decimal parsing.
//!
//! The profiler, the normalizer, and the audit all classify cells with the
//! same recognizers so a column's kind and its cleaned values never disagree
//! about what counts as a number. All arithmetic goes through
//! [`rust_decimal::Decimal`] to keep sums exact.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

pub const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

static CURRENCY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    let symbols: String = CURRENCY_SYMBOLS.iter().collect();
    Regex::new(&format!(
        r"^([+-])?\s*([{symbols}])?\s*([+-])?(\d{{1,3}}(?:,\d{{3}})+|\d+)?(?:\.(\d+))?$"
    ))
    .expect("currency pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyAmount {
    pub amount: Decimal,
    /// A currency symbol or a comma thousands separator was present.
    pub has_marker: bool,
}

struct Numeral<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

impl Numeral<'_> {
    fn to_decimal(&self) -> Option<Decimal> {
        let integer = if self.integer.is_empty() {
            "0"
        } else {
            self.integer
        };
        let mut literal = String::with_capacity(integer.len() + self.fraction.len() + 2);
        if self.negative {
            literal.push('-');
        }
        literal.push_str(integer);
        if !self.fraction.is_empty() {
            literal.push('.');
            literal.push_str(self.fraction);
        }
        Decimal::from_str(&literal).ok()
    }
}

/// Splits `[+-]digits[.digits]`; at least one digit is required.
fn split_plain_numeral(value: &str) -> Option<Numeral<'_>> {
    let (negative, body) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let (integer, fraction) = match body.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (body, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !all_digits(integer) || !all_digits(fraction) {
        return None;
    }
    Some(Numeral {
        negative,
        integer,
        fraction,
    })
}

/// A plain integer or decimal with no currency, grouping, or percent markers.
pub fn is_plain_numeric(value: &str) -> bool {
    split_plain_numeral(value.trim()).is_some()
}

pub fn parse_plain_decimal(value: &str) -> Option<Decimal> {
    split_plain_numeral(value.trim())?.to_decimal()
}

/// Parses amounts such as `$1,234.50`, `-$12`, `$-12`, `(1,000.00)` or `250`.
///
/// Accounting parentheses denote a negative amount.
pub fn parse_currency(value: &str) -> Option<CurrencyAmount> {
    let mut body = value.trim();
    let mut parenthesized = false;
    if body.len() > 2 && body.starts_with('(') && body.ends_with(')') {
        parenthesized = true;
        body = body[1..body.len() - 1].trim();
    }
    let captures = CURRENCY_AMOUNT.captures(body)?;
    let leading_sign = captures.get(1).map(|m| m.as_str());
    let inner_sign = captures.get(3).map(|m| m.as_str());
    if leading_sign.is_some() && inner_sign.is_some() {
        return None;
    }
    let sign = leading_sign.or(inner_sign);
    if parenthesized && sign.is_some() {
        return None;
    }
    let grouped = captures.get(4).map(|m| m.as_str()).unwrap_or("");
    let fraction = captures.get(5).map(|m| m.as_str()).unwrap_or("");
    if grouped.is_empty() && fraction.is_empty() {
        return None;
    }
    let integer = grouped.replace(',', "");
    let numeral = Numeral {
        negative: parenthesized || sign == Some("-"),
        integer: &integer,
        fraction,
    };
    Some(CurrencyAmount {
        amount: numeral.to_decimal()?,
        has_marker: captures.get(2).is_some() || grouped.contains(','),
    })
}

/// True when the value is a numeral followed by a trailing `%`.
pub fn has_percent_marker(value: &str) -> bool {
    value
        .trim()
        .strip_suffix('%')
        .is_some_and(|body| split_plain_numeral(&body.trim().replace(',', "")).is_some())
}

/// Parses a percentage into its fraction: `25%` is `0.25`.
///
/// The trailing `%` is required. A bare numeral is already a plain value and
/// is left to [`parse_plain_decimal`].
pub fn parse_percentage(value: &str) -> Option<Decimal> {
    let body = value.trim().strip_suffix('%')?.trim();
    let numeral = body.replace(',', "");
    split_plain_numeral(&numeral)?
        .to_decimal()?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Best-effort numeric reading used as the audit's view of an original cell.
pub fn parse_loose_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.ends_with('%') {
        return parse_percentage(trimmed);
    }
    parse_currency(trimmed).map(|parsed| parsed.amount)
}

/// Renders a fraction with at least one fractional digit (`1` becomes `1.0`).
pub fn render_fraction(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        format!("{normalized}.0")
    } else {
        normalized.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn plain_numeric_rejects_markers() {
        assert!(is_plain_numeric("42"));
        assert!(is_plain_numeric("-3.5"));
        assert!(is_plain_numeric("+.5"));
        assert!(is_plain_numeric("20240115"));
        assert!(!is_plain_numeric("$42"));
        assert!(!is_plain_numeric("1,000"));
        assert!(!is_plain_numeric("25%"));
        assert!(!is_plain_numeric("1.2.3"));
        assert!(!is_plain_numeric("."));
        assert!(!is_plain_numeric("-"));
        assert!(!is_plain_numeric("1e5"));
    }

    #[test]
    fn currency_parses_symbols_grouping_and_signs() {
        let parsed = parse_currency("$1,234.50").unwrap();
        assert_eq!(parsed.amount, dec("1234.50"));
        assert_eq!(parsed.amount.to_string(), "1234.50");
        assert!(parsed.has_marker);

        assert_eq!(parse_currency("-$12").unwrap().amount, dec("-12"));
        assert_eq!(parse_currency("$-12.5").unwrap().amount, dec("-12.5"));
        assert_eq!(parse_currency("(1,000.00)").unwrap().amount, dec("-1000.00"));
        assert_eq!(parse_currency("€ 99").unwrap().amount, dec("99"));

        let plain = parse_currency("250").unwrap();
        assert_eq!(plain.amount, dec("250"));
        assert!(!plain.has_marker);
    }

    #[test]
    fn currency_rejects_malformed_amounts() {
        assert!(parse_currency("$").is_none());
        assert!(parse_currency("12,34").is_none());
        assert!(parse_currency("--5").is_none());
        assert!(parse_currency("-$-5").is_none());
        assert!(parse_currency("(-5)").is_none());
        assert!(parse_currency("abc").is_none());
        assert!(parse_currency("5%").is_none());
    }

    #[test]
    fn percentage_divides_by_one_hundred() {
        assert_eq!(parse_percentage("25%"), Some(dec("0.25")));
        assert_eq!(parse_percentage("100%"), Some(dec("1")));
        assert_eq!(parse_percentage("12.5 %"), Some(dec("0.125")));
        assert_eq!(parse_percentage("-3%"), Some(dec("-0.03")));
        assert_eq!(parse_percentage("1,200%"), Some(dec("12")));
        assert_eq!(parse_percentage("n/a%"), None);
        assert_eq!(parse_percentage("25"), None);
        assert!(has_percent_marker("25%"));
        assert!(!has_percent_marker("25"));
        assert!(!has_percent_marker("%"));
    }

    #[test]
    fn render_fraction_keeps_one_decimal_place() {
        assert_eq!(render_fraction(dec("0.25")), "0.25");
        assert_eq!(render_fraction(dec("1.00")), "1.0");
        assert_eq!(render_fraction(dec("0.1250")), "0.125");
    }

    #[test]
    fn loose_decimal_understands_every_numeric_encoding() {
        assert_eq!(parse_loose_decimal("$2,500.50"), Some(dec("2500.50")));
        assert_eq!(parse_loose_decimal("40%"), Some(dec("0.4")));
        assert_eq!(parse_loose_decimal(" 7 "), Some(dec("7")));
        assert_eq!(parse_loose_decimal("seven"), None);
    }
}
