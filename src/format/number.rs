use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

/// Non-breaking space placed between an amount and its currency symbol
pub const NBSP: char = '\u{a0}';

/// Default currency symbol
pub const EURO: &str = "€";

/// Fractional digits shown before an amount is cut and marked with "..."
const MAX_FRACTION_DIGITS: usize = 4;

/// Parse a locale decimal string ("15,25" or "15.25") into a Decimal.
///
/// Parsing is lenient: the longest leading numeric prefix is used, and
/// anything without one (empty input, garbage) yields zero.
pub fn parse_decimal(input: &str) -> Decimal {
    let normalized = input.trim().replace(',', ".");
    let parsed = numeric_prefix(&normalized).and_then(|p| Decimal::from_str(&p).ok());

    match parsed {
        Some(value) => value,
        None => {
            if !normalized.is_empty() {
                debug!(input, "unparsable amount, using 0");
            }
            Decimal::ZERO
        }
    }
}

/// Same as `parse_decimal`, a missing field counts as zero
pub fn parse_optional_decimal(input: Option<&str>) -> Decimal {
    input.map_or(Decimal::ZERO, parse_decimal)
}

fn numeric_prefix(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    match chars.peek() {
        Some('-') => {
            out.push('-');
            chars.next();
        }
        Some('+') => {
            chars.next();
        }
        _ => {}
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    for ch in chars {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                out.push(ch);
            }
            '.' if !seen_dot => {
                seen_dot = true;
                out.push(ch);
            }
            _ => break,
        }
    }

    if !seen_digit {
        return None;
    }
    if out.ends_with('.') {
        out.pop();
    }
    if let Some(rest) = out.strip_prefix("-.") {
        out = format!("-0.{rest}");
    } else if out.starts_with('.') {
        out.insert(0, '0');
    }
    Some(out)
}

/// Returns false when the text already ends with a euro sign (no digits after
/// it), meaning it was rendered before and must not be formatted again.
pub fn is_formattable_currency(text: &str) -> bool {
    for marker in [EURO, "&euro;"] {
        if let Some(pos) = text.rfind(marker) {
            let tail = &text[pos + marker.len()..];
            if !tail.chars().any(|c| c.is_ascii_digit()) {
                return false;
            }
        }
    }
    true
}

/// Normalize fractional digits to at least two characters.
///
/// Without `pad`, trailing zeros past the first two digits are dropped
/// ("1500" -> "15", "1550" -> "155"). Short input is right-padded with '0'.
pub fn trailing_zeros(digits: &str, pad: bool) -> String {
    let mut out = if pad {
        digits.to_string()
    } else {
        digits.trim_end_matches('0').to_string()
    };
    while out.len() < 2 {
        out.push('0');
    }
    out
}

/// Cut a value to cents, toward zero (1.256 -> 1.25, -1.256 -> -1.25)
pub fn truncate_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Render a value with ',' as decimal separator.
///
/// With `round_to_cents` the value is cut to exactly two decimals. Otherwise up
/// to four fractional digits are shown and "..." marks any precision beyond.
pub fn format_price(value: Decimal, round_to_cents: bool) -> String {
    let value = if round_to_cents {
        truncate_cents(value).normalize()
    } else {
        value.normalize()
    };

    let negative = value.is_sign_negative() && !value.is_zero();
    let text = value.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let (fraction, cut) = if fraction.len() > MAX_FRACTION_DIGITS {
        (&fraction[..MAX_FRACTION_DIGITS], true)
    } else {
        (fraction, false)
    };

    let mut out = String::with_capacity(integer.len() + MAX_FRACTION_DIGITS + 5);
    if negative {
        out.push('-');
    }
    out.push_str(integer);
    out.push(',');
    out.push_str(&trailing_zeros(fraction, false));
    if cut {
        out.push_str("...");
    }
    out
}

/// Format a price followed by a non-breaking space and `symbol`
pub fn format_currency(value: Decimal, round_to_cents: bool, symbol: &str) -> String {
    format!("{}{}{}", format_price(value, round_to_cents), NBSP, symbol)
}

/// Amount with two decimals and euro sign: 125 -> "125,00 €"
pub fn format_amount(value: Decimal) -> String {
    format_currency(value, true, EURO)
}

/// Line total keeping up to four decimals: 125.3125 -> "125,3125 €"
pub fn format_line_amount(value: Decimal) -> String {
    format_currency(value, false, EURO)
}

/// Basis points as a French percentage label: 1960 -> "19,6 %"
pub fn format_percent(basis_points: u32) -> String {
    let percent = Decimal::new(i64::from(basis_points), 2).normalize();
    format!("{}{}%", percent.to_string().replace('.', ","), NBSP)
}
