//! Parsing of human-formatted price strings.
//!
//! Retail pages render prices with currency symbols, thousands separators and
//! either `.` or `,` as the decimal mark. This module turns such text into a
//! [`Decimal`].

use std::str::FromStr;

use rust_decimal::Decimal;

/// Characters that may appear between the digit groups of one number.
const GROUP_SEPARATORS: [char; 4] = [' ', '\u{a0}', '\u{202f}', '\''];

/// Parse the first price found in `text`.
///
/// Returns `None` when `text` contains no digits or the amount is zero; a
/// page showing `0,00` has no usable price.
///
/// When both `.` and `,` appear, the one that occurs last is the decimal mark.
/// When only one of them appears, it is a decimal mark unless every occurrence
/// is followed by exactly three digits (`"1,299"` is one thousand two hundred
/// ninety-nine).
///
/// # Examples
///
/// ```rust
/// use pricewatch_core::utils::parse_price_text;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_price_text("$1,299.99"), Some(Decimal::new(129_999, 2)));
/// assert_eq!(parse_price_text("1.299,99 €"), Some(Decimal::new(129_999, 2)));
/// assert_eq!(parse_price_text("9,99"), Some(Decimal::new(999, 2)));
/// assert_eq!(parse_price_text("sold out"), None);
/// ```
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let raw = first_number(text)?;
    let normalized = normalize(&raw);
    Decimal::from_str(&normalized)
        .ok()
        .filter(|price| !price.is_zero())
}

/// Extract the first run of digits, marks and group separators.
fn first_number(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let chars: Vec<char> = text[start..].chars().collect();

    let mut out = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let next_is_digit = chars.get(i + 1).is_some_and(char::is_ascii_digit);
        if c.is_ascii_digit() {
            out.push(c);
        } else if (c == '.' || c == ',') && next_is_digit {
            out.push(c);
        } else if GROUP_SEPARATORS.contains(&c) && next_is_digit {
            // Group separator only when the group that follows is three digits
            let group_len = chars[i + 1..]
                .iter()
                .take_while(|ch| ch.is_ascii_digit())
                .count();
            if group_len != 3 {
                break;
            }
        } else {
            break;
        }
    }
    Some(out)
}

/// Rewrite to a plain `1234.56` form.
fn normalize(raw: &str) -> String {
    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');

    let decimal_mark = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
        (Some(_), None) => single_mark_is_decimal(raw, '.').then_some('.'),
        (None, Some(_)) => single_mark_is_decimal(raw, ',').then_some(','),
        (None, None) => None,
    };

    let mut out = String::with_capacity(raw.len());
    let mark_pos = decimal_mark.and_then(|m| raw.rfind(m));
    for (i, c) in raw.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == mark_pos {
            out.push('.');
        }
    }
    out
}

fn single_mark_is_decimal(raw: &str, mark: char) -> bool {
    let groups: Vec<&str> = raw.split(mark).collect();
    if groups.len() > 2 {
        return false;
    }
    groups.last().is_none_or(|tail| tail.len() != 3)
}
