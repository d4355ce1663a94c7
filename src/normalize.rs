//! Value normalization for descriptor and header tokens.
//!
//! A token is first cleaned (trimmed, parentheses removed), then classified:
//! anything that parses as a base-16 integer counts as numeric and is
//! canonicalized to an integer, everything else is compared as text.
//!
//! The classification deliberately uses base-16 parsing even for tokens
//! without a `0x` prefix, so `42` is numeric while `9UL` and `ENABLED` are
//! text. A numeric token that is neither a hex nor an octal literal is then
//! parsed as decimal, which fails for strings like `1A`; that failure is
//! surfaced as a [`NormalizeError`] rather than coerced.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// A canonical value used for equality comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    /// A numeric literal converted to base 10.
    Integer(i128),
    /// A non-numeric token, trimmed and stripped of parentheses.
    Text(String),
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A numeric-looking token that could not be converted to an integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{token}` looks numeric but cannot be converted to an integer")]
pub struct NormalizeError {
    /// The cleaned token that failed conversion.
    pub token: String,
}

fn hex_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]+").expect("valid hex literal pattern"))
}

fn octal_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0[0-7]+").expect("valid octal literal pattern"))
}

/// Trims surrounding whitespace, then removes every `(` and `)`.
#[must_use]
pub fn clean_value(raw: &str) -> String {
    raw.trim().replace(['(', ')'], "")
}

/// Returns `true` when `token` parses as a base-16 integer.
///
/// Accepts surrounding whitespace, an optional sign, and an optional
/// `0x`/`0X` prefix. Plain decimal digit strings qualify; anything with a
/// non-hex character does not.
///
/// Digit separators are not accepted, so `1_000` and `0x_1F` are text.
#[must_use]
pub fn is_numeric(token: &str) -> bool {
    let body = token.trim();
    let body = body.strip_prefix(['+', '-']).unwrap_or(body);
    let digits = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Converts a numeric token to its base-10 value.
///
/// A leading hex literal is read as base 16, a leading octal literal
/// (`0` followed by octal digits) as base 8; only the matched prefix is
/// converted. Anything else is parsed as a decimal integer.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the decimal fallback does not parse or the
/// value overflows.
pub fn to_decimal(token: &str) -> Result<i128, NormalizeError> {
    let fail = || NormalizeError { token: token.to_string() };

    if let Some(m) = hex_literal().find(token) {
        return i128::from_str_radix(&m.as_str()[2..], 16).map_err(|_| fail());
    }
    if let Some(m) = octal_literal().find(token) {
        return i128::from_str_radix(&m.as_str()[1..], 8).map_err(|_| fail());
    }
    token.trim().parse::<i128>().map_err(|_| fail())
}

/// Classifies and canonicalizes a token that has already been cleaned.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the token classifies as numeric but cannot
/// be converted.
pub fn normalize_cleaned(token: &str) -> Result<NormalizedValue, NormalizeError> {
    if is_numeric(token) {
        to_decimal(token).map(NormalizedValue::Integer)
    } else {
        Ok(NormalizedValue::Text(token.to_string()))
    }
}

/// Cleans, classifies, and canonicalizes a raw token.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the token classifies as numeric but cannot
/// be converted.
pub fn normalize(raw: &str) -> Result<NormalizedValue, NormalizeError> {
    normalize_cleaned(&clean_value(raw))
}
