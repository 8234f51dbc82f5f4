//! Fixed-point prices, scaled by 1000.

use std::fmt::Write as _;

use crate::config::FractionMode;

/// Fixed-point scale: one unit of currency is `SCALE`.
pub const SCALE: i64 = 1000;

/// Error converting price text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("empty price")]
    Empty,
    #[error("invalid price digits {text:?}")]
    Digits { text: String },
    #[error("price {text:?} overflows")]
    Overflow { text: String },
}

/// Convert price text such as `"23.45"` to fixed point (`23450`).
///
/// In [`FractionMode::Legacy`] the place value of the fraction starts at
/// `SCALE` and shrinks by ten per digit, so `"1.2345"` loses its fraction
/// entirely and converts to `1000`.
///
/// # Errors
///
/// Returns `PriceError` when either part is empty or not decimal digits,
/// or when the result does not fit in `i64`.
pub fn to_fixed(text: &str, mode: FractionMode) -> Result<i64, PriceError> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    let overflow = || PriceError::Overflow {
        text: text.to_string(),
    };

    let mut value = parse_digits(whole, text)?
        .checked_mul(SCALE)
        .ok_or_else(overflow)?;

    if let Some(fraction) = fraction {
        let fraction = match mode {
            FractionMode::Legacy => fraction,
            FractionMode::Truncate => fraction.get(..3).unwrap_or(fraction),
        };

        let mut place = SCALE;
        for _ in fraction.chars() {
            place /= 10;
        }

        let part = parse_digits(fraction, text)?
            .checked_mul(place)
            .ok_or_else(overflow)?;
        value = value.checked_add(part).ok_or_else(overflow)?;
    }

    Ok(value)
}

fn parse_digits(digits: &str, text: &str) -> Result<i64, PriceError> {
    if digits.is_empty() {
        return Err(PriceError::Empty);
    }
    // `i64::from_str` would also accept a leading sign.
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PriceError::Digits {
            text: text.to_string(),
        });
    }
    digits.parse::<i64>().map_err(|_| PriceError::Overflow {
        text: text.to_string(),
    })
}

/// Render a fixed-point price the way the report prints it: whole units,
/// and when there are thousandths, at least two fractional digits.
#[must_use]
pub fn format_fixed(value: i64) -> String {
    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    let abs = value.unsigned_abs();
    let scale = SCALE.unsigned_abs();
    let _ = write!(out, "{}", abs / scale);

    let frac = abs % scale;
    if frac != 0 {
        let digits = format!("{frac:03}");
        let trimmed = digits.trim_end_matches('0');
        let _ = write!(out, ".{trimmed:0<2}");
    }
    out
}
