//! Decimal helpers for G-code parameter values
//!
//! Values are kept as [`Decimal`] end to end so that sweeps such as
//! `0.00, 0.02, 0.04, ...` compare exactly against their bound.

use latower_core::GcodeError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest number of fractional digits a [`Decimal`] can hold
pub const MAX_PRECISION: u32 = 28;

/// Round to the nearest value with `places` fractional digits
///
/// Midpoints round away from zero, so `0.125` becomes `0.13`.
pub fn round_nearest(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(
        places.min(MAX_PRECISION),
        RoundingStrategy::MidpointAwayFromZero,
    );
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Format a value with exactly `places` fractional digits
///
/// ```
/// use latower_gcode::format_fixed;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_fixed(Decimal::new(114, 2), 5), "1.14000");
/// assert_eq!(format_fixed(Decimal::new(2, 1), 0), "0");
/// ```
pub fn format_fixed(value: Decimal, places: u32) -> String {
    let rounded = round_nearest(value, places);
    format!("{:.*}", places.min(MAX_PRECISION) as usize, rounded)
}

/// Parse a parameter value as a decimal number
///
/// The line number is left at 0; callers attach it with
/// [`GcodeError::at_line`].
pub fn parse_decimal(param: char, text: &str) -> Result<Decimal, GcodeError> {
    let malformed = || GcodeError::MalformedNumber {
        line_number: 0,
        param,
        value: text.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(malformed());
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    // slicers write `.5` and `-.5`
    let normalized = match unsigned.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        None if unsigned.starts_with('.') => format!("0{unsigned}"),
        _ => unsigned.to_string(),
    };
    Decimal::from_str(&normalized).map_err(|_| malformed())
}
