//! Single-parameter line rewriting

use latower_core::GcodeError;
use rust_decimal::Decimal;

use crate::number::format_fixed;
use crate::parser::parse_words;

/// Return a copy of `line` with the value of `param` replaced
///
/// The new value is written with exactly `precision` fractional digits.
/// Every other byte of the line, including spacing and trailing comments,
/// is preserved. When the parameter occurs more than once the last
/// occurrence is rewritten, matching [`crate::word_map`].
///
/// ```
/// use latower_gcode::replace_param;
/// use rust_decimal::Decimal;
///
/// let line = replace_param("G1 X10 E1.0 ; wall", 'E', Decimal::new(115, 1), 3).unwrap();
/// assert_eq!(line, "G1 X10 E11.500 ; wall");
/// ```
pub fn replace_param(
    line: &str,
    param: char,
    value: Decimal,
    precision: u32,
) -> Result<String, GcodeError> {
    let param = param.to_ascii_uppercase();
    let word = parse_words(line)
        .into_iter()
        .rev()
        .find(|word| word.letter == param)
        .ok_or_else(|| GcodeError::MissingParameter {
            param,
            line: line.to_string(),
        })?;

    let formatted = format_fixed(value, precision);
    let mut rewritten = String::with_capacity(line.len() + formatted.len());
    rewritten.push_str(&line[..word.span.start]);
    rewritten.push_str(&formatted);
    rewritten.push_str(&line[word.span.end..]);
    Ok(rewritten)
}
