//! Extrusion continuity tracking
//!
//! The tower template carries its own E numbering. To splice it onto the
//! raft without a retraction or blob, the assembler needs the raft's final
//! absolute E. That value is read off the pre-tower content as it streams
//! past and becomes the anchor the template is re-based against.
//!
//! Only `G1` moves count. `G0` travel moves are ignored even when they
//! carry an E word, and `G01` is not treated as `G1`.

use latower_core::GcodeError;
use latower_gcode::{is_comment_or_blank, is_linear_move, parse_decimal, parse_words};
use rust_decimal::Decimal;
use serde::Serialize;

/// Extrusion position of one line, if it is a `G1` move carrying E
///
/// When E appears more than once on the line the last one wins.
pub fn line_extrusion(line: &str) -> Result<Option<Decimal>, GcodeError> {
    if is_comment_or_blank(line) {
        return Ok(None);
    }
    let words = parse_words(line.trim());
    if !is_linear_move(&words) {
        return Ok(None);
    }
    let mut extrusion = None;
    for word in words.iter().filter(|word| word.letter == 'E') {
        extrusion = Some(parse_decimal('E', &word.value)?);
    }
    Ok(extrusion)
}

/// Last extrusion position found in a sequence of lines
///
/// Returns `None` when no line is a `G1` move with E. Line numbers in
/// errors are 1-based positions within `lines`.
pub fn last_extrusion<'a, I>(lines: I) -> Result<Option<Decimal>, GcodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut last = None;
    for (i, line) in lines.into_iter().enumerate() {
        if let Some(e) = line_extrusion(line).map_err(|err| err.at_line(i + 1))? {
            last = Some(e);
        }
    }
    Ok(last)
}

/// The E value the tower is re-based against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtrusionAnchor {
    /// Absolute E at the end of the pre-tower content
    pub value: Decimal,
    /// True when no extrusion was ever observed and `value` fell back to 0
    pub defaulted: bool,
}

/// Running scan of the content written before the tower
///
/// Owned by one generation run; nothing survives between runs.
#[derive(Debug, Clone, Default)]
pub struct ContinuityTracker {
    last_e: Option<Decimal>,
    lines_seen: usize,
}

impl ContinuityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one line; `line_number` is only used for error reporting
    pub fn observe_line(&mut self, line: &str, line_number: usize) -> Result<(), GcodeError> {
        self.lines_seen += 1;
        if let Some(e) = line_extrusion(line).map_err(|err| err.at_line(line_number))? {
            self.last_e = Some(e);
        }
        Ok(())
    }

    /// Observe a multi-line block such as a snippet
    pub fn observe_text(&mut self, text: &str) -> Result<(), GcodeError> {
        for (i, line) in text.lines().enumerate() {
            self.observe_line(line, i + 1)?;
        }
        Ok(())
    }

    /// Last extrusion observed so far
    pub fn last_extrusion(&self) -> Option<Decimal> {
        self.last_e
    }

    /// Number of lines observed
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Freeze the scan into the tower's anchor
    ///
    /// A raft with no recognizable `G1 ... E` line anchors at 0. That keeps
    /// the generator running but usually means the first tower layer will
    /// jump in E, so it is logged as a warning.
    pub fn into_anchor(self) -> ExtrusionAnchor {
        match self.last_e {
            Some(value) => ExtrusionAnchor {
                value,
                defaulted: false,
            },
            None => {
                tracing::warn!(
                    lines = self.lines_seen,
                    "no G1 extrusion found before the tower; anchoring E at 0"
                );
                ExtrusionAnchor {
                    value: Decimal::ZERO,
                    defaulted: true,
                }
            }
        }
    }
}
