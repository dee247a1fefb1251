//! G-Code line tokenizer
//!
//! Splits one line into its address words (`G1`, `X27.966`, `E1.25`, ...)
//! while remembering where each value sits in the source line, so a
//! single parameter can later be rewritten without touching anything else.

use std::collections::HashMap;
use std::ops::Range;

/// One address word of a G-code line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Address letter, uppercased
    pub letter: char,
    /// Value text exactly as written (may be empty)
    pub value: String,
    /// Byte range of `value` within the source line
    pub span: Range<usize>,
}

impl Word {
    /// The word as a `(letter, value)` pair
    pub fn as_pair(&self) -> (char, &str) {
        (self.letter, self.value.as_str())
    }

    /// Whether this word is exactly `letter` + `value`, e.g. `G` + `1`
    ///
    /// The comparison is textual: `G01` is not `G1`.
    pub fn is(&self, letter: char, value: &str) -> bool {
        self.letter == letter.to_ascii_uppercase() && self.value == value
    }
}

/// True for lines that carry no command: blank lines and `;` comments
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(';')
}

/// Tokenize a line into its words, in the order they appear
///
/// Text after `;` and inside `( )` is ignored. A value runs from the
/// character after its letter up to the next whitespace, letter, or
/// comment, so `G1X10E.5` and `G1 X10 E.5` tokenize the same way.
/// Malformed values are kept verbatim; validating them is up to the
/// caller.
pub fn parse_words(line: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c == ';' {
            break;
        }
        if c == '(' {
            for (_, inner) in chars.by_ref() {
                if inner == ')' {
                    break;
                }
            }
            continue;
        }
        if !c.is_ascii_alphabetic() {
            continue;
        }

        let start = chars.peek().map(|&(i, _)| i).unwrap_or(line.len());
        let mut end = start;
        while let Some(&(i, next)) = chars.peek() {
            if next.is_whitespace() || next.is_ascii_alphabetic() || next == ';' || next == '(' {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        words.push(Word {
            letter: c.to_ascii_uppercase(),
            value: line[start..end].to_string(),
            span: start..end,
        });
    }

    words
}

/// Collapse words into a letter → value lookup
///
/// When a letter repeats, the last occurrence wins.
pub fn word_map(words: &[Word]) -> HashMap<char, &str> {
    words
        .iter()
        .map(|word| (word.letter, word.value.as_str()))
        .collect()
}

/// Whether the first word of the line is exactly `letter` + `value`
pub fn is_command(words: &[Word], letter: char, value: &str) -> bool {
    words.first().is_some_and(|word| word.is(letter, value))
}

/// Whether the line is a `G1` move
pub fn is_linear_move(words: &[Word]) -> bool {
    is_command(words, 'G', "1")
}
