//! # LATower G-Code
//!
//! The small line-oriented G-code toolkit the tower assembler is built on:
//!
//! - **Tokenizer**: split a line into ordered `(letter, value)` words
//! - **Lookup**: collapse words into a last-value-wins letter map
//! - **Rewrite**: replace one parameter's value at a fixed precision,
//!   leaving every other byte of the line untouched
//! - **Numbers**: decimal parsing, round-to-nearest, fixed-point formatting

pub mod number;
pub mod parser;
pub mod rewrite;

pub use number::{format_fixed, parse_decimal, round_nearest, MAX_PRECISION};
pub use parser::{is_command, is_comment_or_blank, is_linear_move, parse_words, word_map, Word};
pub use rewrite::replace_param;
