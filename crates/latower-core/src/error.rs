//! Error handling for the tower generator
//!
//! Provides error types for every stage of a generation run:
//! - Configuration errors (option names, values, sweep bounds)
//! - Profile errors (material profile directory and fragment files)
//! - G-Code errors (tokenizing and rewriting single lines)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
///
/// Raised while building or validating a tower configuration. Always
/// surfaced before any file I/O takes place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Option name is not part of the configuration schema
    #[error("'{name}' is not a valid option")]
    UnknownOption {
        /// The option name as given.
        name: String,
    },

    /// Option was given without a following value
    #[error("You must specify a space then a value after --{name}")]
    MissingValue {
        /// The option name as given.
        name: String,
    },

    /// Option value could not be coerced to the option's type
    #[error("Invalid value for '{name}': '{value}' is not a valid {expected}")]
    InvalidValue {
        /// The option name.
        name: String,
        /// The raw value that failed to parse.
        value: String,
        /// Human readable name of the expected type.
        expected: String,
    },

    /// K step is zero, so the sweep would never terminate
    #[error("step must be nonzero")]
    ZeroStep,

    /// K step points away from `last`, so the sweep would never run
    #[error("step {step} does not move from first {first} toward last {last}")]
    StepDirection {
        /// Configured first K.
        first: String,
        /// Configured last K.
        last: String,
        /// Configured K step.
        step: String,
    },

    /// Sweep has more layers than can be counted
    #[error("sweep from {first} to {last} in steps of {step} has too many layers")]
    SweepTooLong {
        /// Configured first K.
        first: String,
        /// Configured last K.
        last: String,
        /// Configured K step.
        step: String,
    },

    /// Tower top is beyond what the decimal type can carry
    #[error(
        "tower height is out of range (raft {raft_height}, gap {raft_air_gap}, layer height {layer_height})"
    )]
    HeightOutOfRange {
        /// Configured raft height.
        raft_height: String,
        /// Configured raft air gap.
        raft_air_gap: String,
        /// Configured layer height.
        layer_height: String,
    },

    /// Precision beyond what the decimal type can carry
    #[error("precision {precision} exceeds the maximum of {max} fractional digits")]
    InvalidPrecision {
        /// Requested precision.
        precision: u32,
        /// Largest supported precision.
        max: u32,
    },

    /// A value that must be strictly positive was not
    #[error("{name} must be > 0 (got {value})")]
    NotPositive {
        /// The option name.
        name: String,
        /// The offending value.
        value: String,
    },

    /// A required text value was empty
    #[error("{name} must not be empty")]
    Empty {
        /// The option name.
        name: String,
    },

    /// Configuration file extension not recognized
    #[error("Config file must be .json or .toml: {path}")]
    UnsupportedFormat {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// Configuration file could not be parsed
    #[error("Invalid config file {path}: {reason}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Unknown preset name
    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset {
        /// The preset name as given.
        name: String,
        /// Comma separated list of valid names.
        available: String,
    },
}

/// Material profile error type
///
/// Represents problems locating the G-code fragments a tower is built from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Material profile directory does not exist
    #[error("There is no material profile \"{}\"", path.display())]
    NotFound {
        /// The directory that was looked up.
        path: PathBuf,
    },

    /// A chunk's fragment file is missing from the profile
    #[error("Material profile has no fragment for chunk '{chunk}': {}", path.display())]
    MissingFragment {
        /// Chunk name.
        chunk: String,
        /// The fragment path that was looked up.
        path: PathBuf,
    },
}

/// G-Code error type
///
/// Represents errors raised while tokenizing or rewriting a single line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcodeError {
    /// A parameter value that must be numeric is not
    #[error("Malformed {param} value '{value}' at line {line_number}")]
    MalformedNumber {
        /// 1-based line number within the fragment, 0 if unknown.
        line_number: usize,
        /// Parameter letter.
        param: char,
        /// The text that failed to parse.
        value: String,
    },

    /// A rewritten value does not fit the decimal type
    #[error("{param} value out of range in line: {line}")]
    OutOfRange {
        /// Parameter letter.
        param: char,
        /// The template line being rewritten.
        line: String,
    },

    /// The parameter to rewrite is not present on the line
    #[error("Missing parameter '{param}' in line: {line}")]
    MissingParameter {
        /// Parameter letter.
        param: char,
        /// The line that was searched.
        line: String,
    },
}

impl GcodeError {
    /// Attach a line number to a number error raised without one
    pub fn at_line(self, line_number: usize) -> Self {
        match self {
            GcodeError::MalformedNumber { param, value, .. } => GcodeError::MalformedNumber {
                line_number,
                param,
                value,
            },
            other => other,
        }
    }
}

/// Main error type for the tower generator
///
/// A unified error type that can represent any error from all crates.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Material profile error
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Process exit code for this error
    ///
    /// A missing material profile exits with 2; everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Profile(ProfileError::NotFound { .. }) => 2,
            _ => 1,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownOption {
            name: "frist".to_string(),
        };
        assert_eq!(err.to_string(), "'frist' is not a valid option");

        let err = ConfigError::MissingValue {
            name: "step".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "You must specify a space then a value after --step"
        );
    }

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::NotFound {
            path: PathBuf::from("data/ABS"),
        };
        assert_eq!(err.to_string(), "There is no material profile \"data/ABS\"");
    }

    #[test]
    fn test_exit_codes() {
        let err: Error = ProfileError::NotFound {
            path: PathBuf::from("data/ABS"),
        }
        .into();
        assert_eq!(err.exit_code(), 2);

        let err: Error = ConfigError::ZeroStep.into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.is_config_error());

        let err: Error = ProfileError::MissingFragment {
            chunk: "raft".to_string(),
            path: PathBuf::from("data/PLA/raft.gcode"),
        }
        .into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_gcode_error_line_attachment() {
        let err = GcodeError::MalformedNumber {
            line_number: 0,
            param: 'E',
            value: "1.2.3".to_string(),
        }
        .at_line(42);
        assert_eq!(err.to_string(), "Malformed E value '1.2.3' at line 42");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
