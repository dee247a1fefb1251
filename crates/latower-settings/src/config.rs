//! Tower configuration
//!
//! A single typed record holds every parameter of a generation run:
//! - K sweep bounds and step
//! - Raft geometry the tower is stacked on
//! - Output precision
//! - Material profile, tower shape, and per-layer header text
//! - Literal snippets around each pipeline stage
//!
//! Configuration can be loaded from and saved to JSON or TOML files, and
//! individual fields can be overridden by name through [`OptionKey`].

use latower_core::{Chunk, ConfigError, Error, Result};
use latower_gcode::MAX_PRECISION;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::options::{OptionKey, ValueKind};
use crate::snippets::SnippetTable;

/// Placeholder in the layer header replaced by each layer's Z
pub const Z_PLACEHOLDER: &str = "{z}";

/// Layer header of the stock 40x40 square tower
pub const DEFAULT_LAYER_HEADER: &str = ";MESH:square 40x40, .48 border (.4 x 1.2overextrusion).stl\n\
G0 F5400 X27.966 Y28.76 Z{z}\n\
;TYPE:WALL-OUTER\n";

/// Complete configuration of one tower generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TowerConfig {
    /// K on the first tower layer
    pub first: Decimal,
    /// Exclusive bound of the K sweep
    pub last: Decimal,
    /// K change per layer
    pub step: Decimal,
    /// Raft height in the input G-code
    pub raft_height: Decimal,
    /// Assumed gap between the top of the raft and the first layer
    pub raft_air_gap: Decimal,
    /// Height of each tower layer
    pub layer_height: Decimal,
    /// Fractional digits written for K, Z and E
    pub precision: u32,
    /// Name of the tower template fragment (without `.gcode`)
    pub tower_shape: String,
    /// Material profile directory name
    pub material: String,
    /// Header written before each layer; contains [`Z_PLACEHOLDER`]
    pub layer_header: String,
    /// Directory holding one subdirectory per material profile
    pub data_dir: PathBuf,
    /// Directory the tower file is written to
    pub output_dir: PathBuf,
    /// Literal text around each stage
    pub snippets: SnippetTable,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            first: Decimal::ZERO,
            last: Decimal::new(200, 2),
            step: Decimal::new(2, 2),
            raft_height: Decimal::new(94, 2),
            raft_air_gap: Decimal::ZERO,
            layer_height: Decimal::new(2, 1),
            precision: 5,
            tower_shape: "square".to_string(),
            material: "PLA".to_string(),
            layer_header: DEFAULT_LAYER_HEADER.to_string(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            snippets: SnippetTable::slicer_markers(),
        }
    }
}

impl TowerConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory of the configured material profile
    pub fn material_dir(&self) -> PathBuf {
        self.data_dir.join(&self.material)
    }

    /// Path of the fragment file for one stage
    pub fn fragment_path(&self, chunk: Chunk) -> PathBuf {
        self.material_dir()
            .join(chunk.fragment_file_name(&self.tower_shape))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let parse_err = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
            Some("toml") => toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
                .into())
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
                .into())
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    ///
    /// A zero step never terminates and a step pointing away from `last`
    /// never runs, so both are rejected. `first == last` is accepted and
    /// yields an empty sweep.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.step.is_zero() {
            return Err(ConfigError::ZeroStep);
        }

        let too_long = || ConfigError::SweepTooLong {
            first: self.first.to_string(),
            last: self.last.to_string(),
            step: self.step.to_string(),
        };

        let span = self.last.checked_sub(self.first).ok_or_else(too_long)?;
        if !span.is_zero() && span.is_sign_negative() != self.step.is_sign_negative() {
            return Err(ConfigError::StepDirection {
                first: self.first.to_string(),
                last: self.last.to_string(),
                step: self.step.to_string(),
            });
        }

        let layers = span.checked_div(self.step).ok_or_else(too_long)?.ceil();
        if layers.to_usize().is_none() {
            return Err(too_long());
        }

        if self.layer_height <= Decimal::ZERO {
            return Err(ConfigError::NotPositive {
                name: OptionKey::LayerHeight.name(),
                value: self.layer_height.to_string(),
            });
        }

        let height = self.raft_height.checked_add(self.raft_air_gap).and_then(|base| {
            self.layer_height
                .checked_mul(layers.checked_add(Decimal::ONE)?)?
                .checked_add(base)
        });
        if height.is_none() {
            return Err(ConfigError::HeightOutOfRange {
                raft_height: self.raft_height.to_string(),
                raft_air_gap: self.raft_air_gap.to_string(),
                layer_height: self.layer_height.to_string(),
            });
        }

        if self.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidPrecision {
                precision: self.precision,
                max: MAX_PRECISION,
            });
        }

        if self.material.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: OptionKey::Material.name(),
            });
        }

        if self.tower_shape.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: OptionKey::TowerShape.name(),
            });
        }

        if !self.layer_header.contains(Z_PLACEHOLDER) {
            tracing::warn!(
                "layer header has no {} placeholder; every layer will share one Z",
                Z_PLACEHOLDER
            );
        }

        Ok(())
    }

    /// Override one field from its raw text
    ///
    /// The text is coerced according to the option's [`ValueKind`].
    pub fn set_option(
        &mut self,
        key: OptionKey,
        raw: &str,
    ) -> std::result::Result<(), ConfigError> {
        match key {
            OptionKey::First => self.first = coerce_decimal(key, raw)?,
            OptionKey::Last => self.last = coerce_decimal(key, raw)?,
            OptionKey::Step => self.step = coerce_decimal(key, raw)?,
            OptionKey::RaftHeight => self.raft_height = coerce_decimal(key, raw)?,
            OptionKey::RaftAirGap => self.raft_air_gap = coerce_decimal(key, raw)?,
            OptionKey::LayerHeight => self.layer_height = coerce_decimal(key, raw)?,
            OptionKey::Precision => {
                self.precision = raw.trim().parse::<u32>().map_err(|_| invalid_value(key, raw))?
            }
            OptionKey::TowerShape => self.tower_shape = raw.to_string(),
            OptionKey::Material => self.material = raw.to_string(),
            OptionKey::LayerHeader => self.layer_header = unescape_newlines(raw),
            OptionKey::DataDir => self.data_dir = PathBuf::from(raw),
            OptionKey::OutputDir => self.output_dir = PathBuf::from(raw),
            OptionKey::Snippet(chunk, side) => {
                let text = (!raw.is_empty()).then(|| unescape_newlines(raw));
                self.snippets.set_side(chunk, side, text);
            }
        }

        Ok(())
    }

    /// Override one field by option name
    pub fn apply_override(
        &mut self,
        name: &str,
        raw: &str,
    ) -> std::result::Result<(), ConfigError> {
        let key = name.parse::<OptionKey>()?;
        self.set_option(key, raw)
    }

    /// Parse and apply a `name=value` assignment
    pub fn apply_assignment(&mut self, assignment: &str) -> std::result::Result<(), ConfigError> {
        match assignment.split_once('=') {
            Some((name, raw)) => self.apply_override(name.trim(), raw),
            None => Err(ConfigError::MissingValue {
                name: assignment.to_string(),
            }),
        }
    }
}

fn invalid_value(key: OptionKey, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: key.name(),
        value: raw.to_string(),
        expected: key.kind().to_string(),
    }
}

fn coerce_decimal(key: OptionKey, raw: &str) -> std::result::Result<Decimal, ConfigError> {
    debug_assert_eq!(key.kind(), ValueKind::Decimal);
    Decimal::from_str(raw.trim()).map_err(|_| invalid_value(key, raw))
}

/// Multi-line text given on one command line uses `\n` escapes
fn unescape_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
