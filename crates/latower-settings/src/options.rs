//! Option schema
//!
//! Every field a user may override by name, with the type its raw text is
//! coerced to. Names follow the generator's historical option spelling
//! (`raft_height`, `before_start`, ...).

use latower_core::{Chunk, ConfigError};
use std::fmt;
use std::str::FromStr;

use crate::snippets::SnippetSide;

/// Declared type of an option's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Arbitrary-precision decimal
    Decimal,
    /// Non-negative integer
    Integer,
    /// Free text, taken verbatim
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal => write!(f, "decimal number"),
            Self::Integer => write!(f, "non-negative integer"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A named, overridable configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    First,
    Last,
    Step,
    RaftHeight,
    RaftAirGap,
    LayerHeight,
    Precision,
    TowerShape,
    Material,
    LayerHeader,
    DataDir,
    OutputDir,
    Snippet(Chunk, SnippetSide),
}

impl OptionKey {
    /// Every scalar option; snippet options are generated per stage
    pub const SCALARS: [OptionKey; 12] = [
        OptionKey::First,
        OptionKey::Last,
        OptionKey::Step,
        OptionKey::RaftHeight,
        OptionKey::RaftAirGap,
        OptionKey::LayerHeight,
        OptionKey::Precision,
        OptionKey::TowerShape,
        OptionKey::Material,
        OptionKey::LayerHeader,
        OptionKey::DataDir,
        OptionKey::OutputDir,
    ];

    /// Every option the schema accepts
    pub fn all() -> Vec<OptionKey> {
        let mut keys = Self::SCALARS.to_vec();
        for chunk in Chunk::ALL {
            keys.push(OptionKey::Snippet(chunk, SnippetSide::Before));
            keys.push(OptionKey::Snippet(chunk, SnippetSide::After));
        }
        keys
    }

    /// Option name as typed on the command line
    pub fn name(&self) -> String {
        let name = match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Step => "step",
            Self::RaftHeight => "raft_height",
            Self::RaftAirGap => "raft_air_gap",
            Self::LayerHeight => "layer_height",
            Self::Precision => "precision",
            Self::TowerShape => "tower_shape",
            Self::Material => "material",
            Self::LayerHeader => "before_layer",
            Self::DataDir => "data_dir",
            Self::OutputDir => "output_dir",
            Self::Snippet(chunk, side) => {
                return format!("{}_{}", side.prefix(), chunk.snippet_key());
            }
        };
        name.to_string()
    }

    /// Type the raw value is coerced to
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::First
            | Self::Last
            | Self::Step
            | Self::RaftHeight
            | Self::RaftAirGap
            | Self::LayerHeight => ValueKind::Decimal,
            Self::Precision => ValueKind::Integer,
            Self::TowerShape
            | Self::Material
            | Self::LayerHeader
            | Self::DataDir
            | Self::OutputDir
            | Self::Snippet(..) => ValueKind::Text,
        }
    }

    /// Short help text
    pub fn help(&self) -> &'static str {
        match self {
            Self::First => "K (M900 K<value>) on the first tower layer",
            Self::Last => "Exclusive upper bound of the K sweep",
            Self::Step => "K change per layer",
            Self::RaftHeight => "Raft height in the input G-code",
            Self::RaftAirGap => "Assumed gap between the raft top and the first layer",
            Self::LayerHeight => "Height of each tower layer",
            Self::Precision => "Fractional digits written for K, Z and E",
            Self::TowerShape => "Tower template fragment name",
            Self::Material => "Material profile directory name",
            Self::LayerHeader => "Per-layer move header; {z} is replaced by the layer height",
            Self::DataDir => "Directory holding the material profiles",
            Self::OutputDir => "Directory the tower file is written to",
            Self::Snippet(_, SnippetSide::Before) => "Literal text written before a stage",
            Self::Snippet(_, SnippetSide::After) => "Literal text written after a stage",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for OptionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches("--").replace('-', "_");
        OptionKey::all()
            .into_iter()
            .find(|key| key.name() == name)
            .ok_or(ConfigError::UnknownOption {
                name: s.to_string(),
            })
    }
}
