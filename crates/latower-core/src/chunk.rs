//! Assembly pipeline stages
//!
//! A tower file is stitched together from nine fragments in a fixed order.
//! Every stage except [`Chunk::Tower`] is streamed verbatim from its
//! fragment; the tower stage repeats a template layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One stage of the assembly pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chunk {
    /// Printer preparation (heating, homing)
    Prep,
    /// Slicer start G-code
    Start,
    /// Moves between the start block and the raft
    BeforeRaft,
    /// The pre-sliced raft
    Raft,
    /// Moves between the raft and the first tower layer
    BeforeMeshes,
    /// The repeated calibration layers
    Tower,
    /// Moves after the last tower layer
    AfterMeshes,
    /// Slicer end G-code
    End,
    /// Anything appended after the end block
    Post,
}

impl Chunk {
    /// Number of pipeline stages
    pub const COUNT: usize = 9;

    /// Every stage, in processing order
    pub const ALL: [Chunk; Chunk::COUNT] = [
        Chunk::Prep,
        Chunk::Start,
        Chunk::BeforeRaft,
        Chunk::Raft,
        Chunk::BeforeMeshes,
        Chunk::Tower,
        Chunk::AfterMeshes,
        Chunk::End,
        Chunk::Post,
    ];

    /// Stage name as used in fragment file names and configuration keys
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prep => "prep",
            Self::Start => "start",
            Self::BeforeRaft => "before_raft",
            Self::Raft => "raft",
            Self::BeforeMeshes => "before_meshes",
            Self::Tower => "tower",
            Self::AfterMeshes => "after_meshes",
            Self::End => "end",
            Self::Post => "post",
        }
    }

    /// Key used for this stage's before/after snippets
    ///
    /// The tower stage is addressed as `meshes` (`before_meshes`,
    /// `after_meshes`), which is why those snippet names never refer to the
    /// stages of the same name.
    pub fn snippet_key(&self) -> &'static str {
        match self {
            Self::Tower => "meshes",
            other => other.name(),
        }
    }

    /// Position of this stage in [`Chunk::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Fragment file name for this stage
    ///
    /// The tower stage reads the template of the configured shape instead
    /// of a file named after the stage.
    pub fn fragment_file_name(&self, tower_shape: &str) -> String {
        match self {
            Self::Tower => format!("{}.gcode", tower_shape),
            other => format!("{}.gcode", other.name()),
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chunk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chunk::ALL
            .iter()
            .copied()
            .find(|chunk| chunk.name() == s)
            .ok_or_else(|| format!("Unknown chunk: {}", s))
    }
}
