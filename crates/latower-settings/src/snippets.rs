//! Literal text emitted around each pipeline stage

use latower_core::Chunk;
use serde::{Deserialize, Serialize};

/// Optional text written before and after one stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkSnippets {
    /// Written once before the stage's content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Written once after the stage's content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl ChunkSnippets {
    /// Snippets with both sides set
    pub fn around(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }
}

/// Which side of a stage a snippet belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnippetSide {
    Before,
    After,
}

impl SnippetSide {
    /// Prefix used in option names (`before_start`, `after_end`, ...)
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Snippets for every stage, one record per stage
///
/// Serialized as a table keyed by stage name; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnippetTable {
    pub prep: ChunkSnippets,
    pub start: ChunkSnippets,
    pub before_raft: ChunkSnippets,
    pub raft: ChunkSnippets,
    pub before_meshes: ChunkSnippets,
    pub tower: ChunkSnippets,
    pub after_meshes: ChunkSnippets,
    pub end: ChunkSnippets,
    pub post: ChunkSnippets,
}

impl SnippetTable {
    /// Snippets for one stage
    pub fn get(&self, chunk: Chunk) -> &ChunkSnippets {
        match chunk {
            Chunk::Prep => &self.prep,
            Chunk::Start => &self.start,
            Chunk::BeforeRaft => &self.before_raft,
            Chunk::Raft => &self.raft,
            Chunk::BeforeMeshes => &self.before_meshes,
            Chunk::Tower => &self.tower,
            Chunk::AfterMeshes => &self.after_meshes,
            Chunk::End => &self.end,
            Chunk::Post => &self.post,
        }
    }

    /// Mutable snippets for one stage
    pub fn get_mut(&mut self, chunk: Chunk) -> &mut ChunkSnippets {
        match chunk {
            Chunk::Prep => &mut self.prep,
            Chunk::Start => &mut self.start,
            Chunk::BeforeRaft => &mut self.before_raft,
            Chunk::Raft => &mut self.raft,
            Chunk::BeforeMeshes => &mut self.before_meshes,
            Chunk::Tower => &mut self.tower,
            Chunk::AfterMeshes => &mut self.after_meshes,
            Chunk::End => &mut self.end,
            Chunk::Post => &mut self.post,
        }
    }

    /// One side of one stage
    pub fn side(&self, chunk: Chunk, side: SnippetSide) -> Option<&str> {
        let snippets = self.get(chunk);
        match side {
            SnippetSide::Before => snippets.before.as_deref(),
            SnippetSide::After => snippets.after.as_deref(),
        }
    }

    /// Replace one side of one stage
    pub fn set_side(&mut self, chunk: Chunk, side: SnippetSide, text: Option<String>) {
        let snippets = self.get_mut(chunk);
        match side {
            SnippetSide::Before => snippets.before = text,
            SnippetSide::After => snippets.after = text,
        }
    }

    /// Markers bracketing the slicer's start and end blocks
    pub fn slicer_markers() -> Self {
        Self {
            start: ChunkSnippets::around(
                "; -- START GCODE --",
                "; -- end of START GCODE --",
            ),
            end: ChunkSnippets::around("; -- END GCODE --", "; -- end of END GCODE --"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_matches_stage() {
        let table = SnippetTable::slicer_markers();
        assert_eq!(
            table.side(Chunk::Start, SnippetSide::Before),
            Some("; -- START GCODE --")
        );
        assert_eq!(
            table.side(Chunk::End, SnippetSide::After),
            Some("; -- end of END GCODE --")
        );
        assert_eq!(table.side(Chunk::Tower, SnippetSide::Before), None);
        assert_eq!(table.side(Chunk::Raft, SnippetSide::After), None);
    }

    #[test]
    fn test_set_side() {
        let mut table = SnippetTable::default();
        table.set_side(Chunk::Tower, SnippetSide::After, Some(";END TOWER".into()));
        assert_eq!(table.tower.after.as_deref(), Some(";END TOWER"));
        assert!(table.after_meshes.after.is_none());
    }
}
