//! LATower Settings Crate
//!
//! Handles the tower configuration: the typed parameter record, the option
//! schema used for overrides, per-stage snippets, and built-in presets.

pub mod config;
pub mod options;
pub mod presets;
pub mod snippets;

pub use config::{TowerConfig, DEFAULT_LAYER_HEADER, Z_PLACEHOLDER};
pub use options::{OptionKey, ValueKind};
pub use presets::Preset;
pub use snippets::{ChunkSnippets, SnippetSide, SnippetTable};
