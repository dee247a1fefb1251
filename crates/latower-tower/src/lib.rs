//! # LATower Tower Assembly
//!
//! Builds a linear advance calibration tower by splicing a repeated,
//! per-layer K sweep onto a pre-sliced raft.
//!
//! ## Pieces
//!
//! - **Continuity**: finds the raft's final absolute E
//! - **Sweep**: the lazy K/Z layer sequence
//! - **Remap**: re-bases each template layer's E onto the running stream
//! - **Profile**: locates a material profile's fragment files
//! - **Output**: derives the output file name from the sweep
//! - **Assembler**: the fixed nine-stage pipeline tying it all together

pub mod assembler;
pub mod continuity;
pub mod output;
pub mod profile;
pub mod remap;
pub mod sweep;

pub use assembler::{TowerAssembler, TowerReport};
pub use continuity::{last_extrusion, line_extrusion, ContinuityTracker, ExtrusionAnchor};
pub use output::{output_file_name, output_path};
pub use profile::MaterialProfile;
pub use remap::{LayerRemapper, RemappedLayer, TemplateLayer};
pub use sweep::{Layer, SweepIter, SweepPlan};
