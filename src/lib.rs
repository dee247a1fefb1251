//! # LATower
//!
//! Generates a linear advance (`M900 K`) calibration tower for FDM
//! printers from a pre-sliced material profile:
//! - Streams the profile's start-up, raft and shutdown fragments verbatim
//! - Repeats a single template layer up the tower, one K step per layer
//! - Keeps absolute extrusion continuous across the raft/tower seam
//!
//! ## Architecture
//!
//! LATower is organized as a workspace with multiple crates:
//!
//! 1. **latower-core** - Error types and the pipeline stage enum
//! 2. **latower-gcode** - G-code line protocol: parsing, rewriting, rounding
//! 3. **latower-settings** - Tower configuration, option schema, presets
//! 4. **latower-tower** - Sweep, continuity, remapping and the assembler
//! 5. **latower** - Command-line binary that ties the crates together

pub mod cli;

pub use latower_core::{Chunk, ConfigError, Error, GcodeError, ProfileError, Result};
pub use latower_settings::{OptionKey, Preset, TowerConfig};
pub use latower_tower::{MaterialProfile, SweepPlan, TowerAssembler, TowerReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Logs go to stderr so the report printed on stdout stays machine
/// readable. `RUST_LOG` takes precedence over `verbosity`, which maps
/// 0/1/2+ to INFO/DEBUG/TRACE.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .with_level(true)
        .with_line_number(verbosity > 1);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
