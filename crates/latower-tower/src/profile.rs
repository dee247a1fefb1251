//! Material profile resolution
//!
//! A profile is a directory of G-code fragments, one per pipeline stage,
//! plus one template per tower shape:
//!
//! ```text
//! data/PLA/
//!   prep.gcode  start.gcode  before_raft.gcode  raft.gcode
//!   before_meshes.gcode  square.gcode  after_meshes.gcode
//!   end.gcode  post.gcode
//! ```

use latower_core::{Chunk, ProfileError, Result};
use latower_settings::TowerConfig;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// A located material profile directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialProfile {
    dir: PathBuf,
    tower_shape: String,
}

impl MaterialProfile {
    /// Locate the profile a configuration refers to
    ///
    /// Fails with [`ProfileError::NotFound`] when the directory does not
    /// exist. Individual fragments are only checked when opened.
    pub fn locate(config: &TowerConfig) -> Result<Self> {
        Self::open(config.material_dir(), &config.tower_shape)
    }

    /// Use `dir` as the profile directory
    pub fn open(dir: impl Into<PathBuf>, tower_shape: &str) -> Result<Self> {
        let dir = dir.into();
        tracing::info!(material_path = %dir.display(), "resolving material profile");
        if !dir.is_dir() {
            return Err(ProfileError::NotFound { path: dir }.into());
        }
        Ok(Self {
            dir,
            tower_shape: tower_shape.to_string(),
        })
    }

    /// Profile directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fragment path for one stage
    pub fn fragment_path(&self, chunk: Chunk) -> PathBuf {
        self.dir.join(chunk.fragment_file_name(&self.tower_shape))
    }

    /// Open a stage's fragment for line-by-line streaming
    pub fn open_fragment(&self, chunk: Chunk) -> Result<BufReader<File>> {
        let path = self.fragment_path(chunk);
        match File::open(&path) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ProfileError::MissingFragment {
                chunk: chunk.name().to_string(),
                path,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a whole fragment into lines, without terminators
    pub fn read_fragment(&self, chunk: Chunk) -> Result<Vec<String>> {
        let reader = self.open_fragment(chunk)?;
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latower_core::Error;

    #[test]
    fn test_missing_profile_dir() {
        let config = TowerConfig {
            data_dir: PathBuf::from("/nonexistent/latower-data"),
            ..TowerConfig::default()
        };
        let err = MaterialProfile::locate(&config).unwrap_err();
        assert!(matches!(err, Error::Profile(ProfileError::NotFound { .. })));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_fragment_paths() {
        let dir = std::env::temp_dir();
        let profile = MaterialProfile::open(&dir, "round").unwrap();
        assert_eq!(profile.fragment_path(Chunk::Tower), dir.join("round.gcode"));
        assert_eq!(profile.fragment_path(Chunk::Post), dir.join("post.gcode"));
    }
}
