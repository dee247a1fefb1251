//! Tower assembly pipeline
//!
//! Walks the fixed stage order once, left to right:
//!
//! 1. Pre-tower stages are streamed verbatim while the continuity tracker
//!    watches their extrusion.
//! 2. The tracker is frozen into the anchor and the tower stage repeats the
//!    template layer for every step of the K sweep.
//! 3. Post-tower stages are streamed verbatim.
//!
//! Every line written ends in exactly one newline. All state lives on the
//! stack of one [`TowerAssembler::assemble`] call, so repeated runs in one
//! process are independent and produce identical output.

use latower_core::{Chunk, Result};
use latower_gcode::format_fixed;
use latower_settings::{TowerConfig, Z_PLACEHOLDER};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::continuity::{ContinuityTracker, ExtrusionAnchor};
use crate::output::output_path;
use crate::profile::MaterialProfile;
use crate::remap::{LayerRemapper, TemplateLayer};
use crate::sweep::{Layer, SweepPlan};

/// Summary of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TowerReport {
    /// Number of tower layers written
    pub layers: usize,
    /// First and last layer written, if any
    pub first_layer: Option<Layer>,
    pub last_layer: Option<Layer>,
    /// Print height after the final layer (one layer height above it)
    pub height: Decimal,
    /// E the tower was re-based against
    pub anchor: ExtrusionAnchor,
    /// Absolute E after the last tower layer
    pub end_e: Decimal,
    /// File the tower was written to, when written to disk
    pub output: Option<PathBuf>,
}

/// Builds a tower file from a validated configuration
#[derive(Debug, Clone)]
pub struct TowerAssembler {
    config: TowerConfig,
}

impl TowerAssembler {
    /// Create an assembler; the configuration is validated here
    pub fn new(config: TowerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    /// The K/Z sweep this assembler prints
    pub fn sweep(&self) -> SweepPlan {
        SweepPlan::from_config(&self.config)
    }

    /// Layer header with `{z}` filled in
    pub fn layer_header(&self, z: Decimal) -> String {
        self.config
            .layer_header
            .replace(Z_PLACEHOLDER, &format_fixed(z, self.config.precision))
    }

    /// Generate the tower at the path derived from the configuration
    pub fn generate(&self) -> Result<TowerReport> {
        self.generate_to(&output_path(&self.config))
    }

    /// Generate the tower into `path`
    ///
    /// The profile is located before anything touches the disk. Output is
    /// written to a temporary file next to `path` and moved into place only
    /// after the whole pipeline succeeded; on failure the temporary file is
    /// removed and `path` is left as it was.
    pub fn generate_to(&self, path: &Path) -> Result<TowerReport> {
        let profile = MaterialProfile::locate(&self.config)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".latower-").suffix(".part");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }
        let part = builder.tempfile_in(&dir)?;

        let mut report = {
            let mut writer = BufWriter::new(part.as_file());
            let report = self.assemble(&profile, &mut writer)?;
            writer.flush()?;
            report
        };

        part.persist(path).map_err(|e| e.error)?;
        report.output = Some(path.to_path_buf());

        tracing::info!(height = %report.height, layers = report.layers, "wrote \"{}\"", path.display());
        Ok(report)
    }

    /// Run the whole pipeline into `out`
    pub fn assemble<W: Write>(
        &self,
        profile: &MaterialProfile,
        out: &mut W,
    ) -> Result<TowerReport> {
        let anchor = self.emit_pre_tower(profile, out)?;
        let report = self.emit_tower(profile, anchor, out)?;
        self.emit_post_tower(profile, out)?;
        Ok(report)
    }

    /// Stream every stage before the tower and return the continuity anchor
    fn emit_pre_tower<W: Write>(
        &self,
        profile: &MaterialProfile,
        out: &mut W,
    ) -> Result<ExtrusionAnchor> {
        let mut tracker = ContinuityTracker::new();
        for chunk in &Chunk::ALL[..Chunk::Tower.index()] {
            self.emit_chunk(*chunk, profile, Some(&mut tracker), out)?;
        }
        let anchor = tracker.into_anchor();
        tracing::debug!(anchor = %anchor.value, defaulted = anchor.defaulted, "raft extrusion anchor");
        Ok(anchor)
    }

    /// Stream every stage after the tower
    fn emit_post_tower<W: Write>(&self, profile: &MaterialProfile, out: &mut W) -> Result<()> {
        for chunk in &Chunk::ALL[Chunk::Tower.index() + 1..] {
            self.emit_chunk(*chunk, profile, None, out)?;
        }
        Ok(())
    }

    /// Write one verbatim stage, feeding the tracker when one is given
    fn emit_chunk<W: Write>(
        &self,
        chunk: Chunk,
        profile: &MaterialProfile,
        mut tracker: Option<&mut ContinuityTracker>,
        out: &mut W,
    ) -> Result<()> {
        tracing::debug!(chunk = %chunk, "streaming fragment");
        let snippets = self.config.snippets.get(chunk);

        if let Some(before) = &snippets.before {
            write_block(out, before)?;
        }

        let reader = profile.open_fragment(chunk)?;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(tracker) = tracker.as_deref_mut() {
                tracker.observe_line(&line, i + 1).inspect_err(|err| {
                    tracing::error!(chunk = %chunk, path = %profile.fragment_path(chunk).display(), "{}", err);
                })?;
            }
            writeln!(out, "{}", line)?;
        }

        if let Some(after) = &snippets.after {
            write_block(out, after)?;
            if let Some(tracker) = tracker.as_deref_mut() {
                tracker.observe_text(after)?;
            }
        }

        Ok(())
    }

    /// Write the tower stage: one re-based template layer per sweep step
    fn emit_tower<W: Write>(
        &self,
        profile: &MaterialProfile,
        anchor: ExtrusionAnchor,
        out: &mut W,
    ) -> Result<TowerReport> {
        let precision = self.config.precision;
        let snippets = self.config.snippets.get(Chunk::Tower);

        let template = TemplateLayer::parse(profile.read_fragment(Chunk::Tower)?)?;
        if template.extrusion_count() == 0 {
            tracing::warn!("tower template has no G1 extrusion moves");
        }
        let remapper = LayerRemapper::new(template, anchor.value, precision);

        if let Some(before) = &snippets.before {
            write_block(out, before)?;
        }

        let sweep = self.sweep();
        let mut previous_end = anchor.value;
        let mut first_layer = None;
        let mut last_layer = None;
        let mut count = 0;

        for layer in sweep.layers() {
            writeln!(out, ";LAYER:{}", layer.index)?;
            writeln!(out, "M900 K{}", format_fixed(layer.k, precision))?;
            write_block(out, &self.layer_header(layer.z))?;

            let body = remapper.remap(previous_end)?;
            for line in &body.lines {
                writeln!(out, "{}", line)?;
            }
            tracing::trace!(layer = layer.index, k = %layer.k, z = %layer.z, end_e = %body.end_e, "tower layer");
            previous_end = body.end_e;

            first_layer.get_or_insert(layer);
            last_layer = Some(layer);
            count += 1;
        }

        if let Some(after) = &snippets.after {
            write_block(out, after)?;
        }

        let last_z = last_layer.map_or(sweep.base_z, |layer| layer.z);
        let height = last_z.saturating_add(self.config.layer_height);
        tracing::info!("height={}", height);

        Ok(TowerReport {
            layers: count,
            first_layer,
            last_layer,
            height,
            anchor,
            end_e: previous_end,
            output: None,
        })
    }
}

/// Write a block of text, adding a final newline if it lacks one
fn write_block<W: Write>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}
