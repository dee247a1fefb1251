//! Layer extrusion remapping
//!
//! The tower template was sliced with its own E numbering. Every layer is
//! re-based so that its extrusion continues from where the previous layer
//! (or the raft, for the first layer) stopped:
//!
//! ```text
//! new_E = previous_layer_end_E + (template_E - anchor_E)
//! ```
//!
//! The template's deltas are preserved; only its origin moves. The layer's
//! last rewritten E becomes the next layer's `previous_layer_end_E`.

use latower_core::GcodeError;
use latower_gcode::replace_param;
use rust_decimal::Decimal;

use crate::continuity::line_extrusion;

/// One template line, with its E value when it is an extruding `G1`
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateLine {
    text: String,
    extrusion: Option<Decimal>,
}

/// The tower's repeating layer, parsed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayer {
    lines: Vec<TemplateLine>,
}

impl TemplateLayer {
    /// Parse template lines
    ///
    /// Line terminators are removed; all other text is kept verbatim.
    /// A `G1` line whose E value is not a number fails here, before any
    /// layer is written.
    pub fn parse<I, S>(lines: I) -> Result<Self, GcodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let text = line.as_ref().trim_end_matches(['\n', '\r']).to_string();
                let extrusion = line_extrusion(&text).map_err(|err| err.at_line(i + 1))?;
                Ok(TemplateLine { text, extrusion })
            })
            .collect::<Result<Vec<_>, GcodeError>>()?;
        Ok(Self { lines })
    }

    /// Number of lines in the template
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of extruding moves per layer
    pub fn extrusion_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.extrusion.is_some())
            .count()
    }

    /// Template E values in order
    pub fn extrusions(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.lines.iter().filter_map(|line| line.extrusion)
    }
}

/// A template layer rewritten for one position in the tower
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedLayer {
    /// Layer body, without line terminators
    pub lines: Vec<String>,
    /// Absolute E after the layer's last extruding move
    pub end_e: Decimal,
}

/// Re-bases template layers onto the tower's extrusion stream
#[derive(Debug, Clone)]
pub struct LayerRemapper {
    template: TemplateLayer,
    anchor: Decimal,
    precision: u32,
}

impl LayerRemapper {
    pub fn new(template: TemplateLayer, anchor: Decimal, precision: u32) -> Self {
        Self {
            template,
            anchor,
            precision,
        }
    }

    pub fn template(&self) -> &TemplateLayer {
        &self.template
    }

    pub fn anchor(&self) -> Decimal {
        self.anchor
    }

    /// Rewrite the template for a layer that starts at `previous_end`
    ///
    /// A template without extruding moves leaves `end_e` at
    /// `previous_end`.
    pub fn remap(&self, previous_end: Decimal) -> Result<RemappedLayer, GcodeError> {
        let mut end_e = previous_end;
        let mut lines = Vec::with_capacity(self.template.lines.len());

        for line in &self.template.lines {
            match line.extrusion {
                Some(template_e) => {
                    end_e = template_e
                        .checked_sub(self.anchor)
                        .and_then(|delta| previous_end.checked_add(delta))
                        .ok_or_else(|| GcodeError::OutOfRange {
                            param: 'E',
                            line: line.text.clone(),
                        })?;
                    lines.push(replace_param(&line.text, 'E', end_e, self.precision)?);
                }
                None => lines.push(line.text.clone()),
            }
        }

        Ok(RemappedLayer { lines, end_e })
    }

    /// Remap `count` consecutive layers, threading each layer's end E into
    /// the next
    pub fn remap_layers(
        &self,
        start: Decimal,
        count: usize,
    ) -> Result<Vec<RemappedLayer>, GcodeError> {
        let mut previous_end = start;
        let mut layers = Vec::with_capacity(count);
        for _ in 0..count {
            let layer = self.remap(previous_end)?;
            previous_end = layer.end_e;
            layers.push(layer);
        }
        Ok(layers)
    }
}
