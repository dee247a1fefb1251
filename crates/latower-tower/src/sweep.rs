//! K/Z layer sweep
//!
//! Each tower layer raises Z by one layer height and advances K by one
//! step. The sweep starts one step before `first` and one layer below the
//! first layer, increments before every layer, and stops as soon as K
//! reaches `last`: the bound is exclusive, so a sweep from 0.00 to 0.40 in
//! 0.20 steps prints K 0.00 and 0.20 only, and `first == last` prints
//! nothing.

use latower_settings::TowerConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// One generated tower layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layer {
    /// 0-based layer number within the tower
    pub index: usize,
    /// Absolute nozzle height of the layer
    pub z: Decimal,
    /// Linear advance K printed on the layer
    pub k: Decimal,
}

/// Parameters of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    pub first: Decimal,
    pub last: Decimal,
    pub step: Decimal,
    /// Top of the raft plus the air gap
    pub base_z: Decimal,
    pub layer_height: Decimal,
}

impl SweepPlan {
    pub fn new(
        first: Decimal,
        last: Decimal,
        step: Decimal,
        base_z: Decimal,
        layer_height: Decimal,
    ) -> Self {
        Self {
            first,
            last,
            step,
            base_z,
            layer_height,
        }
    }

    /// Sweep described by a configuration
    pub fn from_config(config: &TowerConfig) -> Self {
        Self::new(
            config.first,
            config.last,
            config.step,
            config.raft_height.saturating_add(config.raft_air_gap),
            config.layer_height,
        )
    }

    /// Whether `k` is still short of the exclusive bound
    fn before_bound(&self, k: Decimal) -> bool {
        if self.step.is_sign_negative() {
            k > self.last
        } else {
            k < self.last
        }
    }

    /// Lazily generated layers
    pub fn layers(&self) -> SweepIter {
        SweepIter {
            plan: *self,
            next_k: Some(self.first),
            z: self.base_z,
            next_index: 0,
        }
    }

    /// Number of layers the sweep yields, without generating them
    ///
    /// `⌈(last − first) / step⌉` when positive, otherwise 0. Saturates at
    /// `usize::MAX` when the quotient does not fit.
    pub fn layer_count(&self) -> usize {
        if self.step.is_zero() {
            return 0;
        }
        let toward_last = (self.last > self.first) == self.step.is_sign_positive();
        let Some(steps) = self
            .last
            .checked_sub(self.first)
            .and_then(|span| span.checked_div(self.step))
        else {
            return if toward_last { usize::MAX } else { 0 };
        };
        let steps = steps.ceil();
        if steps <= Decimal::ZERO {
            0
        } else {
            steps.to_usize().unwrap_or(usize::MAX)
        }
    }

    /// Height of the print once the sweep is done
    ///
    /// One layer height above the last layer's Z, or above the base when
    /// the sweep is empty. `None` when the sweep is too long to represent.
    pub fn final_height(&self) -> Option<Decimal> {
        let layers = self.layer_count().checked_add(1)?;
        self.layer_height
            .checked_mul(Decimal::from(layers))?
            .checked_add(self.base_z)
    }

    /// The layer printed at a measured height
    ///
    /// Rounds to the nearest layer, midpoints away from zero, so a caliper
    /// reading that is slightly off still lands on a layer. Returns `None`
    /// outside the tower.
    pub fn layer_at_height(&self, z: Decimal) -> Option<Layer> {
        if self.layer_height <= Decimal::ZERO {
            return None;
        }
        let position = z
            .checked_sub(self.base_z)?
            .checked_div(self.layer_height)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            - Decimal::ONE;
        if position.is_sign_negative() {
            return None;
        }
        let index = position.to_usize()?;
        if index >= self.layer_count() {
            return None;
        }
        let n = Decimal::from(index);
        Some(Layer {
            index,
            z: self
                .layer_height
                .checked_mul(n + Decimal::ONE)?
                .checked_add(self.base_z)?,
            k: self.step.checked_mul(n)?.checked_add(self.first)?,
        })
    }

    /// K of the layer printed at a measured height
    pub fn k_at_height(&self, z: Decimal) -> Option<Decimal> {
        self.layer_at_height(z).map(|layer| layer.k)
    }
}

/// Iterator over the layers of a [`SweepPlan`]
#[derive(Debug, Clone)]
pub struct SweepIter {
    plan: SweepPlan,
    next_k: Option<Decimal>,
    z: Decimal,
    next_index: usize,
}

impl Iterator for SweepIter {
    type Item = Layer;

    fn next(&mut self) -> Option<Layer> {
        if self.plan.step.is_zero() {
            return None;
        }
        let k = self.next_k.filter(|k| self.plan.before_bound(*k))?;
        let z = self.z.checked_add(self.plan.layer_height)?;
        self.next_k = k.checked_add(self.plan.step);
        self.z = z;
        let layer = Layer {
            index: self.next_index,
            z,
            k,
        };
        self.next_index += 1;
        Some(layer)
    }
}

impl std::iter::FusedIterator for SweepIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn plan(first: &str, last: &str, step: &str) -> SweepPlan {
        SweepPlan::new(dec(first), dec(last), dec(step), dec("0.94"), dec("0.20"))
    }

    #[test]
    fn test_last_is_exclusive() {
        let layers: Vec<Layer> = plan("0.00", "0.40", "0.20").layers().collect();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].k, dec("0.00"));
        assert_eq!(layers[0].z, dec("1.14"));
        assert_eq!(layers[1].k, dec("0.20"));
        assert_eq!(layers[1].z, dec("1.34"));
    }

    #[test]
    fn test_empty_sweep() {
        let p = plan("0.40", "0.40", "0.20");
        assert_eq!(p.layers().count(), 0);
        assert_eq!(p.layer_count(), 0);
        assert_eq!(p.final_height(), Some(dec("1.14")));
    }

    #[test]
    fn test_partial_final_step() {
        // 0.00, 0.30, 0.60, 0.90 are all < 1.00
        let p = plan("0.00", "1.00", "0.30");
        assert_eq!(p.layers().count(), 4);
        assert_eq!(p.layer_count(), 4);
    }

    #[test]
    fn test_default_sweep_has_one_hundred_layers() {
        let p = plan("0.00", "2.00", "0.02");
        let layers: Vec<Layer> = p.layers().collect();
        assert_eq!(layers.len(), 100);
        assert_eq!(layers.last().unwrap().k, dec("1.98"));
        assert_eq!(p.final_height(), Some(dec("0.94") + dec("0.20") * dec("101")));
    }

    #[test]
    fn test_descending_sweep() {
        let layers: Vec<Decimal> = plan("1.0", "0.0", "-0.25").layers().map(|l| l.k).collect();
        assert_eq!(layers, vec![dec("1.0"), dec("0.75"), dec("0.50"), dec("0.25")]);
    }

    #[test]
    fn test_zero_step_yields_nothing() {
        let p = plan("0.0", "1.0", "0.0");
        assert_eq!(p.layers().count(), 0);
        assert_eq!(p.layer_count(), 0);
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut iter = plan("0.0", "0.2", "0.2").layers();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_k_at_height() {
        let p = plan("0.00", "2.00", "0.02");
        assert_eq!(p.k_at_height(dec("1.14")), Some(dec("0.00")));
        assert_eq!(p.k_at_height(dec("1.34")), Some(dec("0.02")));
        // nearest layer
        assert_eq!(p.k_at_height(dec("3.15")), Some(dec("0.20")));
        assert_eq!(p.k_at_height(dec("0.94")), None);
        assert_eq!(p.k_at_height(dec("50")), None);

        let layer = p.layer_at_height(dec("3.15")).unwrap();
        assert_eq!(layer.index, 10);
        assert_eq!(layer.z, dec("3.14"));
    }

    #[test]
    fn test_midpoint_height_rounds_up() {
        // 1.24 is halfway between layer 0 (1.14) and layer 1 (1.34)
        let p = plan("0.00", "2.00", "0.02");
        assert_eq!(p.layer_at_height(dec("1.24")).unwrap().index, 1);
        // 1.44 is halfway between layers 1 and 2, not rounded to the even one
        assert_eq!(p.layer_at_height(dec("1.44")).unwrap().index, 2);
    }

    #[test]
    fn test_tiny_step_does_not_overflow() {
        let p = plan("0", "100", "0.0000000000000000000000000001");
        assert_eq!(p.layer_count(), usize::MAX);
        assert_eq!(p.final_height(), None);
        assert_eq!(p.layer_at_height(dec("1.2")).map(|l| l.index), Some(0));
        assert_eq!(p.layer_at_height(dec("79228162514264337593543950335")), None);
    }

    #[test]
    fn test_full_range_span_does_not_overflow() {
        let base = (dec("0.94"), dec("0.20"));
        let up = SweepPlan::new(Decimal::MIN, Decimal::MAX, Decimal::ONE, base.0, base.1);
        assert_eq!(up.layer_count(), usize::MAX);
        assert_eq!(up.layers().next().map(|l| l.k), Some(Decimal::MIN));
        let away = SweepPlan::new(Decimal::MIN, Decimal::MAX, -Decimal::ONE, base.0, base.1);
        assert_eq!(away.layer_count(), 0);
        assert_eq!(away.layers().count(), 0);
    }
}
