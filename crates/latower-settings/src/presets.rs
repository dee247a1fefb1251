//! Named configuration presets
//!
//! Each preset is a complete [`TowerConfig`]; command-line options are
//! applied on top of it.

use latower_core::ConfigError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::config::TowerConfig;

/// Built-in sweep presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// PLA, K 0.00 to 2.00 in 0.02 steps
    #[default]
    Pla,
    /// PLA, K 0.00 to 0.50 in 0.01 steps
    PlaFine,
    /// PLA, K 0.00 to 2.00 in 0.10 steps
    PlaCoarse,
    /// TPU, K 0.00 to 1.00 in 0.05 steps
    Tpu,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Pla, Preset::PlaFine, Preset::PlaCoarse, Preset::Tpu];

    /// Preset name as given to `--preset`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pla => "pla",
            Self::PlaFine => "pla-fine",
            Self::PlaCoarse => "pla-coarse",
            Self::Tpu => "tpu",
        }
    }

    /// Configuration this preset stands for
    pub fn config(&self) -> TowerConfig {
        let base = TowerConfig::default();
        match self {
            Self::Pla => base,
            Self::PlaFine => TowerConfig {
                last: Decimal::new(50, 2),
                step: Decimal::new(1, 2),
                precision: 3,
                ..base
            },
            Self::PlaCoarse => TowerConfig {
                step: Decimal::new(10, 2),
                precision: 2,
                ..base
            },
            Self::Tpu => TowerConfig {
                last: Decimal::new(100, 2),
                step: Decimal::new(5, 2),
                material: "TPU".to_string(),
                ..base
            },
        }
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(|preset| preset.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}
