//! Output file naming
//!
//! The file name records the sweep so towers generated with different
//! parameters never overwrite each other.

use latower_gcode::format_fixed;
use latower_settings::TowerConfig;
use std::path::PathBuf;

/// Digits used for the parameters embedded in the file name
pub const NAME_PRECISION: u32 = 2;

/// File name for a tower generated from `config`
///
/// ```
/// use latower_settings::TowerConfig;
/// use latower_tower::output_file_name;
///
/// assert_eq!(
///     output_file_name(&TowerConfig::default()),
///     "tower20x20 +0.94raft+0.00gap lh=0.20 linewidth=.48 (LA K=0.00to2.00 step=0.02).gcode"
/// );
/// ```
pub fn output_file_name(config: &TowerConfig) -> String {
    let fmt = |value| format_fixed(value, NAME_PRECISION);
    format!(
        "tower20x20 +{}raft+{}gap lh={} linewidth=.48 (LA K={}to{} step={}).gcode",
        fmt(config.raft_height),
        fmt(config.raft_air_gap),
        fmt(config.layer_height),
        fmt(config.first),
        fmt(config.last),
        fmt(config.step),
    )
}

/// Full output path: the configured output directory plus the file name
pub fn output_path(config: &TowerConfig) -> PathBuf {
    config.output_dir.join(output_file_name(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use latower_settings::Preset;

    #[test]
    fn test_names_differ_per_sweep() {
        let names: Vec<String> = Preset::ALL
            .iter()
            .map(|preset| output_file_name(&preset.config()))
            .collect();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_name_rounds_to_two_digits() {
        let mut config = TowerConfig::default();
        config.apply_override("step", "0.005").unwrap();
        config.apply_override("raft_air_gap", "0.3").unwrap();
        let name = output_file_name(&config);
        assert!(name.contains("+0.30gap"));
        assert!(name.ends_with("step=0.01).gcode"));
    }

    #[test]
    fn test_output_path_uses_output_dir() {
        let config = TowerConfig {
            output_dir: PathBuf::from("out"),
            ..TowerConfig::default()
        };
        assert!(output_path(&config).starts_with("out"));
    }
}
