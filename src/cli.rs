//! Command-line interface
//!
//! Options are applied on top of a base configuration, in this order:
//! 1. `--config FILE`, or the `--preset` (default `pla`)
//! 2. The named sweep and geometry options
//! 3. `--set KEY=VALUE` assignments, left to right
//! 4. `--data-dir` and `--output-dir`
//!
//! Exit codes: 0 on success (and for `--help`/`/?`), 1 for argument,
//! configuration and G-code errors, 2 when the material profile is missing.

use clap::{ArgAction, CommandFactory, Parser};
use latower_core::{ConfigError, Error, Result};
use latower_gcode::format_fixed;
use latower_settings::{OptionKey, Preset, TowerConfig};
use latower_tower::{output_path, SweepPlan, TowerAssembler, TowerReport};
use rust_decimal::Decimal;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

/// Exit code for bad arguments
pub const EXIT_USAGE: i32 = 1;

const CALIBRATION_HELP: &str = "\
After generating a tower, print it and find the best layer: sharp but not
bulged, smooth but not rounded. Measure its Z and run `latower --k-at <Z>`
with the same options to get that layer's K. Then send to the printer:

  M900 K<value>  ; set linear advance
  M500           ; save settings to firmware (preserve K on reboot)

Use M900 without options to check the current K. K should be calibrated
for each filament, but is often close for one type of filament across
brands.

`/?` is accepted as a synonym for --help.";

/// Linear advance calibration tower generator
#[derive(Debug, Parser)]
#[command(name = "latower", version, about, after_help = CALIBRATION_HELP)]
pub struct Cli {
    /// K on the first tower layer (not including raft layers)
    #[arg(long, value_name = "K", allow_negative_numbers = true)]
    pub first: Option<String>,

    /// K bound; the sweep stops before reaching it
    #[arg(long, value_name = "K", allow_negative_numbers = true)]
    pub last: Option<String>,

    /// K change per layer
    #[arg(long, value_name = "K", allow_negative_numbers = true)]
    pub step: Option<String>,

    /// Raft height in the profile's G-code
    #[arg(long = "raft_height", visible_alias = "raft-height", value_name = "MM")]
    pub raft_height: Option<String>,

    /// Assume the first layer is this much higher than the top of the raft
    #[arg(long = "raft_air_gap", visible_alias = "raft-air-gap", value_name = "MM")]
    pub raft_air_gap: Option<String>,

    /// Height of each tower layer
    #[arg(long = "layer_height", visible_alias = "layer-height", value_name = "MM")]
    pub layer_height: Option<String>,

    /// Fractional digits written for K, Z and E
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<String>,

    /// Material profile directory name
    #[arg(long, value_name = "NAME")]
    pub material: Option<String>,

    /// Tower template fragment name
    #[arg(long = "tower_shape", visible_alias = "tower-shape", value_name = "NAME")]
    pub tower_shape: Option<String>,

    /// Start from a built-in preset
    #[arg(long, value_name = "NAME", conflicts_with = "config")]
    pub preset: Option<Preset>,

    /// Start from a configuration file (.toml or .json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override any configuration option, including snippets
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Directory holding the material profiles
    #[arg(long = "data-dir", visible_alias = "data_dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory the tower is written to
    #[arg(long = "output-dir", visible_alias = "output_dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the tower to this file instead of the derived name
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the K of the layer at a measured height and exit
    #[arg(long = "k-at", value_name = "Z")]
    pub k_at: Option<String>,

    /// List the built-in presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// List every option accepted by --set and exit
    #[arg(long)]
    pub list_options: bool,

    /// Save the resolved configuration to a file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Print the generation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Set when the command line carried no arguments at all
    #[arg(skip)]
    pub bare: bool,
}

/// What to do after parsing the command line
#[derive(Debug)]
pub enum Invocation {
    Run(Box<Cli>),
    Exit(i32),
}

/// Parse arguments, handling help, version and usage errors
///
/// The first item is the program name.
pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if args.iter().skip(1).any(|arg| arg == "/?") {
        let _ = Cli::command().print_long_help();
        return Invocation::Exit(0);
    }

    match Cli::try_parse_from(&args) {
        Ok(mut cli) => {
            cli.bare = args.len() <= 1;
            Invocation::Run(Box::new(cli))
        }
        Err(err) => {
            let _ = err.print();
            if err.use_stderr() {
                Invocation::Exit(EXIT_USAGE)
            } else {
                Invocation::Exit(0)
            }
        }
    }
}

/// Run a parsed command line and return the process exit code
pub fn run(cli: &Cli) -> i32 {
    match execute(cli) {
        Ok(()) => {
            if cli.bare {
                tracing::info!("Specify --help or /? after the command to see all options.");
            }
            0
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            if err.is_config_error() {
                eprintln!("Specify --help or /? to see all options.");
            }
            err.exit_code()
        }
    }
}

/// Carry out what the command line asks for
pub fn execute(cli: &Cli) -> Result<()> {
    if cli.list_presets {
        list_presets();
        return Ok(());
    }
    if cli.list_options {
        list_options();
        return Ok(());
    }

    let config = cli.resolve_config()?;

    if let Some(raw) = &cli.k_at {
        return print_k_at(&config, raw);
    }

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        tracing::info!("saved configuration to \"{}\"", path.display());
    }

    let path = cli.output_path(&config);
    let assembler = TowerAssembler::new(config)?;
    let report = assembler.generate_to(&path)?;
    print_report(&report, cli.json)
}

impl Cli {
    /// Build the configuration this command line describes
    pub fn resolve_config(&self) -> Result<TowerConfig> {
        let mut config = match &self.config {
            Some(path) => TowerConfig::load_from_file(path)?,
            None => self.preset.unwrap_or_default().config(),
        };

        let named = [
            (OptionKey::First, &self.first),
            (OptionKey::Last, &self.last),
            (OptionKey::Step, &self.step),
            (OptionKey::RaftHeight, &self.raft_height),
            (OptionKey::RaftAirGap, &self.raft_air_gap),
            (OptionKey::LayerHeight, &self.layer_height),
            (OptionKey::Precision, &self.precision),
            (OptionKey::Material, &self.material),
            (OptionKey::TowerShape, &self.tower_shape),
        ];
        for (key, value) in named {
            if let Some(raw) = value {
                config.set_option(key, raw)?;
            }
        }

        for assignment in &self.assignments {
            config.apply_assignment(assignment)?;
        }

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }

        config.validate()?;
        tracing::debug!(?config, "resolved configuration");
        Ok(config)
    }

    /// Path the tower will be written to
    pub fn output_path(&self, config: &TowerConfig) -> PathBuf {
        self.output.clone().unwrap_or_else(|| output_path(config))
    }
}

fn list_presets() {
    for preset in Preset::ALL {
        let config = preset.config();
        println!(
            "{:<11} {:<4} K {} to {} step {} (precision {})",
            preset.name(),
            config.material,
            config.first,
            config.last,
            config.step,
            config.precision,
        );
    }
}

fn list_options() {
    for key in OptionKey::all() {
        println!("{:<26} {:<20} {}", key.name(), key.kind().to_string(), key.help());
    }
}

fn print_k_at(config: &TowerConfig, raw: &str) -> Result<()> {
    let z = Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue {
        name: "k-at".to_string(),
        value: raw.to_string(),
        expected: "decimal".to_string(),
    })?;

    let plan = SweepPlan::from_config(config);
    let layer = plan.layer_at_height(z).ok_or_else(|| {
        let top = plan
            .final_height()
            .map_or_else(|| "out of range".to_string(), |height| height.to_string());
        Error::other(format!(
            "Z {} is outside the tower ({} layers, top at {})",
            z,
            plan.layer_count(),
            top
        ))
    })?;

    println!(
        "layer {} at Z{}: M900 K{}",
        layer.index,
        format_fixed(layer.z, config.precision),
        format_fixed(layer.k, config.precision)
    );
    Ok(())
}

fn print_report(report: &TowerReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| Error::other(format!("Failed to serialize report: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("height={}", report.height);
    if let Some(path) = &report.output {
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        match parse_args(std::iter::once("latower").chain(args.iter().copied())) {
            Invocation::Run(cli) => *cli,
            Invocation::Exit(code) => panic!("unexpected exit {code}"),
        }
    }

    fn exit_code(args: &[&str]) -> Option<i32> {
        match parse_args(std::iter::once("latower").chain(args.iter().copied())) {
            Invocation::Run(_) => None,
            Invocation::Exit(code) => Some(code),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_exits_zero() {
        assert_eq!(exit_code(&["--help"]), Some(0));
        assert_eq!(exit_code(&["/?"]), Some(0));
        assert_eq!(exit_code(&["--first", "0", "/?"]), Some(0));
    }

    #[test]
    fn test_argument_errors_exit_one() {
        assert_eq!(exit_code(&["--bogus"]), Some(EXIT_USAGE));
        assert_eq!(exit_code(&["--first"]), Some(EXIT_USAGE));
        assert_eq!(exit_code(&["--preset", "abs"]), Some(EXIT_USAGE));
    }

    #[test]
    fn test_bare_invocation() {
        assert!(parse(&[]).bare);
        assert!(!parse(&["-v"]).bare);
    }

    #[test]
    fn test_options_override_preset() {
        let cli = parse(&[
            "--preset",
            "tpu",
            "--first",
            "0.1",
            "--raft-height",
            "1.2",
            "--layer_height",
            "0.25",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.material, "TPU");
        assert_eq!(config.first, Decimal::new(1, 1));
        assert_eq!(config.raft_height, Decimal::new(12, 1));
        assert_eq!(config.layer_height, Decimal::new(25, 2));
        assert_eq!(config.last, Decimal::new(100, 2));
    }

    #[test]
    fn test_descending_sweep_accepts_negative_step() {
        let cli = parse(&["--first", "1", "--last", "0", "--step", "-0.1"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.step, Decimal::new(-1, 1));
    }

    #[test]
    fn test_malformed_decimal_is_config_error() {
        let cli = parse(&["--step", "abc"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_assignments_apply_in_order() {
        let cli = parse(&[
            "--set",
            "material=ABS",
            "--set",
            "after_raft=; raft done",
            "--set",
            "material=PETG",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.material, "PETG");
        assert_eq!(
            config.snippets.side(latower_core::Chunk::Raft, latower_settings::SnippetSide::After),
            Some("; raft done")
        );
    }

    #[test]
    fn test_zero_step_rejected() {
        let cli = parse(&["--step", "0"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ZeroStep)));
    }

    #[test]
    fn test_output_path_prefers_explicit_file() {
        let cli = parse(&["-o", "tower.gcode"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(cli.output_path(&config), PathBuf::from("tower.gcode"));

        let cli = parse(&["--output-dir", "out"]);
        let config = cli.resolve_config().unwrap();
        assert!(cli.output_path(&config).starts_with("out"));
    }

    fn write_profile(data_dir: &Path, material: &str) {
        let dir = data_dir.join(material);
        std::fs::create_dir_all(&dir).unwrap();
        for name in [
            "prep",
            "start",
            "before_raft",
            "before_meshes",
            "after_meshes",
            "end",
            "post",
        ] {
            std::fs::write(dir.join(format!("{name}.gcode")), format!("; {name}\n")).unwrap();
        }
        std::fs::write(dir.join("raft.gcode"), "G1 X10 Y10 E3.5\n").unwrap();
        std::fs::write(
            dir.join("square.gcode"),
            "G1 X40 Y28.76 E4.5\nG1 X40 Y40 E5.0\n",
        )
        .unwrap();
    }

    fn path_arg(path: &Path) -> String {
        path.display().to_string()
    }

    #[test]
    fn test_generates_named_output() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_profile(data.path(), "PLA");
        let (data_dir, out_dir) = (path_arg(data.path()), path_arg(out.path()));

        let cli = parse(&[
            "--data-dir",
            &data_dir,
            "--output-dir",
            &out_dir,
            "--first",
            "0",
            "--last",
            "0.4",
            "--step",
            "0.2",
            "--precision",
            "2",
        ]);
        assert_eq!(run(&cli), 0);

        let path = out.path().join(
            "tower20x20 +0.94raft+0.00gap lh=0.20 linewidth=.48 (LA K=0.00to0.40 step=0.20).gcode",
        );
        let gcode = std::fs::read_to_string(path).unwrap();
        assert!(gcode.starts_with("; prep\n"));
        assert!(gcode.contains("M900 K0.00\n"));
        assert!(gcode.contains("M900 K0.20\n"));
        assert!(gcode.contains("G1 X40 Y28.76 E4.50\n"));
        assert!(gcode.contains("G1 X40 Y40 E6.00\n"));
        assert!(gcode.ends_with("; post\n"));
    }

    #[test]
    fn test_missing_profile_exits_two() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let (data_dir, out_dir) = (path_arg(data.path()), path_arg(out.path()));

        let cli = parse(&[
            "--data-dir",
            &data_dir,
            "--output-dir",
            &out_dir,
            "--material",
            "PETG",
        ]);
        assert_eq!(run(&cli), 2);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_bad_value_exits_one_before_io() {
        let out = TempDir::new().unwrap();
        let out_dir = path_arg(out.path());

        let cli = parse(&["--output-dir", &out_dir, "--layer_height", "thin"]);
        assert_eq!(run(&cli), 1);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_explicit_output_file() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_profile(data.path(), "TPU");
        let data_dir = path_arg(data.path());
        let target = out.path().join("nested").join("tpu.gcode");
        let target_arg = path_arg(&target);

        let cli = parse(&[
            "--preset",
            "tpu",
            "--data-dir",
            &data_dir,
            "-o",
            &target_arg,
        ]);
        execute(&cli).unwrap();
        let gcode = std::fs::read_to_string(&target).unwrap();
        assert_eq!(gcode.matches("M900").count(), 20);
    }

    #[test]
    fn test_saved_config_reloads() {
        let data = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        write_profile(data.path(), "PLA");
        let data_dir = path_arg(data.path());
        let saved = dir.path().join("tower.toml");
        let saved_arg = path_arg(&saved);
        let output = path_arg(&dir.path().join("tower.gcode"));

        let first = parse(&[
            "--data-dir",
            &data_dir,
            "--step",
            "0.1",
            "--save-config",
            &saved_arg,
            "-o",
            &output,
        ]);
        execute(&first).unwrap();

        let reloaded = TowerConfig::load_from_file(&saved).unwrap();
        assert_eq!(reloaded, first.resolve_config().unwrap());

        let second = parse(&["--config", &saved_arg]);
        assert_eq!(second.resolve_config().unwrap(), reloaded);
    }

    #[test]
    fn test_k_at_height() {
        execute(&parse(&["--k-at", "3.15"])).unwrap();

        let err = execute(&parse(&["--k-at", "0.5"])).unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let err = execute(&parse(&["--k-at", "high"])).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_tiny_step_is_rejected_not_panicking() {
        let cli = parse(&[
            "--first",
            "0",
            "--last",
            "100",
            "--step",
            "0.0000000000000000000000000001",
            "--k-at",
            "1.2",
        ]);
        let err = execute(&cli).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::SweepTooLong { .. })));
        assert_eq!(run(&cli), 1);
    }

    #[test]
    fn test_list_commands() {
        execute(&parse(&["--list-presets"])).unwrap();
        execute(&parse(&["--list-options"])).unwrap();
    }

    #[test]
    fn test_preset_and_config_conflict() {
        assert_eq!(
            exit_code(&["--preset", "pla", "--config", "a.toml"]),
            Some(EXIT_USAGE)
        );
    }
}
