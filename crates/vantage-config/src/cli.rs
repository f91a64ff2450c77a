//! Command-line argument parsing for the Vantage sandbox.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, HoldMode};

/// Vantage sandbox command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "vantage", about = "Headless first-person interaction sandbox")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Parent held objects to the hold anchor instead of driving them.
    #[arg(long)]
    pub rigid_hold: bool,

    /// Throw impulse magnitude.
    #[arg(long)]
    pub throw_force: Option<f32>,

    /// Emit debug gizmo lines.
    #[arg(long)]
    pub gizmos: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if args.rigid_hold {
            self.pickup.hold_mode = HoldMode::Rigid;
        }
        if let Some(force) = args.throw_force {
            self.pickup.throw_force = force;
        }
        if args.gizmos {
            self.debug.draw_gizmos = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from(["vantage", "--rigid-hold", "--throw-force", "3.5"]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.pickup.hold_mode, HoldMode::Rigid);
        assert_eq!(config.pickup.throw_force, 3.5);
        // Non-overridden fields retain defaults
        assert_eq!(config.debug.log_level, "info");
        assert_eq!(args.frames, 600);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs::parse_from(["vantage"]);
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_log_level_and_frames() {
        let args = CliArgs::parse_from(["vantage", "--log-level", "debug", "--frames", "30"]);
        let mut config = Config::default();
        config.apply_cli_overrides(&args);
        assert_eq!(config.debug.log_level, "debug");
        assert_eq!(args.frames, 30);
    }
}
