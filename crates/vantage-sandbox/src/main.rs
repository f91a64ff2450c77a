//! Runs the demo walkthrough headless and logs where everything ended up.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p vantage-sandbox -- --frames 600 --gizmos`.

use clap::Parser;
use tracing::info;
use vantage_config::{CliArgs, Config, default_config_dir};
use vantage_sandbox::{InputScript, Sandbox};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    vantage_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        frames = args.frames,
        hold_mode = ?config.pickup.hold_mode,
        config = %config_dir.display(),
        "starting sandbox"
    );

    let mut sandbox = Sandbox::new(&config, InputScript::demo());
    sandbox.run(args.frames);
    sandbox.report();
}
