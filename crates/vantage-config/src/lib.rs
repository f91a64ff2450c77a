//! Designer-tunable configuration for the Vantage controllers.
//!
//! Settings persist to disk as `config.ron`, accept CLI overrides via clap, and
//! tolerate missing or unknown fields so old files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, ControllerConfig, DebugConfig, HoldMode, InputConfig, LayerConfig, PickupConfig,
    TriggerInteraction, default_config_dir,
};
pub use error::ConfigError;
