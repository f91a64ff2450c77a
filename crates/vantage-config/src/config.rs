//! Configuration structs with tuned defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vantage_input::{Binding, MouseButtonBinding};
use winit::keyboard::KeyCode;

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Pick-up / hold / throw tuning.
    pub pickup: PickupConfig,
    /// First-person look, locomotion, and camera effects.
    pub controller: ControllerConfig,
    /// Key and mouse bindings for both controllers.
    pub input: InputConfig,
    /// Named collision layers.
    pub layers: LayerConfig,
    /// Logging and debug drawing.
    pub debug: DebugConfig,
}

/// How a held object tracks the hold anchor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HoldMode {
    /// Parented to the anchor and snapped to it every physics step.
    Rigid,
    /// Unparented kinematic body driven toward the anchor every physics step.
    /// With `smooth`, motion goes through a speed-capped critically-damped spring.
    Follow {
        /// Use the spring instead of jumping straight to the anchor.
        smooth: bool,
    },
}

/// Whether geometry queries report trigger (sensor) volumes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TriggerInteraction {
    /// Sensors are invisible to queries.
    #[default]
    Ignore,
    /// Sensors block queries like solid colliders.
    Collide,
}

/// Pick-up controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PickupConfig {
    /// Tag an object must carry to be picked up.
    pub pickable_tag: String,
    /// Layer bitmask the pickup ray and placement casts can hit.
    pub interactable_mask: u32,
    /// Maximum pickup distance in meters.
    pub pick_up_range: f32,
    /// Name of the collision layer a held object moves to.
    pub hold_layer: String,
    /// Impulse magnitude applied along the view direction on throw (N·s).
    pub throw_force: f32,
    /// Approximate time in seconds for the held object to reach the anchor.
    pub follow_smooth_time: f32,
    /// Speed cap in m/s for the follow spring.
    pub max_follow_speed: f32,
    /// Rigid parenting or follow driving.
    pub hold_mode: HoldMode,
    /// Degrees of held-object rotation per pixel of pointer motion.
    pub rotation_sensitivity: f32,
    /// Invert the vertical rotation axis.
    pub invert_y: bool,
    /// Pull the object back out of walls between the eye and the anchor on release.
    pub prevent_clipping: bool,
    /// Rest a dropped object on the surface beneath it.
    pub snap_to_surface: bool,
    /// Length of the downward surface-snap ray in meters.
    pub snap_cast_distance: f32,
    /// Height added above the snapped surface in meters.
    pub snap_offset_y: f32,
    /// Trigger policy for every pickup query.
    pub trigger_interaction: TriggerInteraction,
    /// Hold anchor position relative to the ray origin, used when no anchor is supplied.
    pub hold_offset: [f32; 3],
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            pickable_tag: "canPickUp".to_string(),
            interactable_mask: u32::MAX,
            pick_up_range: 5.0,
            hold_layer: "holdLayer".to_string(),
            throw_force: 8.0,
            follow_smooth_time: 0.06,
            max_follow_speed: 10.0,
            hold_mode: HoldMode::Follow { smooth: true },
            rotation_sensitivity: 0.1,
            invert_y: false,
            prevent_clipping: true,
            snap_to_surface: true,
            snap_cast_distance: 2.0,
            snap_offset_y: 0.02,
            trigger_interaction: TriggerInteraction::Ignore,
            hold_offset: [0.0, -0.05, -1.0],
        }
    }
}

/// First-person controller tuning. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Walking speed in m/s.
    pub walk_speed: f32,
    /// Running speed in m/s.
    pub run_speed: f32,
    /// Whether the run key has any effect.
    pub allow_run: bool,
    /// Vertical acceleration in m/s² (negative is down).
    pub gravity: f32,
    /// Vertical velocity assigned while grounded, keeps the capsule pressed to slopes.
    pub ground_stick: f32,
    /// Degrees of look rotation per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    /// Smoothing rate for displayed yaw/pitch.
    pub look_smooth: f32,
    /// Lowest pitch (looking down).
    pub min_pitch: f32,
    /// Highest pitch (looking up).
    pub max_pitch: f32,
    /// Camera roll per unit of strafe input.
    pub strafe_lean_deg: f32,
    /// Smoothing rate for roll.
    pub lean_smooth: f32,
    /// Bob cycles per meter travelled.
    pub bob_frequency: f32,
    /// Horizontal bob amplitude in meters.
    pub bob_horizontal_amplitude: f32,
    /// Vertical bob amplitude in meters.
    pub bob_vertical_amplitude: f32,
    /// Smoothing rate for the bob offset and phase decay.
    pub bob_smooth: f32,
    /// Resting camera noise frequency gain.
    pub noise_frequency: f32,
    /// Resting camera noise amplitude gain.
    pub noise_amplitude: f32,
    /// Running camera noise amplitude gain.
    pub run_noise_amplitude: f32,
    /// Running camera noise frequency gain.
    pub run_noise_frequency: f32,
    /// Smoothing rate between resting and running noise.
    pub noise_blend: f32,
    /// Lateral camera shift at full strafe input, in meters.
    pub strafe_shift: f32,
    /// Smoothing rate for the strafe blend.
    pub strafe_shift_smooth: f32,
    /// Camera yaw at full strafe input.
    pub strafe_yaw_deg: f32,
    /// Lateral camera shift at full peek, in meters.
    pub peek_shift: f32,
    /// Camera roll at full peek.
    pub peek_roll_deg: f32,
    /// Camera yaw at full peek.
    pub peek_yaw_deg: f32,
    /// Smoothing rate for the peek blend.
    pub peek_smooth: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.2,
            run_speed: 3.6,
            allow_run: true,
            gravity: -19.62,
            ground_stick: -2.0,
            mouse_sensitivity: 0.12,
            look_smooth: 12.0,
            min_pitch: -75.0,
            max_pitch: 75.0,
            strafe_lean_deg: 3.0,
            lean_smooth: 8.0,
            bob_frequency: 1.7,
            bob_horizontal_amplitude: 0.03,
            bob_vertical_amplitude: 0.02,
            bob_smooth: 10.0,
            noise_frequency: 0.8,
            noise_amplitude: 0.3,
            run_noise_amplitude: 0.6,
            run_noise_frequency: 1.0,
            noise_blend: 10.0,
            strafe_shift: 0.08,
            strafe_shift_smooth: 10.0,
            strafe_yaw_deg: 2.0,
            peek_shift: 0.18,
            peek_roll_deg: 6.0,
            peek_yaw_deg: 2.0,
            peek_smooth: 12.0,
        }
    }
}

/// Bindings for every controller action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Pick up, or drop when holding.
    pub pick: Binding,
    /// Hold to rotate the held object (also suppresses look and movement).
    pub rotate: Binding,
    /// Throw the held object.
    pub throw: Binding,
    /// Move forward.
    pub forward: Binding,
    /// Move backward.
    pub back: Binding,
    /// Strafe left.
    pub left: Binding,
    /// Strafe right.
    pub right: Binding,
    /// Run modifier.
    pub run: Binding,
    /// Peek left.
    pub peek_left: Binding,
    /// Peek right.
    pub peek_right: Binding,
    /// Release the cursor lock.
    pub unlock_cursor: Binding,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pick: Binding::Key(KeyCode::KeyE),
            rotate: Binding::Key(KeyCode::KeyR),
            throw: Binding::Mouse(MouseButtonBinding::Left),
            forward: Binding::Key(KeyCode::KeyW),
            back: Binding::Key(KeyCode::KeyS),
            left: Binding::Key(KeyCode::KeyA),
            right: Binding::Key(KeyCode::KeyD),
            run: Binding::Key(KeyCode::ShiftLeft),
            peek_left: Binding::Key(KeyCode::KeyQ),
            peek_right: Binding::Key(KeyCode::KeyE),
            unlock_cursor: Binding::Key(KeyCode::Escape),
        }
    }
}

/// Collision layer names; the index in `names` is the layer number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    /// Up to 32 names.
    pub names: Vec<String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        let names = [
            "Default",
            "TransparentFX",
            "IgnoreRaycast",
            "Player",
            "Water",
            "UI",
            "holdLayer",
        ];
        Self {
            names: names.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Emit pickup ray and hold anchor gizmos into the debug line buffer.
    pub draw_gizmos: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            draw_gizmos: false,
        }
    }
}

/// Platform config directory for Vantage, e.g. `~/.config/vantage`.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vantage")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the controllers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controller;
        if c.min_pitch > c.max_pitch {
            return Err(ConfigError::InvalidValue {
                field: "controller.min_pitch",
                reason: format!("{} is above max_pitch {}", c.min_pitch, c.max_pitch),
            });
        }
        let p = &self.pickup;
        if p.pick_up_range <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pickup.pick_up_range",
                reason: format!("must be positive, got {}", p.pick_up_range),
            });
        }
        if p.follow_smooth_time <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pickup.follow_smooth_time",
                reason: format!("must be positive, got {}", p.follow_smooth_time),
            });
        }
        if self.layers.names.len() > 32 {
            return Err(ConfigError::InvalidValue {
                field: "layers.names",
                reason: format!("at most 32 layers, got {}", self.layers.names.len()),
            });
        }
        Ok(())
    }
}
