//! First-person controller: mouse look, walk/run locomotion on a kinematic
//! capsule, and camera feel (head bob, strafe lean, peek, run shake).
//!
//! Every stage runs each frame in order: look, move, camera effects, noise.
//! Holding the look-suppress binding skips look and move only. All filters
//! use [`damp`], so results do not depend on frame rate.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use glam::{Quat, Vec2, Vec3};
use tracing::{debug, trace};
use vantage_config::{Config, ControllerConfig, InputConfig};
use vantage_input::{Binding, InputState};
use vantage_math::{damp, damp_vec3};
use vantage_physics::{CharacterBody, ObjectId, PhysicsWorld, Scene};

use crate::camera_rig::{CameraRig, NoiseGains};

/// Horizontal speed below which the head bob relaxes instead of advancing (m/s).
const BOB_MIN_SPEED: f32 = 0.05;

/// Bindings the controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerBindings {
    /// Move forward.
    pub forward: Binding,
    /// Move backward.
    pub back: Binding,
    /// Strafe left.
    pub left: Binding,
    /// Strafe right.
    pub right: Binding,
    /// Hold to run instead of walk.
    pub run: Binding,
    /// Hold to lean the camera left.
    pub peek_left: Binding,
    /// Hold to lean the camera right.
    pub peek_right: Binding,
    /// While held, look and movement are frozen (shared with held-object rotation).
    pub look_suppress: Binding,
    /// Releases the cursor.
    pub unlock_cursor: Binding,
}

impl From<&InputConfig> for PlayerBindings {
    fn from(input: &InputConfig) -> Self {
        Self {
            forward: input.forward,
            back: input.back,
            left: input.left,
            right: input.right,
            run: input.run,
            peek_left: input.peek_left,
            peek_right: input.peek_right,
            look_suppress: input.rotate,
            unlock_cursor: input.unlock_cursor,
        }
    }
}

/// Scene objects the controller drives besides its own body.
#[derive(Debug, Clone, Copy)]
pub struct FirstPersonDeps {
    /// Head node; a child of the player body. Receives the pitch.
    pub camera_root: ObjectId,
    /// Resting camera offset from the root.
    pub camera_offset: Vec3,
}

/// Rotation for a heading in degrees. Positive turns right.
fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_y(-degrees.to_radians())
}

/// Rotation for a pitch in degrees. Positive looks up.
fn pitch_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_x(degrees.to_radians())
}

/// Look, move, and camera effects for one player.
#[derive(Resource)]
pub struct FirstPersonController {
    config: ControllerConfig,
    bindings: PlayerBindings,
    body: CharacterBody,
    camera_root: ObjectId,
    rig: CameraRig,
    cursor_locked: bool,

    yaw: f32,
    pitch: f32,
    smoothed_yaw: f32,
    smoothed_pitch: f32,

    vertical_velocity: f32,
    moving: bool,
    running: bool,

    bob_phase: f32,
    bob_offset: Vec3,
    strafe_blend: f32,
    peek: f32,
    roll: f32,
}

impl FirstPersonController {
    /// Takes ownership of the character body and locks the cursor.
    pub fn new(config: &Config, body: CharacterBody, deps: FirstPersonDeps) -> Self {
        let controller = config.controller.clone();
        let rig = CameraRig::new(
            deps.camera_offset,
            NoiseGains {
                amplitude: controller.noise_amplitude,
                frequency: controller.noise_frequency,
            },
        );
        debug!(camera_offset = ?deps.camera_offset, "first-person controller ready, cursor locked");

        Self {
            config: controller,
            bindings: PlayerBindings::from(&config.input),
            body,
            camera_root: deps.camera_root,
            rig,
            cursor_locked: true,
            yaw: 0.0,
            pitch: 0.0,
            smoothed_yaw: 0.0,
            smoothed_pitch: 0.0,
            vertical_velocity: 0.0,
            moving: false,
            running: false,
            bob_phase: 0.0,
            bob_offset: Vec3::ZERO,
            strafe_blend: 0.0,
            peek: 0.0,
            roll: 0.0,
        }
    }

    /// Runs one frame.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputState,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
    ) {
        if self.cursor_locked && input.just_pressed(self.bindings.unlock_cursor) {
            self.cursor_locked = false;
            debug!("cursor unlocked");
        }

        if !input.held(self.bindings.look_suppress) {
            self.look_update(dt, input, physics, scene);
            self.move_update(dt, input, physics);
        }
        self.camera_effects_update(dt, input, scene);
        self.noise_update(dt, input);

        trace!(
            yaw = self.smoothed_yaw,
            pitch = self.smoothed_pitch,
            bob_phase = self.bob_phase,
            roll = self.roll,
            "first-person frame"
        );
    }

    /// Accumulates yaw and clamped pitch from the pointer, smooths both, and
    /// applies yaw to the body and pitch to the camera root.
    pub fn look_update(
        &mut self,
        dt: f32,
        input: &InputState,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
    ) {
        let delta = input.pointer_delta();
        let sens = self.config.mouse_sensitivity;

        self.yaw += delta.x * sens;
        // A misordered range must not panic.
        self.pitch = (self.pitch - delta.y * sens)
            .max(self.config.min_pitch)
            .min(self.config.max_pitch);

        self.smoothed_yaw = damp(self.smoothed_yaw, self.yaw, self.config.look_smooth, dt);
        self.smoothed_pitch = damp(self.smoothed_pitch, self.pitch, self.config.look_smooth, dt);

        self.body.set_heading(physics, yaw_rotation(self.smoothed_yaw));
        self.set_root_rotation(scene, pitch_rotation(self.smoothed_pitch));
    }

    /// Walks or runs along the body's axes, then applies gravity, as two
    /// separate collide-and-slide moves.
    pub fn move_update(&mut self, dt: f32, input: &InputState, physics: &mut PhysicsWorld) {
        let b = self.bindings;
        let wish = Vec2::new(
            input.axis_raw(b.left, b.right),
            input.axis_raw(b.back, b.forward),
        )
        .clamp_length_max(1.0);
        self.moving = wish != Vec2::ZERO;

        let speed = if self.config.allow_run && input.held(b.run) {
            self.config.run_speed
        } else {
            self.config.walk_speed
        };
        let heading = self.body.heading(physics);
        let direction = heading * Vec3::X * wish.x + heading * Vec3::NEG_Z * wish.y;
        let horizontal = direction * speed;

        if self.body.is_grounded() && self.vertical_velocity < 0.0 {
            self.vertical_velocity = self.config.ground_stick;
        }
        self.vertical_velocity += self.config.gravity * dt;

        self.body.begin_frame();
        self.body.move_by(physics, horizontal * dt, dt);
        self.body
            .move_by(physics, Vec3::Y * self.vertical_velocity * dt, dt);
        self.body.finish_frame(dt);
    }

    /// Head bob, strafe shift and lean, peek, and the camera-root rotation.
    pub fn camera_effects_update(&mut self, dt: f32, input: &InputState, scene: &mut Scene) {
        let c = &self.config;
        let b = self.bindings;

        let velocity = self.body.velocity();
        let horizontal_speed = Vec2::new(velocity.x, velocity.z).length();
        if self.body.is_grounded() && horizontal_speed > BOB_MIN_SPEED {
            self.bob_phase += horizontal_speed * c.bob_frequency * dt;
        } else {
            self.bob_phase = damp(self.bob_phase, 0.0, c.bob_smooth, dt);
        }
        let angle = self.bob_phase * TAU;
        let target_bob = Vec3::new(
            angle.sin() * c.bob_horizontal_amplitude,
            angle.cos().abs() * c.bob_vertical_amplitude,
            0.0,
        );
        self.bob_offset = damp_vec3(self.bob_offset, target_bob, c.bob_smooth, dt);

        let input_x = input.axis_raw(b.left, b.right);
        self.strafe_blend = damp(self.strafe_blend, input_x, c.strafe_shift_smooth, dt);
        let strafe_offset = Vec3::X * (self.strafe_blend * c.strafe_shift);

        let peek_target = input.axis_raw(b.peek_left, b.peek_right);
        self.peek = damp(self.peek, peek_target, c.peek_smooth, dt);
        let peek_offset = Vec3::X * (self.peek * c.peek_shift);

        self.rig.offset = self.rig.default_offset + self.bob_offset + strafe_offset + peek_offset;

        let target_roll = -input_x * c.strafe_lean_deg + self.peek * c.peek_roll_deg;
        self.roll = damp(self.roll, target_roll, c.lean_smooth, dt);
        self.rig.dutch_degrees = self.roll;

        // Rebuilt from the look pitch every frame; effect yaw never accumulates.
        let extra_yaw = self.strafe_blend * c.strafe_yaw_deg + self.peek * c.peek_yaw_deg;
        let root = pitch_rotation(self.smoothed_pitch) * yaw_rotation(extra_yaw);
        self.rig.root_rotation = root;
        self.set_root_rotation(scene, root);
    }

    /// Blends shake gains toward the running or resting pair.
    pub fn noise_update(&mut self, dt: f32, input: &InputState) {
        let c = &self.config;
        self.running = c.allow_run && input.held(self.bindings.run) && self.moving;
        let (amplitude, frequency) = if self.running {
            (c.run_noise_amplitude, c.run_noise_frequency)
        } else {
            (c.noise_amplitude, c.noise_frequency)
        };
        let noise = &mut self.rig.noise;
        noise.amplitude = damp(noise.amplitude, amplitude, c.noise_blend, dt);
        noise.frequency = damp(noise.frequency, frequency, c.noise_blend, dt);
    }

    fn set_root_rotation(&self, scene: &mut Scene, rotation: Quat) {
        if let Some(mut local) = scene.local(self.camera_root) {
            local.rotation = rotation;
            scene.set_local(self.camera_root, local);
        }
    }

    /// Target yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Target pitch in degrees, always within the configured range.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Heading the body actually faces, eased toward [`yaw`](Self::yaw).
    pub fn smoothed_yaw(&self) -> f32 {
        self.smoothed_yaw
    }

    /// Pitch the camera root actually shows, eased toward [`pitch`](Self::pitch).
    pub fn smoothed_pitch(&self) -> f32 {
        self.smoothed_pitch
    }

    /// Head-bob phase in cycles; advances with horizontal speed.
    pub fn bob_phase(&self) -> f32 {
        self.bob_phase
    }

    /// Current head-bob displacement added to the camera offset.
    pub fn bob_offset(&self) -> Vec3 {
        self.bob_offset
    }

    /// Smoothed lateral input, −1 to 1.
    pub fn strafe_blend(&self) -> f32 {
        self.strafe_blend
    }

    /// Smoothed peek, −1 (left) to 1 (right).
    pub fn peek(&self) -> f32 {
        self.peek
    }

    /// Smoothed lens roll in degrees.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Whether any move key was held last update.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the last update moved at run speed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Vertical speed in m/s from gravity and ground stick.
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Camera parameters produced by the last update.
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Whether the cursor is captured for look input.
    pub fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// The character body this controller moves.
    pub fn body(&self) -> &CharacterBody {
        &self.body
    }

    /// Head node the pitch is applied to.
    pub fn camera_root(&self) -> ObjectId {
        self.camera_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_math::Transform;
    use vantage_physics::{Layer, ObjectDesc, ShapeDesc};
    use winit::keyboard::KeyCode;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        physics: PhysicsWorld,
        scene: Scene,
        input: InputState,
        controller: FirstPersonController,
    }

    impl Rig {
        fn new(config: Config) -> Self {
            let mut physics = PhysicsWorld::new();
            let mut scene = Scene::new();
            scene.spawn_static(
                &mut physics,
                ObjectDesc::new(
                    "floor",
                    ShapeDesc::Cuboid {
                        half_extents: Vec3::new(50.0, 0.5, 50.0),
                    },
                )
                .at(Vec3::new(0.0, -0.5, 0.0)),
            );
            physics.step();

            let body = CharacterBody::spawn(&mut physics, Vec3::new(0.0, 0.95, 0.0), Layer::DEFAULT);
            let player = scene.register_body("Player", body.body, Some(body.collider));
            let camera_root = scene.spawn_node(
                "CameraRoot",
                Some(player),
                Transform::from_translation(Vec3::new(0.0, 0.7, 0.0)),
            );
            let controller = FirstPersonController::new(
                &config,
                body,
                FirstPersonDeps {
                    camera_root,
                    camera_offset: Vec3::ZERO,
                },
            );
            Self {
                physics,
                scene,
                input: InputState::new(),
                controller,
            }
        }

        fn frames(&mut self, n: usize) {
            for _ in 0..n {
                self.controller
                    .update(DT, &self.input, &mut self.physics, &mut self.scene);
                self.input.clear_transients();
            }
        }

        fn position(&self) -> Vec3 {
            self.controller.body().position(&self.physics)
        }

        fn camera_world(&self) -> Transform {
            self.scene
                .world_transform(&self.physics, self.controller.camera_root())
                .unwrap()
        }
    }

    fn rig() -> Rig {
        Rig::new(Config::default())
    }

    #[test]
    fn test_pitch_clamped_for_extreme_deltas() {
        let mut rig = rig();
        let c = ControllerConfig::default();

        rig.input.mouse.add_delta(0.0, -1.0e6);
        rig.frames(1);
        assert_eq!(rig.controller.pitch(), c.max_pitch);

        rig.input.mouse.add_delta(0.0, 1.0e6);
        rig.frames(1);
        assert_eq!(rig.controller.pitch(), c.min_pitch);

        for i in 0..200 {
            let dy = if i % 3 == 0 { 4000.0 } else { -2500.0 };
            rig.input.mouse.add_delta(37.0, dy);
            rig.frames(1);
            let p = rig.controller.pitch();
            assert!((c.min_pitch..=c.max_pitch).contains(&p), "pitch {p}");
            let sp = rig.controller.smoothed_pitch();
            assert!((c.min_pitch..=c.max_pitch).contains(&sp), "smoothed {sp}");
        }
    }

    #[test]
    fn test_mouse_up_looks_up_and_right_turns_right() {
        let mut rig = rig();
        rig.input.mouse.add_delta(100.0, -100.0);
        rig.frames(1);
        rig.frames(120);

        assert!((rig.controller.yaw() - 12.0).abs() < 1e-4);
        assert!((rig.controller.smoothed_yaw() - 12.0).abs() < 1e-3);
        let forward = rig.camera_world().forward();
        assert!(forward.x > 0.1, "heading should turn right, forward={forward}");
        assert!(forward.y > 0.1, "camera should look up, forward={forward}");
    }

    #[test]
    fn test_look_smoothing_lags_then_converges() {
        let mut rig = rig();
        rig.input.mouse.add_delta(100.0, 0.0);
        rig.frames(1);
        let first = rig.controller.smoothed_yaw();
        assert!(first > 0.0 && first < 12.0);

        rig.frames(300);
        let settled = rig.controller.smoothed_yaw();
        rig.frames(10);
        assert!((rig.controller.smoothed_yaw() - settled).abs() < 1e-6);
    }

    #[test]
    fn test_walk_forward_follows_heading() {
        let mut rig = rig();
        rig.frames(30);
        let start = rig.position();

        rig.input.keyboard.press(KeyCode::KeyW);
        rig.frames(60);

        let moved = rig.position() - start;
        assert!(rig.controller.is_moving());
        assert!(rig.controller.body().is_grounded());
        assert!(moved.z < -1.8 && moved.z > -2.4, "moved {moved}");
        assert!(moved.x.abs() < 1e-3);
    }

    #[test]
    fn test_run_key_speeds_up_only_when_allowed() {
        let distance = |allow_run: bool| {
            let mut config = Config::default();
            config.controller.allow_run = allow_run;
            let mut rig = Rig::new(config);
            rig.frames(30);
            let start = rig.position();
            rig.input.keyboard.press(KeyCode::KeyW);
            rig.input.keyboard.press(KeyCode::ShiftLeft);
            rig.frames(60);
            (rig.position() - start).length()
        };
        let run = distance(true);
        let walk = distance(false);
        assert!(run > 3.0, "run {run}");
        assert!(walk < 2.4, "walk {walk}");
    }

    #[test]
    fn test_diagonal_input_is_not_faster() {
        let mut rig = rig();
        rig.frames(30);
        let start = rig.position();
        rig.input.keyboard.press(KeyCode::KeyW);
        rig.input.keyboard.press(KeyCode::KeyD);
        rig.frames(60);
        let moved = rig.position() - start;
        let horizontal = Vec2::new(moved.x, moved.z).length();
        assert!(horizontal < 2.4, "diagonal moved {horizontal}");
    }

    #[test]
    fn test_character_settles_on_floor() {
        let mut rig = rig();
        rig.frames(60);
        assert!(rig.controller.body().is_grounded());
        let v = rig.controller.vertical_velocity();
        let c = ControllerConfig::default();
        assert!((v - (c.ground_stick + c.gravity * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_suppress_key_freezes_look_and_move_but_not_effects() {
        let mut rig = rig();
        rig.frames(30);
        let start = rig.position();

        rig.input.keyboard.press(KeyCode::KeyR);
        rig.input.keyboard.press(KeyCode::KeyW);
        rig.input.keyboard.press(KeyCode::KeyA);
        rig.input.mouse.add_delta(200.0, 50.0);
        rig.frames(30);

        assert_eq!(rig.controller.yaw(), 0.0);
        assert_eq!(rig.controller.pitch(), 0.0);
        assert!(rig.position().distance(start) < 1e-4);
        assert!(rig.controller.strafe_blend() < -0.9);
        assert!(rig.controller.roll() > 2.0);
    }

    #[test]
    fn test_bob_phase_zero_when_never_moving() {
        let mut rig = rig();
        rig.frames(240);
        assert_eq!(rig.controller.bob_phase(), 0.0);
    }

    #[test]
    fn test_bob_phase_decays_after_stopping() {
        let mut rig = rig();
        rig.frames(30);
        rig.input.keyboard.press(KeyCode::KeyW);
        rig.frames(60);
        assert!(rig.controller.bob_phase() > 1.0);

        rig.input.keyboard.release(KeyCode::KeyW);
        rig.frames(120);
        assert!(rig.controller.bob_phase().abs() < 1e-3);
    }

    #[test]
    fn test_peek_right_shifts_rolls_and_yaws() {
        let mut rig = rig();
        rig.input.keyboard.press(KeyCode::KeyE);
        rig.frames(180);

        let c = ControllerConfig::default();
        assert!((rig.controller.peek() - 1.0).abs() < 1e-3);
        let r = rig.controller.rig();
        assert!((r.offset.x - c.peek_shift).abs() < 1e-3);
        assert!((r.dutch_degrees - c.peek_roll_deg).abs() < 1e-2);
        let forward = r.root_rotation * Vec3::NEG_Z;
        assert!(forward.x > 0.0);
    }

    #[test]
    fn test_opposing_peek_keys_cancel() {
        let mut rig = rig();
        rig.input.keyboard.press(KeyCode::KeyQ);
        rig.input.keyboard.press(KeyCode::KeyE);
        rig.frames(60);
        assert_eq!(rig.controller.peek(), 0.0);
    }

    #[test]
    fn test_strafe_left_leans_right_and_shifts_left() {
        let mut rig = rig();
        rig.frames(30);
        rig.input.keyboard.press(KeyCode::KeyA);
        rig.frames(120);

        assert!((rig.controller.strafe_blend() + 1.0).abs() < 1e-3);
        assert!((rig.controller.roll() - 3.0).abs() < 1e-2);
        assert!(rig.controller.rig().offset.x < -0.04);
    }

    #[test]
    fn test_root_rotation_rebuilt_from_pitch_each_frame() {
        let mut rig = rig();
        rig.input.mouse.add_delta(0.0, -200.0);
        rig.frames(1);
        rig.frames(240);

        let expected = pitch_rotation(rig.controller.smoothed_pitch());
        let root = rig.controller.rig().root_rotation;
        assert!(root.abs_diff_eq(expected, 1e-4));
        let local = rig.scene.local(rig.controller.camera_root()).unwrap();
        assert!(local.rotation.abs_diff_eq(root, 1e-4));
        assert_eq!(local.translation, Vec3::new(0.0, 0.7, 0.0));
    }

    #[test]
    fn test_filters_hold_at_rest() {
        let mut rig = rig();
        rig.frames(120);
        let roll = rig.controller.roll();
        let strafe = rig.controller.strafe_blend();
        let yaw = rig.controller.smoothed_yaw();
        rig.frames(60);
        assert_eq!(rig.controller.roll(), roll);
        assert_eq!(rig.controller.strafe_blend(), strafe);
        assert_eq!(rig.controller.smoothed_yaw(), yaw);
    }

    #[test]
    fn test_running_raises_noise_gains() {
        let mut rig = rig();
        let c = ControllerConfig::default();
        assert_eq!(rig.controller.rig().noise.amplitude, c.noise_amplitude);

        rig.frames(30);
        rig.input.keyboard.press(KeyCode::KeyW);
        rig.input.keyboard.press(KeyCode::ShiftLeft);
        rig.frames(90);
        assert!(rig.controller.is_running());
        let noise = rig.controller.rig().noise;
        assert!((noise.amplitude - c.run_noise_amplitude).abs() < 1e-3);
        assert!((noise.frequency - c.run_noise_frequency).abs() < 1e-3);

        rig.input.keyboard.release(KeyCode::KeyW);
        rig.frames(90);
        assert!(!rig.controller.is_running());
        assert!((rig.controller.rig().noise.amplitude - c.noise_amplitude).abs() < 1e-3);
    }

    #[test]
    fn test_unlock_key_releases_cursor() {
        let mut rig = rig();
        assert!(rig.controller.cursor_locked());
        rig.input.keyboard.press(KeyCode::Escape);
        rig.frames(1);
        assert!(!rig.controller.cursor_locked());
    }
}
