//! ECS world assembly and the systems that drive both controllers.

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::{info, trace};
use vantage_config::Config;
use vantage_input::InputState;
use vantage_math::Transform;
use vantage_interaction::{PickupController, PickupDeps};
use vantage_physics::{DebugLineBuffer, LayerRegistry, PhysicsWorld, Scene, physics_step_system};
use vantage_player::{FirstPersonController, FirstPersonDeps};

use crate::level::{self, Level};
use crate::schedule::{FixedSet, SandboxSchedules, Stage, UpdateSet};
use crate::script::InputScript;

/// Device state for the current frame.
#[derive(Resource, Debug, Default)]
pub struct Input(pub InputState);

/// Frame counter and timing.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FrameClock {
    /// Index of the frame being run.
    pub frame: u32,
    /// Seconds covered by this frame.
    pub delta: f32,
    /// Seconds since start.
    pub elapsed: f32,
}

/// World transform of the rendered camera: the camera root composed with the
/// rig's lens offset, dutch angle and shake.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CameraPose(pub Transform);

fn script_input_system(script: Res<InputScript>, clock: Res<FrameClock>, mut input: ResMut<Input>) {
    let fired = script.apply_frame(clock.frame, &mut input.0);
    if fired > 0 {
        trace!(frame = clock.frame, fired, "scripted input");
    }
}

fn clear_gizmos_system(mut lines: ResMut<DebugLineBuffer>) {
    lines.clear();
}

fn pickup_follow_system(
    mut pickup: ResMut<PickupController>,
    mut physics: ResMut<PhysicsWorld>,
    mut scene: ResMut<Scene>,
) {
    pickup.fixed_update(PhysicsWorld::FIXED_DT, &mut physics, &mut scene);
}

fn pickup_update_system(
    mut pickup: ResMut<PickupController>,
    input: Res<Input>,
    mut physics: ResMut<PhysicsWorld>,
    mut scene: ResMut<Scene>,
) {
    pickup.update(&input.0, &mut physics, &mut scene);
}

fn first_person_system(
    mut player: ResMut<FirstPersonController>,
    input: Res<Input>,
    clock: Res<FrameClock>,
    mut physics: ResMut<PhysicsWorld>,
    mut scene: ResMut<Scene>,
) {
    player.update(clock.delta, &input.0, &mut physics, &mut scene);
}

fn pickup_gizmo_system(
    pickup: Res<PickupController>,
    physics: Res<PhysicsWorld>,
    scene: Res<Scene>,
    mut lines: ResMut<DebugLineBuffer>,
) {
    pickup.debug_draw(&physics, &scene, &mut lines);
}

fn camera_pose_system(
    player: Res<FirstPersonController>,
    physics: Res<PhysicsWorld>,
    scene: Res<Scene>,
    clock: Res<FrameClock>,
    mut pose: ResMut<CameraPose>,
) {
    let Some(root) = scene.world_transform(&physics, player.camera_root()) else {
        return;
    };
    let rig = player.rig();
    let lens = Transform::new(rig.offset, rig.lens_rotation(clock.elapsed));
    pose.0 = root.mul_transform(&lens);
}

fn end_frame_system(mut input: ResMut<Input>, mut clock: ResMut<FrameClock>) {
    input.0.clear_transients();
    clock.frame += 1;
    clock.elapsed += clock.delta;
}

/// A world with the level, both controllers, and the frame schedule.
pub struct Sandbox {
    world: World,
    schedules: SandboxSchedules,
}

impl Sandbox {
    /// Builds the level and wires every system.
    pub fn new(config: &Config, script: InputScript) -> Self {
        let mut physics = PhysicsWorld::new();
        let mut scene = Scene::new();
        let layers = LayerRegistry::from_config(&config.layers);

        let (level, body) = level::build(
            &mut physics,
            &mut scene,
            &layers,
            &config.pickup.pickable_tag,
        );
        let pickup = PickupController::new(
            config,
            PickupDeps {
                ray_origin: level.camera_root,
                hold_anchor: None,
                player_collider: Some(body.collider),
            },
            &layers,
            &mut scene,
        );
        let player = FirstPersonController::new(
            config,
            body,
            FirstPersonDeps {
                camera_root: level.camera_root,
                camera_offset: Vec3::ZERO,
            },
        );

        let mut world = World::new();
        world.insert_resource(physics);
        world.insert_resource(scene);
        world.insert_resource(level);
        world.insert_resource(pickup);
        world.insert_resource(player);
        world.insert_resource(script);
        world.insert_resource(Input::default());
        world.insert_resource(FrameClock::default());
        world.insert_resource(DebugLineBuffer::default());
        world.insert_resource(CameraPose::default());

        let mut schedules = SandboxSchedules::new(f64::from(PhysicsWorld::FIXED_DT));
        schedules.add_systems(
            Stage::PreUpdate,
            (clear_gizmos_system, script_input_system),
        );
        schedules.add_systems(
            Stage::FixedUpdate,
            (
                pickup_follow_system.in_set(FixedSet::Interaction),
                physics_step_system.in_set(FixedSet::PhysicsStep),
            ),
        );
        schedules.add_systems(
            Stage::Update,
            (
                pickup_update_system.in_set(UpdateSet::Interaction),
                first_person_system.in_set(UpdateSet::Player),
            ),
        );
        schedules.add_systems(
            Stage::PostUpdate,
            (pickup_gizmo_system, camera_pose_system, end_frame_system).chain(),
        );

        info!(layers = config.layers.names.len(), "sandbox ready");
        Self { world, schedules }
    }

    /// Runs one frame of `dt` seconds.
    pub fn run_frame(&mut self, dt: f32) {
        self.world.resource_mut::<FrameClock>().delta = dt;
        self.schedules.run(&mut self.world, f64::from(dt));
    }

    /// Runs `frames` frames at the fixed rate.
    pub fn run(&mut self, frames: u32) {
        for _ in 0..frames {
            self.run_frame(PhysicsWorld::FIXED_DT);
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Logs where everything ended up.
    pub fn report(&self) {
        let physics = self.world.resource::<PhysicsWorld>();
        let scene = self.world.resource::<Scene>();
        let level = self.world.resource::<Level>();
        let pickup = self.world.resource::<PickupController>();
        let player = self.world.resource::<FirstPersonController>();
        let clock = self.world.resource::<FrameClock>();

        info!(
            frames = clock.frame,
            seconds = clock.elapsed,
            position = ?player.body().position(physics),
            yaw = player.smoothed_yaw(),
            pitch = player.smoothed_pitch(),
            cursor_locked = player.cursor_locked(),
            "player"
        );
        let camera = self.world.resource::<CameraPose>().0;
        info!(
            position = ?camera.translation,
            rotation = ?camera.rotation,
            shake = ?player.rig().noise.sample(clock.elapsed),
            "camera"
        );
        info!(
            holding = pickup.is_holding(),
            gizmo_lines = self.world.resource::<DebugLineBuffer>().len(),
            "pickup"
        );
        for &id in &level.crates {
            let Some(object) = scene.get(id) else {
                continue;
            };
            info!(
                name = %object.name,
                position = ?scene.world_transform(physics, id).map(|t| t.translation),
                kinematic = scene.is_kinematic(physics, id),
                "crate"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::InputAction;
    use winit::event::MouseButton;
    use winit::keyboard::KeyCode;

    fn holding(sandbox: &Sandbox) -> Option<vantage_physics::ObjectId> {
        sandbox
            .world()
            .resource::<PickupController>()
            .held()
            .map(|h| h.object)
    }

    fn crate0(sandbox: &Sandbox) -> vantage_physics::ObjectId {
        sandbox.world().resource::<Level>().crates[0]
    }

    #[test]
    fn test_pick_up_and_throw_near_crate() {
        let script = InputScript::new(vec![
            (10, InputAction::Pointer(0.0, 283.0)),
            (90, InputAction::KeyDown(KeyCode::KeyE)),
            (92, InputAction::KeyUp(KeyCode::KeyE)),
            (150, InputAction::MouseDown(MouseButton::Left)),
            (152, InputAction::MouseUp(MouseButton::Left)),
        ]);
        let mut sandbox = Sandbox::new(&Config::default(), script);

        sandbox.run(95);
        let target = crate0(&sandbox);
        assert_eq!(holding(&sandbox), Some(target));

        sandbox.run(50);
        let world = sandbox.world();
        let physics = world.resource::<PhysicsWorld>();
        let scene = world.resource::<Scene>();
        let pickup = world.resource::<PickupController>();
        let anchor = scene
            .world_transform(physics, pickup.hold_anchor())
            .unwrap()
            .translation;
        let held_at = scene.world_transform(physics, target).unwrap().translation;
        assert!(held_at.distance(anchor) < 0.05, "crate should ride the anchor");

        sandbox.run(10);
        let world = sandbox.world();
        assert!(holding(&sandbox).is_none());
        let physics = world.resource::<PhysicsWorld>();
        let scene = world.resource::<Scene>();
        assert!(!scene.is_kinematic(physics, target));
        let v = scene.linear_velocity(physics, target).unwrap();
        assert!(v.length() > 1.0, "thrown crate should be moving, v={v}");
    }

    #[test]
    fn test_gizmos_drawn_each_frame_when_enabled() {
        let mut config = Config::default();
        config.debug.draw_gizmos = true;
        let mut sandbox = Sandbox::new(&config, InputScript::default());
        sandbox.run(3);
        assert_eq!(sandbox.world().resource::<DebugLineBuffer>().len(), 49);
        assert_eq!(sandbox.world().resource::<FrameClock>().frame, 3);
    }

    #[test]
    fn test_camera_pose_applies_lens_shake() {
        let mut sandbox = Sandbox::new(&Config::default(), InputScript::default());
        sandbox.run(30);
        let world = sandbox.world();
        let physics = world.resource::<PhysicsWorld>();
        let scene = world.resource::<Scene>();
        let player = world.resource::<FirstPersonController>();
        let root = scene.world_transform(physics, player.camera_root()).unwrap();
        let pose = world.resource::<CameraPose>().0;

        // The pose is computed before the clock advances past frame 29.
        let lens = player.rig().lens_rotation(29.0 * PhysicsWorld::FIXED_DT);
        assert!(pose.rotation.abs_diff_eq(root.rotation * lens, 1e-4));
        assert!(pose.translation.distance(root.translation) < 1e-3);
        assert!(pose.rotation.angle_between(root.rotation) < 2f32.to_radians());
    }

    #[test]
    fn test_demo_script_runs_to_completion() {
        let script = InputScript::demo();
        let last = script.last_frame().unwrap_or(0);
        let mut sandbox = Sandbox::new(&Config::default(), script);
        let crates = sandbox.world().resource::<Level>().crates.clone();

        // Crate0 leaves the hand with speed after the throw at frame 170.
        sandbox.run(175);
        assert!(holding(&sandbox).is_none());
        {
            let world = sandbox.world();
            let physics = world.resource::<PhysicsWorld>();
            let scene = world.resource::<Scene>();
            assert!(!scene.is_kinematic(physics, crates[0]));
            let v = scene.linear_velocity(physics, crates[0]).unwrap();
            assert!(v.length() > 1.0, "Crate0 should be in flight, v={v}");
        }

        // Crate2 is picked at frame 290 and carried.
        sandbox.run(125);
        assert_eq!(holding(&sandbox), Some(crates[2]));

        sandbox.run(last + 60 - 300);
        let world = sandbox.world();
        assert!(holding(&sandbox).is_none());
        let physics = world.resource::<PhysicsWorld>();
        let scene = world.resource::<Scene>();
        for &id in &crates {
            assert!(!scene.is_kinematic(physics, id));
        }
        let rest = scene.world_transform(physics, crates[2]).unwrap().translation;
        assert!(rest.y > 0.0 && rest.y < 0.6, "Crate2 should rest on the floor, at {rest}");

        let player = world.resource::<FirstPersonController>();
        assert!(!player.cursor_locked());
        assert_eq!(world.resource::<FrameClock>().frame, last + 60);
    }
}
