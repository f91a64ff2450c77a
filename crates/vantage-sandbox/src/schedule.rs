//! Frame stages and the fixed-step runner.

use bevy_ecs::prelude::*;

/// Maximum number of fixed steps per frame to prevent spiral-of-death.
const MAX_FIXED_STEPS_PER_FRAME: u32 = 10;

/// Execution stages, run top to bottom every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Feed this frame's input events.
    PreUpdate,
    /// 60 Hz physics: held-object follow, then the world step.
    FixedUpdate,
    /// Frame-rate gameplay: pickup, then the first-person controller.
    Update,
    /// Gizmos and end-of-frame bookkeeping.
    PostUpdate,
}

impl Stage {
    const ALL: [Stage; 4] = [
        Stage::PreUpdate,
        Stage::FixedUpdate,
        Stage::Update,
        Stage::PostUpdate,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Ordering inside the fixed stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixedSet {
    /// Drive held objects toward their anchor.
    Interaction,
    /// Step the physics world.
    PhysicsStep,
}

/// Ordering inside the frame stage.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpdateSet {
    /// Pick up, rotate, drop, throw.
    Interaction,
    /// Look, move, camera effects, noise.
    Player,
}

/// One [`Schedule`] per [`Stage`], plus the fixed-step accumulator.
pub struct SandboxSchedules {
    schedules: [Schedule; 4],
    fixed_accumulator: f64,
    fixed_dt: f64,
    last_fixed_steps: u32,
}

impl SandboxSchedules {
    /// Creates empty stages with the set ordering applied.
    pub fn new(fixed_dt: f64) -> Self {
        let mut schedules = Stage::ALL.map(|_| Schedule::default());
        schedules[Stage::FixedUpdate.index()]
            .configure_sets(FixedSet::Interaction.before(FixedSet::PhysicsStep));
        schedules[Stage::Update.index()]
            .configure_sets(UpdateSet::Interaction.before(UpdateSet::Player));

        Self {
            schedules,
            fixed_accumulator: 0.0,
            fixed_dt,
            last_fixed_steps: 0,
        }
    }

    /// Registers systems in a stage.
    pub fn add_systems<M>(&mut self, stage: Stage, systems: impl IntoSystemConfigs<M>) {
        self.schedules[stage.index()].add_systems(systems);
    }

    /// Runs one frame. The fixed stage runs as many whole steps as the
    /// accumulated time allows, capped per frame.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) {
        self.run_stage(Stage::PreUpdate, world);

        self.fixed_accumulator += frame_dt;
        let mut steps = 0;
        while self.fixed_accumulator >= self.fixed_dt && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.run_stage(Stage::FixedUpdate, world);
            self.fixed_accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == MAX_FIXED_STEPS_PER_FRAME && self.fixed_accumulator >= self.fixed_dt {
            tracing::warn!(
                dropped = self.fixed_accumulator,
                "fixed step budget exhausted, dropping accumulated time"
            );
            self.fixed_accumulator = 0.0;
        }
        self.last_fixed_steps = steps;

        self.run_stage(Stage::Update, world);
        self.run_stage(Stage::PostUpdate, world);
    }

    /// Fixed steps run during the last frame.
    pub fn last_fixed_steps(&self) -> u32 {
        self.last_fixed_steps
    }

    fn run_stage(&mut self, stage: Stage, world: &mut World) {
        self.schedules[stage.index()].run(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct ExecutionLog(Vec<&'static str>);

    fn log_system(name: &'static str) -> impl Fn(ResMut<'_, ExecutionLog>) {
        move |mut log: ResMut<'_, ExecutionLog>| log.0.push(name)
    }

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(ExecutionLog::default());
        world
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut world = world();
        let mut schedules = SandboxSchedules::new(1.0 / 60.0);
        schedules.add_systems(Stage::PostUpdate, log_system("post"));
        schedules.add_systems(Stage::Update, log_system("update"));
        schedules.add_systems(Stage::FixedUpdate, log_system("fixed"));
        schedules.add_systems(Stage::PreUpdate, log_system("pre"));

        schedules.run(&mut world, 1.0 / 60.0);

        assert_eq!(
            world.resource::<ExecutionLog>().0,
            vec!["pre", "fixed", "update", "post"]
        );
    }

    #[test]
    fn test_sets_order_systems_within_stage() {
        let mut world = world();
        let mut schedules = SandboxSchedules::new(1.0 / 60.0);
        schedules.add_systems(
            Stage::Update,
            log_system("player").in_set(UpdateSet::Player),
        );
        schedules.add_systems(
            Stage::Update,
            log_system("pickup").in_set(UpdateSet::Interaction),
        );
        schedules.add_systems(
            Stage::FixedUpdate,
            log_system("step").in_set(FixedSet::PhysicsStep),
        );
        schedules.add_systems(
            Stage::FixedUpdate,
            log_system("follow").in_set(FixedSet::Interaction),
        );

        schedules.run(&mut world, 1.0 / 60.0);

        assert_eq!(
            world.resource::<ExecutionLog>().0,
            vec!["follow", "step", "pickup", "player"]
        );
    }

    #[test]
    fn test_fixed_steps_follow_accumulated_time() {
        let mut world = world();
        let mut schedules = SandboxSchedules::new(1.0 / 60.0);
        schedules.add_systems(Stage::FixedUpdate, log_system("fixed"));

        // 20 Hz frames: three fixed steps each.
        for _ in 0..3 {
            schedules.run(&mut world, 0.05);
        }
        assert_eq!(world.resource::<ExecutionLog>().0.len(), 9);

        schedules.run(&mut world, 0.001);
        assert_eq!(schedules.last_fixed_steps(), 0);
    }

    #[test]
    fn test_fixed_steps_capped_per_frame() {
        let mut world = world();
        let mut schedules = SandboxSchedules::new(1.0 / 60.0);
        schedules.add_systems(Stage::FixedUpdate, log_system("fixed"));

        schedules.run(&mut world, 1.0);

        assert_eq!(schedules.last_fixed_steps(), MAX_FIXED_STEPS_PER_FRAME);

        // The backlog is dropped, so a short frame afterwards runs nothing.
        schedules.run(&mut world, 0.001);
        assert_eq!(schedules.last_fixed_steps(), 0);
    }
}
