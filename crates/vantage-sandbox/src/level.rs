//! Test level: a floor, two walls, a row of crates, and a few props that
//! exercise the refusal paths.

use std::f32::consts::FRAC_PI_2;

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use tracing::info;
use vantage_math::Transform;
use vantage_physics::{
    CharacterBody, LayerRegistry, ObjectDesc, ObjectId, PhysicsWorld, Scene, ShapeDesc,
};

/// Where the player capsule starts.
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 0.95, 0.0);
/// Camera root height above the capsule centre.
pub const EYE_OFFSET: Vec3 = Vec3::new(0.0, 0.7, 0.0);

/// Handles to the objects the sandbox reports on.
#[derive(Resource, Debug, Clone)]
pub struct Level {
    /// The character body's scene object.
    pub player: ObjectId,
    /// Head node; pickup ray origin and pitch target.
    pub camera_root: ObjectId,
    /// Pickable boxes.
    pub crates: Vec<ObjectId>,
    /// Tagged as pickable but static, so pickup is refused.
    pub shelf: ObjectId,
    /// Untagged dynamic capsule lying on its side.
    pub barrel: ObjectId,
}

fn cuboid(name: &str, half_extents: Vec3) -> ObjectDesc {
    ObjectDesc::new(name, ShapeDesc::Cuboid { half_extents })
}

/// Spawns the level and the player body. The body is returned so the caller
/// can hand it to the first-person controller.
pub fn build(
    physics: &mut PhysicsWorld,
    scene: &mut Scene,
    layers: &LayerRegistry,
    pickable_tag: &str,
) -> (Level, CharacterBody) {
    scene.spawn_static(
        physics,
        cuboid("Floor", Vec3::new(20.0, 0.5, 20.0)).at(Vec3::new(0.0, -0.5, 0.0)),
    );
    scene.spawn_static(
        physics,
        cuboid("WallNorth", Vec3::new(20.0, 2.0, 0.25)).at(Vec3::new(0.0, 2.0, -8.0)),
    );
    scene.spawn_static(
        physics,
        cuboid("WallEast", Vec3::new(0.25, 2.0, 20.0)).at(Vec3::new(6.0, 2.0, 0.0)),
    );

    let crates = [
        Vec3::new(0.0, 0.25, -2.0),
        Vec3::new(1.5, 0.25, -3.0),
        Vec3::new(-1.5, 0.25, -3.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, at)| {
        scene.spawn_dynamic(
            physics,
            cuboid(&format!("Crate{i}"), Vec3::splat(0.25))
                .with_tag(pickable_tag)
                .with_mass(2.0)
                .at(at),
        )
    })
    .collect::<Vec<_>>();

    let shelf = scene.spawn_static(
        physics,
        cuboid("Shelf", Vec3::new(0.6, 0.4, 0.2))
            .with_tag(pickable_tag)
            .at(Vec3::new(-3.0, 0.4, -4.0)),
    );
    let barrel = scene.spawn_dynamic(
        physics,
        ObjectDesc::new(
            "Barrel",
            ShapeDesc::Capsule {
                half_height: 0.3,
                radius: 0.3,
            },
        )
        .rotated(Quat::from_rotation_z(FRAC_PI_2))
        .at(Vec3::new(3.0, 0.3, -4.0)),
    );
    let water = layers.resolve_or_default("Water");
    scene.spawn_static(
        physics,
        cuboid("Trigger", Vec3::new(1.0, 1.0, 1.0))
            .with_layer(water)
            .sensor()
            .at(Vec3::new(0.0, 1.0, -6.0)),
    );

    let player_layer = layers.resolve_or_default("Player");
    let body = CharacterBody::spawn(physics, PLAYER_START, player_layer);
    let player = scene.register_body("Player", body.body, Some(body.collider));
    let camera_root = scene.spawn_node(
        "CameraRoot",
        Some(player),
        Transform::from_translation(EYE_OFFSET),
    );

    // Queries read the broad phase, which only refreshes on a step.
    physics.step();
    info!(objects = scene.len(), crates = crates.len(), "level built");

    (
        Level {
            player,
            camera_root,
            crates,
            shelf,
            barrel,
        },
        body,
    )
}
