//! Launcher module: the pivoted launcher body, its projectile, pointer input,
//! and the aim / release / spring-back cycle.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `Launcher` / `Projectile` markers, `LauncherState` machine, launch geometry |
//! | [`input`] | Mouse + touch → `PointerInput`, `R` → `ResetRequest` |
//! | [`control`] | Drag, release, spring-back, posing, and pinning systems |

pub mod control;
pub mod input;
pub mod state;

pub use control::{
    launcher_drag_system, launcher_pose_system, launcher_spring_back_system, projectile_pin_system,
};
pub use input::{
    mouse_to_pointer_system, pointer_clear_system, reset_key_system, touch_to_pointer_system,
    PointerInput,
};
pub use state::{
    grab_hit, launch_velocity, launcher_pose, tip_local_anchor, tip_position, Launcher,
    LauncherPhase, LauncherState, Projectile,
};

use crate::config::GameConfig;
use crate::scene::{thrown_collision_groups, SceneLayout, GROUP_LAUNCHER};
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

// ── Spawning ───────────────────────────────────────────────────────────────────

/// Spawn the launcher hinged to `anchor` at the layout pivot.
///
/// The launcher is kinematic: [`launcher_pose_system`] places it from
/// [`LauncherState`] every frame.  The revolute hinge to the fixed anchor
/// carries the same angular limits as the bend range and stays for the whole
/// run.  It collides with nothing.
pub fn spawn_launcher(
    commands: &mut Commands,
    config: &GameConfig,
    layout: &SceneLayout,
    anchor: Entity,
    bend: f32,
) -> Entity {
    let hinge = RevoluteJointBuilder::new()
        .local_anchor1(Vec2::ZERO)
        .local_anchor2(Vec2::new(0.0, -config.launcher_height * 0.5))
        .limits([
            state::body_rotation(config.launcher_max_front),
            state::body_rotation(-config.launcher_max_back),
        ])
        .build();

    commands
        .spawn((
            Launcher,
            Name::new("launcher"),
            RigidBody::KinematicPositionBased,
            Collider::cuboid(config.launcher_width * 0.5, config.launcher_height * 0.5),
            CollisionGroups::new(GROUP_LAUNCHER, Group::NONE),
            ImpulseJoint::new(anchor, hinge),
            launcher_pose(layout.pivot, config.launcher_height, bend),
            Visibility::default(),
        ))
        .id()
}

/// Spawn a fresh projectile on the launcher tip, attached by a pin joint.
///
/// The attachment `ImpulseJoint` is removed at launch.
pub fn spawn_projectile(
    commands: &mut Commands,
    config: &GameConfig,
    layout: &SceneLayout,
    launcher: Entity,
    bend: f32,
) -> Entity {
    let attachment = RevoluteJointBuilder::new()
        .local_anchor1(tip_local_anchor(config))
        .local_anchor2(Vec2::ZERO)
        .build();
    let pos = tip_position(layout.pivot, config, bend);

    commands
        .spawn((
            Projectile,
            Name::new("projectile"),
            RigidBody::Dynamic,
            Collider::ball(config.projectile_radius),
            ColliderMassProperties::Density(config.projectile_density),
            Restitution::coefficient(config.projectile_restitution),
            Friction::coefficient(config.projectile_friction),
            Damping {
                linear_damping: config.projectile_linear_damping,
                angular_damping: 0.0,
            },
            Velocity::zero(),
            Ccd { enabled: true },
            thrown_collision_groups(),
            ActiveEvents::COLLISION_EVENTS,
            ImpulseJoint::new(launcher, attachment),
            Transform::from_translation(pos.extend(1.0)),
            Visibility::default(),
        ))
        .id()
}
