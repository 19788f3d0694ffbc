//! Projectile → ragdoll transition.
//!
//! A fixed delay after release the single projectile is swapped for a
//! ten-segment humanoid.  Segment placement uses axis-aligned offsets from the
//! projectile's last position (its rotation is ignored), every segment starts
//! with the projectile's linear and angular velocity, and the projectile is
//! despawned through the same command buffer that spawns the segments, so no
//! frame ever sees both.
//!
//! ## Skeleton
//!
//! ```text
//!              head
//!               │ neck
//!   upper arm ─ torso ─ upper arm      (shoulders)
//!       │ elbow  │  │       │ elbow
//!   lower arm    │  │   lower arm
//!          upper leg  upper leg        (hips)
//!              │ knee    │ knee
//!          lower leg  lower leg
//! ```
//!
//! Joints are revolute pins with zero rest length.  Each one carries a
//! position motor holding the spawn pose; single-axis joints (neck, elbows,
//! knees) are stiffer than the shoulder and hip sockets.

use crate::config::GameConfig;
use crate::launcher::Projectile;
use crate::scene::thrown_collision_groups;
use crate::session::{ScheduledFired, ScheduledKind, ThrowSession};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Skeleton description ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Torso,
    UpperArmLeft,
    UpperArmRight,
    LowerArmLeft,
    LowerArmRight,
    UpperLegLeft,
    UpperLegRight,
    LowerLegLeft,
    LowerLegRight,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentShape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl SegmentShape {
    pub fn collider(self) -> Collider {
        match self {
            SegmentShape::Circle { radius } => Collider::ball(radius),
            SegmentShape::Rect { width, height } => Collider::cuboid(width * 0.5, height * 0.5),
        }
    }

    pub fn area(self) -> f32 {
        match self {
            SegmentShape::Circle { radius } => std::f32::consts::PI * radius * radius,
            SegmentShape::Rect { width, height } => width * height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSpec {
    pub part: BodyPart,
    /// Offset of the segment centre from the projectile position.
    pub offset: Vec2,
    pub shape: SegmentShape,
    pub density: f32,
    /// Air friction.
    pub linear_damping: f32,
}

impl SegmentSpec {
    pub fn mass(&self) -> f32 {
        self.shape.area() * self.density
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSpec {
    pub name: &'static str,
    pub child: BodyPart,
    pub parent: BodyPart,
    /// Pin location in the child's local frame.
    pub child_anchor: Vec2,
    /// Pin location in the parent's local frame.
    pub parent_anchor: Vec2,
    /// 0..1 coefficient, scaled by `joint_stiffness_scale`.
    pub stiffness: f32,
}

/// The body every joint chain leads back to.
pub const ROOT_PART: BodyPart = BodyPart::Torso;

const CORE_DAMPING: f32 = 0.6;
const LIMB_DAMPING: f32 = 0.9;
const HINGE_STIFFNESS: f32 = 0.6;
const SOCKET_STIFFNESS: f32 = 0.5;

const fn rect(part: BodyPart, x: f32, y: f32, width: f32, height: f32) -> SegmentSpec {
    SegmentSpec {
        part,
        offset: Vec2::new(x, y),
        shape: SegmentShape::Rect { width, height },
        density: 0.001,
        linear_damping: LIMB_DAMPING,
    }
}

pub const SEGMENTS: [SegmentSpec; 10] = [
    SegmentSpec {
        part: BodyPart::Torso,
        offset: Vec2::new(0.0, -4.0),
        shape: SegmentShape::Rect {
            width: 28.0,
            height: 36.0,
        },
        density: 0.002,
        linear_damping: CORE_DAMPING,
    },
    SegmentSpec {
        part: BodyPart::Head,
        offset: Vec2::new(0.0, 20.0),
        shape: SegmentShape::Circle { radius: 12.0 },
        density: 0.001,
        linear_damping: CORE_DAMPING,
    },
    rect(BodyPart::UpperArmLeft, -18.0, 2.0, 10.0, 24.0),
    rect(BodyPart::UpperArmRight, 18.0, 2.0, 10.0, 24.0),
    rect(BodyPart::LowerArmLeft, -30.0, -10.0, 10.0, 20.0),
    rect(BodyPart::LowerArmRight, 30.0, -10.0, 10.0, 20.0),
    rect(BodyPart::UpperLegLeft, -8.0, -30.0, 12.0, 28.0),
    rect(BodyPart::UpperLegRight, 8.0, -30.0, 12.0, 28.0),
    rect(BodyPart::LowerLegLeft, -8.0, -55.0, 12.0, 24.0),
    rect(BodyPart::LowerLegRight, 8.0, -55.0, 12.0, 24.0),
];

const fn joint(
    name: &'static str,
    child: BodyPart,
    parent: BodyPart,
    child_anchor: Vec2,
    parent_anchor: Vec2,
    stiffness: f32,
) -> JointSpec {
    JointSpec {
        name,
        child,
        parent,
        child_anchor,
        parent_anchor,
        stiffness,
    }
}

pub const JOINTS: [JointSpec; 9] = [
    joint("neck", BodyPart::Head, BodyPart::Torso, Vec2::new(0.0, -12.0), Vec2::new(0.0, 18.0), HINGE_STIFFNESS),
    joint("shoulder-left", BodyPart::UpperArmLeft, BodyPart::Torso, Vec2::new(0.0, 10.0), Vec2::new(-12.0, 8.0), SOCKET_STIFFNESS),
    joint("shoulder-right", BodyPart::UpperArmRight, BodyPart::Torso, Vec2::new(0.0, 10.0), Vec2::new(12.0, 8.0), SOCKET_STIFFNESS),
    joint("elbow-left", BodyPart::LowerArmLeft, BodyPart::UpperArmLeft, Vec2::new(0.0, 8.0), Vec2::new(0.0, -10.0), HINGE_STIFFNESS),
    joint("elbow-right", BodyPart::LowerArmRight, BodyPart::UpperArmRight, Vec2::new(0.0, 8.0), Vec2::new(0.0, -10.0), HINGE_STIFFNESS),
    joint("hip-left", BodyPart::UpperLegLeft, BodyPart::Torso, Vec2::new(0.0, 12.0), Vec2::new(-8.0, -14.0), SOCKET_STIFFNESS),
    joint("hip-right", BodyPart::UpperLegRight, BodyPart::Torso, Vec2::new(0.0, 12.0), Vec2::new(8.0, -14.0), SOCKET_STIFFNESS),
    joint("knee-left", BodyPart::LowerLegLeft, BodyPart::UpperLegLeft, Vec2::new(0.0, 10.0), Vec2::new(0.0, -12.0), HINGE_STIFFNESS),
    joint("knee-right", BodyPart::LowerLegRight, BodyPart::UpperLegRight, Vec2::new(0.0, 10.0), Vec2::new(0.0, -12.0), HINGE_STIFFNESS),
];

/// The joint binding `part` to its parent, if `part` is not the root.
pub fn joint_for(part: BodyPart) -> Option<&'static JointSpec> {
    JOINTS.iter().find(|j| j.child == part)
}

// ── Components ────────────────────────────────────────────────────────────────

/// One rigid segment of a ragdoll.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RagdollSegment {
    pub part: BodyPart,
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn all segments around `origin` moving with `velocity`, then wire the
/// joints.  Everything goes through `commands`, so the whole body enters the
/// world in a single batch.  Returns the segment entities in [`SEGMENTS`] order.
pub fn spawn_ragdoll(
    commands: &mut Commands,
    config: &GameConfig,
    origin: Vec2,
    velocity: Velocity,
) -> Vec<(BodyPart, Entity)> {
    let segments: Vec<(BodyPart, Entity)> = SEGMENTS
        .iter()
        .map(|spec| {
            let entity = commands
                .spawn((
                    RagdollSegment { part: spec.part },
                    Name::new("articulated-segment"),
                    RigidBody::Dynamic,
                    spec.shape.collider(),
                    ColliderMassProperties::Density(spec.density),
                    Damping {
                        linear_damping: spec.linear_damping,
                        angular_damping: 0.0,
                    },
                    velocity,
                    thrown_collision_groups(),
                    ActiveEvents::COLLISION_EVENTS,
                    Transform::from_translation((origin + spec.offset).extend(1.0)),
                    Visibility::default(),
                ))
                .id();
            (spec.part, entity)
        })
        .collect();

    let entity_of = |part: BodyPart| {
        segments
            .iter()
            .find_map(|(p, e)| (*p == part).then_some(*e))
    };

    for spec in JOINTS.iter() {
        let (Some(child), Some(parent)) = (entity_of(spec.child), entity_of(spec.parent)) else {
            continue;
        };
        let pin = RevoluteJointBuilder::new()
            .local_anchor1(spec.parent_anchor)
            .local_anchor2(spec.child_anchor)
            .motor_position(
                0.0,
                spec.stiffness * config.joint_stiffness_scale,
                config.joint_motor_damping,
            )
            .build();
        commands.entity(child).insert(ImpulseJoint::new(parent, pin));
    }

    segments
}

/// Replace the projectile with a ragdoll when `SpawnRagdoll` comes due.
///
/// Reads the projectile's position and velocity at invocation time; if the
/// projectile is already gone (off-screen cleanup) the transition is skipped.
pub fn ragdoll_transition_system(
    mut commands: Commands,
    mut fired: MessageReader<ScheduledFired>,
    mut session: ResMut<ThrowSession>,
    config: Res<GameConfig>,
    q_projectile: Query<(Entity, &Transform, &Velocity), With<Projectile>>,
) {
    for event in fired.read() {
        if event.kind != ScheduledKind::SpawnRagdoll || event.session != session.id {
            continue;
        }
        if session.ragdoll_spawned {
            continue;
        }
        let Ok((projectile, transform, velocity)) = q_projectile.single() else {
            debug!("Projectile gone before ragdoll spawn; skipping");
            continue;
        };

        let origin = transform.translation.truncate();
        let segments = spawn_ragdoll(&mut commands, &config, origin, *velocity);
        commands.entity(projectile).try_despawn();
        session.ragdoll_spawned = true;
        info!(
            "Ragdoll of {} segments spawned at {:?} with velocity {:?}",
            segments.len(),
            origin,
            velocity.linvel
        );
    }
}
