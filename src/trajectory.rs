//! Trajectory preview through a detached Rapier world.
//!
//! While the launcher is aimed, every frame builds a throwaway
//! [`PreviewWorld`]: its own Rapier pipeline and body sets holding fixed
//! copies of the ground, every obstacle, and both side walls, plus one ball
//! with the projectile's radius, density, material, and air friction.  The
//! ball gets the launch velocity the current bend would produce and is stepped
//! at a fixed timestep until it leaves a padded viewport or the step budget
//! runs out, so the dotted path bounces off the same geometry the real throw
//! will meet.
//!
//! The preview world shares no handle, entity, or component with the live
//! `bevy_rapier2d` world and is dropped at the end of the frame.  The goal
//! sensor is left out; it does not deflect anything.

use crate::config::GameConfig;
use crate::launcher::{launch_velocity, tip_position, LauncherPhase, LauncherState};
use crate::scene::SceneLayout;
use bevy::prelude::*;
use bevy_rapier2d::rapier::prelude as rapier;

/// Single-throw physics world used only for sampling a predicted path.
pub struct PreviewWorld {
    gravity: rapier::Vector<f32>,
    params: rapier::IntegrationParameters,
    pipeline: rapier::PhysicsPipeline,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    ball: Option<rapier::RigidBodyHandle>,
}

impl PreviewWorld {
    /// An empty world with the configured gravity and preview timestep.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            gravity: rapier::vector![0.0, -config.gravity],
            params: rapier::IntegrationParameters {
                dt: config.preview_dt,
                ..Default::default()
            },
            pipeline: rapier::PhysicsPipeline::new(),
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            ball: None,
        }
    }

    /// A world holding a fixed copy of every solid body in `layout`.
    pub fn from_layout(config: &GameConfig, layout: &SceneLayout) -> Self {
        let mut world = Self::new(config);
        for kind in layout.solid_bodies() {
            let (center, size) = layout.placement(kind);
            world.add_fixed_box(center, size, kind.friction().unwrap_or_default());
        }
        world
    }

    /// Add a fixed axis-aligned box of full extent `size` centred on `center`.
    pub fn add_fixed_box(&mut self, center: Vec2, size: Vec2, friction: f32) {
        let body = rapier::RigidBodyBuilder::fixed()
            .translation(rapier::vector![center.x, center.y])
            .build();
        let handle = self.bodies.insert(body);
        let collider = rapier::ColliderBuilder::cuboid(size.x * 0.5, size.y * 0.5)
            .friction(friction)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
    }

    /// Place a projectile-shaped ball at `position` moving at `linvel`.
    ///
    /// Replaces the previous ball, if any.
    pub fn launch(&mut self, config: &GameConfig, position: Vec2, linvel: Vec2) {
        if let Some(old) = self.ball.take() {
            self.bodies.remove(
                old,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(rapier::vector![position.x, position.y])
            .linvel(rapier::vector![linvel.x, linvel.y])
            .linear_damping(config.projectile_linear_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);
        let collider = rapier::ColliderBuilder::ball(config.projectile_radius)
            .density(config.projectile_density)
            .restitution(config.projectile_restitution)
            .friction(config.projectile_friction)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.ball = Some(handle);
    }

    /// Current ball position; `None` before [`launch`](Self::launch).
    pub fn ball_position(&self) -> Option<Vec2> {
        let body = self.bodies.get(self.ball?)?;
        let t = body.translation();
        Some(Vec2::new(t.x, t.y))
    }

    /// Advance by one preview timestep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Step up to `steps` times, recording the ball position after each step
    /// and stopping early once it leaves `bounds`.
    pub fn sample(&mut self, steps: usize, bounds: Rect) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.step();
            let Some(pos) = self.ball_position() else {
                break;
            };
            if !bounds.contains(pos) {
                break;
            }
            points.push(pos);
        }
        points
    }
}

/// Predicted flight path for a release at `bend`.
pub fn predict_path(config: &GameConfig, layout: &SceneLayout, bend: f32) -> Vec<Vec2> {
    let mut world = PreviewWorld::from_layout(config, layout);
    world.launch(
        config,
        tip_position(layout.pivot, config, bend),
        launch_velocity(bend, config).linvel,
    );
    world.sample(
        config.preview_steps,
        layout.padded_bounds(config.preview_bounds_margin),
    )
}

/// Points of the current predicted path; empty when not aiming.
#[derive(Resource, Debug, Default, Clone)]
pub struct TrajectoryPreview {
    pub points: Vec<Vec2>,
}

/// Recompute the preview every frame while aiming; clear it otherwise.
pub fn trajectory_preview_system(
    state: Res<LauncherState>,
    config: Res<GameConfig>,
    layout: Res<SceneLayout>,
    mut preview: ResMut<TrajectoryPreview>,
) {
    if state.phase != LauncherPhase::Aiming {
        if !preview.points.is_empty() {
            preview.points.clear();
        }
        return;
    }
    preview.points = predict_path(&config, &layout, state.deflection());
}
