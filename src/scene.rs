//! Scene composition: static world bodies, viewport layout, and resize handling.
//!
//! The layout is a pure function of the viewport size and [`GameConfig`]
//! ([`SceneLayout::compute`]).  On a window resize the existing bodies are
//! moved and their colliders reshaped in place; the world is never rebuilt.
//!
//! ## Resize protocol
//!
//! 1. [`resize_request_system`] coalesces `WindowResized` messages into
//!    [`ResizeState::pending`], restarts the settle timer, and pauses the
//!    Rapier pipeline.
//! 2. [`resize_apply_system`] waits until no new message has arrived for
//!    `resize_settle_secs` of real time, recomputes [`SceneLayout`], re-applies
//!    it to every [`SceneBody`], and resumes the pipeline.
//!
//! The launcher and the attached projectile follow automatically because they
//! are re-posed from the layout every frame.

use crate::config::GameConfig;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

// ── Collision groups ──────────────────────────────────────────────────────────

/// Ground and obstacles.
pub const GROUP_WORLD: Group = Group::GROUP_1;
/// The pivoted launcher; collides with nothing.
pub const GROUP_LAUNCHER: Group = Group::GROUP_2;
/// Projectile and ragdoll segments.
pub const GROUP_THROWN: Group = Group::GROUP_3;
/// The goal sensor.
pub const GROUP_GOAL: Group = Group::GROUP_4;

/// Collision groups carried by the projectile and every ragdoll segment.
///
/// Segments do not collide with each other; their joints keep them together.
pub fn thrown_collision_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_THROWN, GROUP_WORLD | GROUP_GOAL)
}

// ── Components ────────────────────────────────────────────────────────────────

/// Tags every static body the layout owns.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneBody {
    Ground,
    /// Index into [`SceneLayout::obstacles`].
    Obstacle(usize),
    GoalSensor,
    /// Fixed world point the launcher hinge is pinned to.
    LauncherAnchor,
    /// Walls just outside the viewport's left and right edges.
    LeftWall,
    RightWall,
}

impl SceneBody {
    /// Label used for the entity's [`Name`].
    pub fn label(self) -> &'static str {
        match self {
            SceneBody::Ground => "ground",
            SceneBody::Obstacle(_) => "obstacle",
            SceneBody::GoalSensor => "goal-sensor",
            SceneBody::LauncherAnchor => "launcher-anchor",
            SceneBody::LeftWall => "left-wall",
            SceneBody::RightWall => "right-wall",
        }
    }

    /// Surface friction of the body's collider; `None` for bodies without one.
    pub fn friction(self) -> Option<f32> {
        match self {
            SceneBody::Ground => Some(0.8),
            SceneBody::Obstacle(_) => Some(0.5),
            SceneBody::LeftWall | SceneBody::RightWall => Some(0.3),
            SceneBody::GoalSensor | SceneBody::LauncherAnchor => None,
        }
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Positions and sizes of every static body for one viewport size.
///
/// Origin is the bottom-left corner of the viewport, Y up.  Everything except
/// the ground and wall thickness scales with the viewport.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub viewport: Vec2,
    pub ground_center: Vec2,
    pub ground_size: Vec2,
    /// Y of the ground's walkable surface.
    pub ground_top: f32,
    /// `(center, size)` of each obstacle, in configuration order.
    pub obstacles: Vec<(Vec2, Vec2)>,
    pub goal_center: Vec2,
    pub goal_size: Vec2,
    pub left_wall_center: Vec2,
    pub right_wall_center: Vec2,
    pub wall_size: Vec2,
    /// World point the launcher rotates about.
    pub pivot: Vec2,
}

impl SceneLayout {
    /// Lay the scene out proportionally to `viewport`.
    pub fn compute(viewport: Vec2, config: &GameConfig) -> Self {
        let ground_top = viewport.y * config.ground_top_frac;
        let ground_size = Vec2::new(viewport.x, config.ground_height);
        let ground_center = Vec2::new(viewport.x * 0.5, ground_top - config.ground_height * 0.5);

        let obstacles = config
            .obstacles
            .iter()
            .map(|spec| {
                let size = Vec2::new(viewport.x * spec.width_frac, viewport.y * spec.height_frac);
                let center = Vec2::new(viewport.x * spec.x_frac, ground_top + size.y * 0.5);
                (center, size)
            })
            .collect();

        let goal_size = Vec2::new(
            viewport.x * config.goal_width_frac,
            viewport.y * config.goal_height_frac,
        );
        let goal_center = Vec2::new(viewport.x * config.goal_x_frac, ground_top + goal_size.y * 0.5);

        let wall = config.side_wall_thickness;
        Self {
            viewport,
            ground_center,
            ground_size,
            ground_top,
            obstacles,
            goal_center,
            goal_size,
            left_wall_center: Vec2::new(-wall * 0.5, viewport.y * 0.5),
            right_wall_center: Vec2::new(viewport.x + wall * 0.5, viewport.y * 0.5),
            wall_size: Vec2::new(wall, viewport.y),
            pivot: Vec2::new(viewport.x * config.launcher_pivot_x_frac, ground_top),
        }
    }

    /// X of the obstacle face nearest the launcher, over every obstacle.
    ///
    /// Infinite when the layout has no obstacle.
    pub fn obstacle_near_edge(&self) -> f32 {
        self.obstacles
            .iter()
            .map(|(center, size)| center.x - size.x * 0.5)
            .fold(f32::INFINITY, f32::min)
    }

    /// `true` once `pos` has dropped more than `margin` below the viewport.
    pub fn is_offscreen(&self, pos: Vec2, margin: f32) -> bool {
        pos.y < -margin
    }

    /// Viewport rectangle grown by `margin` on every side.
    pub fn padded_bounds(&self, margin: f32) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.viewport).inflate(margin)
    }

    /// Centre and size for the body tagged `kind`.
    pub fn placement(&self, kind: SceneBody) -> (Vec2, Vec2) {
        match kind {
            SceneBody::Ground => (self.ground_center, self.ground_size),
            SceneBody::Obstacle(i) => self.obstacles.get(i).copied().unwrap_or((Vec2::ZERO, Vec2::ZERO)),
            SceneBody::GoalSensor => (self.goal_center, self.goal_size),
            SceneBody::LauncherAnchor => (self.pivot, Vec2::ZERO),
            SceneBody::LeftWall => (self.left_wall_center, self.wall_size),
            SceneBody::RightWall => (self.right_wall_center, self.wall_size),
        }
    }

    /// Every solid body of the layout: ground, obstacles, and side walls.
    pub fn solid_bodies(&self) -> impl Iterator<Item = SceneBody> + '_ {
        [SceneBody::Ground, SceneBody::LeftWall, SceneBody::RightWall]
            .into_iter()
            .chain((0..self.obstacles.len()).map(SceneBody::Obstacle))
    }
}

impl FromWorld for SceneLayout {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
        SceneLayout::compute(
            Vec2::new(config.viewport_width, config.viewport_height),
            &config,
        )
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn one static body of `kind` at its layout placement.
pub fn spawn_scene_body(commands: &mut Commands, layout: &SceneLayout, kind: SceneBody) -> Entity {
    let (center, size) = layout.placement(kind);
    let mut entity = commands.spawn((
        kind,
        Name::new(kind.label()),
        RigidBody::Fixed,
        Transform::from_translation(center.extend(0.0)),
        Visibility::default(),
    ));

    match kind {
        SceneBody::Ground | SceneBody::LeftWall | SceneBody::RightWall => {
            entity.insert((
                Collider::cuboid(size.x * 0.5, size.y * 0.5),
                Friction::coefficient(kind.friction().unwrap_or_default()),
                CollisionGroups::new(GROUP_WORLD, GROUP_THROWN),
            ));
        }
        SceneBody::Obstacle(_) => {
            entity.insert((
                Collider::cuboid(size.x * 0.5, size.y * 0.5),
                Friction::coefficient(kind.friction().unwrap_or_default()),
                CollisionGroups::new(GROUP_WORLD, GROUP_THROWN),
                ActiveEvents::COLLISION_EVENTS,
            ));
        }
        SceneBody::GoalSensor => {
            entity.insert((
                Collider::cuboid(size.x * 0.5, size.y * 0.5),
                Sensor,
                CollisionGroups::new(GROUP_GOAL, GROUP_THROWN),
                ActiveEvents::COLLISION_EVENTS,
            ));
        }
        SceneBody::LauncherAnchor => {}
    }
    entity.id()
}

/// Startup system: build the static world, the launcher, and the first projectile.
///
/// Lays out against the primary window when there is one, otherwise against
/// the configured viewport.
pub fn spawn_scene(
    mut commands: Commands,
    config: Res<GameConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let viewport = windows
        .single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .ok()
        .filter(|size| size.x > 0.0 && size.y > 0.0)
        .unwrap_or(Vec2::new(config.viewport_width, config.viewport_height));
    let layout = SceneLayout::compute(viewport, &config);

    for kind in layout.solid_bodies() {
        spawn_scene_body(&mut commands, &layout, kind);
    }
    if config.goal_sensor_enabled {
        spawn_scene_body(&mut commands, &layout, SceneBody::GoalSensor);
    }
    let anchor = spawn_scene_body(&mut commands, &layout, SceneBody::LauncherAnchor);

    let rest = crate::launcher::LauncherState::from_config(&config);
    let launcher = crate::launcher::spawn_launcher(&mut commands, &config, &layout, anchor, rest.angle);
    crate::launcher::spawn_projectile(&mut commands, &config, &layout, launcher, rest.angle);

    info!(
        "Scene built for {}x{} viewport with {} obstacle(s) (goal sensor: {}, ragdoll: {})",
        layout.viewport.x,
        layout.viewport.y,
        layout.obstacles.len(),
        config.goal_sensor_enabled,
        config.ragdoll_enabled
    );
    commands.insert_resource(rest);
    commands.insert_resource(layout);
}

// ── Resize ────────────────────────────────────────────────────────────────────

/// Coalesces resize notifications until the window size stops changing.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ResizeState {
    /// Latest requested viewport size; `None` when no resize is in flight.
    pub pending: Option<Vec2>,
    /// Real seconds left before `pending` is applied.
    pub settle_timer: f32,
}

impl ResizeState {
    /// `true` while a resize is waiting to be applied.
    pub fn in_progress(&self) -> bool {
        self.pending.is_some()
    }
}

/// Run condition: no resize is in flight.
pub fn scene_settled(resize: Res<ResizeState>) -> bool {
    !resize.in_progress()
}

/// Record the newest window size and pause physics until it settles.
pub fn resize_request_system(
    mut events: MessageReader<WindowResized>,
    mut resize: ResMut<ResizeState>,
    layout: Res<SceneLayout>,
    config: Res<GameConfig>,
    mut rapier: Query<&mut RapierConfiguration>,
) {
    let Some(latest) = events.read().last() else {
        return;
    };
    let size = Vec2::new(latest.width, latest.height);
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    if resize.pending.is_none() && size == layout.viewport {
        return;
    }

    resize.pending = Some(size);
    resize.settle_timer = config.resize_settle_secs;
    for mut cfg in rapier.iter_mut() {
        cfg.physics_pipeline_active = false;
    }
}

/// Apply the pending viewport size once it has been stable for the settle window.
pub fn resize_apply_system(
    mut resize: ResMut<ResizeState>,
    mut layout: ResMut<SceneLayout>,
    config: Res<GameConfig>,
    time: Res<Time<Real>>,
    mut bodies: Query<(&SceneBody, &mut Transform, Option<&mut Collider>)>,
    mut rapier: Query<&mut RapierConfiguration>,
) {
    let Some(size) = resize.pending else {
        return;
    };
    resize.settle_timer -= time.delta_secs();
    if resize.settle_timer > 0.0 {
        return;
    }

    *layout = SceneLayout::compute(size, &config);
    for (kind, mut transform, collider) in bodies.iter_mut() {
        let (center, extent) = layout.placement(*kind);
        transform.translation = center.extend(transform.translation.z);
        if let Some(mut collider) = collider {
            *collider = Collider::cuboid(extent.x * 0.5, extent.y * 0.5);
        }
    }

    resize.pending = None;
    resize.settle_timer = 0.0;
    for mut cfg in rapier.iter_mut() {
        cfg.physics_pipeline_active = true;
    }
    info!("Scene re-laid out for {}x{} viewport", size.x, size.y);
}
