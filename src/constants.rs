//! Centralised gameplay and physics constants.
//!
//! Every value here is the compiled default of the matching field in
//! [`crate::config::GameConfig`]; `assets/game.toml` can override any subset
//! without recompiling.
//!
//! World units are pixels (Rapier runs with `pixels_per_meter(1.0)`), Y points
//! up and the origin sits at the bottom-left corner of the viewport.

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Initial window width (px).
pub const VIEWPORT_WIDTH: f32 = 1200.0;

/// Initial window height (px).
pub const VIEWPORT_HEIGHT: f32 = 600.0;

/// Seconds to wait after the last resize notification before the layout is
/// re-applied.  Physics stays paused for the whole window.
pub const RESIZE_SETTLE_SECS: f32 = 0.15;

// ── World ─────────────────────────────────────────────────────────────────────

/// Downward gravity (px/s²).
pub const GRAVITY: f32 = 980.0;

/// Ground slab thickness (px).
pub const GROUND_HEIGHT: f32 = 40.0;

/// Height of the ground's top surface as a fraction of the viewport height.
pub const GROUND_TOP_FRAC: f32 = 35.0 / 600.0;

/// Thickness of the invisible side walls just outside the viewport (px).
pub const SIDE_WALL_THICKNESS: f32 = 60.0;

/// Obstacle width as a fraction of the viewport width.
pub const OBSTACLE_WIDTH_FRAC: f32 = 0.06;

/// Obstacle height as a fraction of the viewport height.
pub const OBSTACLE_HEIGHT_FRAC: f32 = 0.45;

/// Horizontal centre of the obstacle as a fraction of the viewport width.
pub const OBSTACLE_X_FRAC: f32 = 0.72;

/// Goal sensor width as a fraction of the viewport width.
pub const GOAL_WIDTH_FRAC: f32 = 0.1;

/// Goal sensor height as a fraction of the viewport height.
pub const GOAL_HEIGHT_FRAC: f32 = 0.35;

/// Horizontal centre of the goal sensor as a fraction of the viewport width.
pub const GOAL_X_FRAC: f32 = 0.9;

// ── Launcher ──────────────────────────────────────────────────────────────────

/// Horizontal position of the launcher pivot as a fraction of the viewport width.
pub const LAUNCHER_PIVOT_X_FRAC: f32 = 0.125;

/// Launcher body width (px).
pub const LAUNCHER_WIDTH: f32 = 30.0;

/// Launcher body height, pivot to tip (px).
pub const LAUNCHER_HEIGHT: f32 = 150.0;

/// Maximum backward bend (rad).  60°.
pub const LAUNCHER_MAX_BACK: f32 = std::f32::consts::FRAC_PI_3;

/// Maximum forward lean (rad).  10°.
pub const LAUNCHER_MAX_FRONT: f32 = std::f32::consts::PI / 18.0;

/// Radians of bend per pixel of horizontal pointer offset from the pivot.
pub const DRAG_SENSITIVITY: f32 = 0.01;

/// Pointer must land within this radius of the projectile to start a drag.
pub const GRAB_RADIUS: f32 = 40.0;

/// Per-step geometric decay factor applied to the bend while springing back.
pub const SPRING_BACK_DECAY: f32 = 0.7;

/// Once the bend is this close to rest it snaps exactly to rest.
pub const SPRING_BACK_EPSILON: f32 = 0.01;

/// Releases with less bend than this are treated as a cancelled throw.
pub const MIN_LAUNCH_ANGLE: f32 = 0.05;

/// Launch speed per radian of bend (px/s/rad).
pub const LAUNCH_POWER: f32 = 900.0;

/// Vertical launch component as a fraction of the horizontal one.
pub const LAUNCH_UPWARD_BIAS: f32 = 0.5;

// ── Projectile ────────────────────────────────────────────────────────────────

/// Projectile ball radius (px).
pub const PROJECTILE_RADIUS: f32 = 15.0;

/// Projectile collider density.
pub const PROJECTILE_DENSITY: f32 = 0.004;

/// Projectile restitution.
pub const PROJECTILE_RESTITUTION: f32 = 0.2;

/// Projectile friction.
pub const PROJECTILE_FRICTION: f32 = 0.3;

/// Linear damping standing in for air friction.
pub const PROJECTILE_LINEAR_DAMPING: f32 = 0.6;

// ── Throw timing ──────────────────────────────────────────────────────────────

/// Real-time delay between release and the ragdoll spawning in its place.
pub const RAGDOLL_SPAWN_DELAY_SECS: f32 = 0.3;

/// Grace window between an obstacle hit and committing the failure.
pub const FAILURE_GRACE_SECS: f32 = 0.5;

/// Real-time delay after launch before the scene resets for the next throw.
pub const AUTO_RESET_SECS: f32 = 6.0;

/// Bodies further than this below the viewport bottom are removed.
pub const OFFSCREEN_MARGIN: f32 = 200.0;

// ── Ragdoll ───────────────────────────────────────────────────────────────────

/// Scales the 0..1 joint stiffness coefficients into motor stiffness.
pub const JOINT_STIFFNESS_SCALE: f32 = 2000.0;

/// Angular damping of the joint motors.
pub const JOINT_MOTOR_DAMPING: f32 = 50.0;

// ── Trajectory preview ────────────────────────────────────────────────────────

/// Maximum number of shadow-world steps sampled per frame.
pub const PREVIEW_STEPS: usize = 90;

/// Fixed timestep of the shadow world (s).
pub const PREVIEW_DT: f32 = 1.0 / 60.0;

/// Sample every n-th step when drawing the dotted path.
pub const PREVIEW_DOT_STRIDE: usize = 3;

/// Generous margin around the viewport beyond which sampling stops.
pub const PREVIEW_BOUNDS_MARGIN: f32 = 300.0;

// ── HUD ───────────────────────────────────────────────────────────────────────

/// HUD font size.
pub const HUD_FONT_SIZE: f32 = 20.0;
