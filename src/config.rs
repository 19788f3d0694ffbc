//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! The config also selects the scene variant: obstacle dimensions, launcher
//! limits, and whether the ragdoll, the goal sensor, and boundary-crossing
//! scoring are active.
//!
//! ```toml
//! # assets/game.toml
//! ragdoll_enabled = false
//! scoring_enabled = true
//! launcher_max_back = 0.8
//!
//! # A low ram in front of a tall fort wall.
//! [[obstacles]]
//! x_frac = 0.75
//! width_frac = 0.08
//! height_frac = 0.13
//!
//! [[obstacles]]
//! x_frac = 0.85
//! width_frac = 0.07
//! height_frac = 0.5
//! ```

use crate::constants::*;
use crate::error::{require_fraction, require_positive, require_unit_open, GameError, GameResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/game.toml";

/// One static obstacle, sized and placed relative to the viewport.  Every
/// obstacle stands on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObstacleSpec {
    /// Horizontal centre as a fraction of the viewport width.
    pub x_frac: f32,
    pub width_frac: f32,
    pub height_frac: f32,
}

impl Default for ObstacleSpec {
    fn default() -> Self {
        Self {
            x_frac: OBSTACLE_X_FRAC,
            width_frac: OBSTACLE_WIDTH_FRAC,
            height_frac: OBSTACLE_HEIGHT_FRAC,
        }
    }
}

/// Runtime-tunable gameplay and physics configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Scene variant ─────────────────────────────────────────────────────────
    /// Replace the projectile by a ragdoll shortly after release.
    pub ragdoll_enabled: bool,
    /// Spawn the goal sensor (victory condition).
    pub goal_sensor_enabled: bool,
    /// Score boundary crossings (+1) and obstacle hits (-1).
    pub scoring_enabled: bool,

    // ── Viewport ──────────────────────────────────────────────────────────────
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub resize_settle_secs: f32,

    // ── World ─────────────────────────────────────────────────────────────────
    pub gravity: f32,
    pub ground_height: f32,
    pub ground_top_frac: f32,
    pub side_wall_thickness: f32,
    /// Obstacles in any order; the one nearest the launcher defines the
    /// boundary-crossing edge.
    pub obstacles: Vec<ObstacleSpec>,
    pub goal_width_frac: f32,
    pub goal_height_frac: f32,
    pub goal_x_frac: f32,

    // ── Launcher ──────────────────────────────────────────────────────────────
    pub launcher_pivot_x_frac: f32,
    pub launcher_width: f32,
    pub launcher_height: f32,
    pub launcher_max_back: f32,
    pub launcher_max_front: f32,
    pub drag_sensitivity: f32,
    pub grab_radius: f32,
    pub spring_back_decay: f32,
    pub spring_back_epsilon: f32,
    pub min_launch_angle: f32,
    pub launch_power: f32,
    pub launch_upward_bias: f32,

    // ── Projectile ────────────────────────────────────────────────────────────
    pub projectile_radius: f32,
    pub projectile_density: f32,
    pub projectile_restitution: f32,
    pub projectile_friction: f32,
    pub projectile_linear_damping: f32,

    // ── Throw timing ──────────────────────────────────────────────────────────
    pub ragdoll_spawn_delay_secs: f32,
    pub failure_grace_secs: f32,
    pub auto_reset_secs: f32,
    pub offscreen_margin: f32,

    // ── Ragdoll ───────────────────────────────────────────────────────────────
    pub joint_stiffness_scale: f32,
    pub joint_motor_damping: f32,

    // ── Trajectory preview ────────────────────────────────────────────────────
    pub preview_steps: usize,
    pub preview_dt: f32,
    pub preview_dot_stride: usize,
    pub preview_bounds_margin: f32,

    // ── HUD ───────────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Scene variant
            ragdoll_enabled: true,
            goal_sensor_enabled: true,
            scoring_enabled: true,
            // Viewport
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            resize_settle_secs: RESIZE_SETTLE_SECS,
            // World
            gravity: GRAVITY,
            ground_height: GROUND_HEIGHT,
            ground_top_frac: GROUND_TOP_FRAC,
            side_wall_thickness: SIDE_WALL_THICKNESS,
            obstacles: vec![ObstacleSpec::default()],
            goal_width_frac: GOAL_WIDTH_FRAC,
            goal_height_frac: GOAL_HEIGHT_FRAC,
            goal_x_frac: GOAL_X_FRAC,
            // Launcher
            launcher_pivot_x_frac: LAUNCHER_PIVOT_X_FRAC,
            launcher_width: LAUNCHER_WIDTH,
            launcher_height: LAUNCHER_HEIGHT,
            launcher_max_back: LAUNCHER_MAX_BACK,
            launcher_max_front: LAUNCHER_MAX_FRONT,
            drag_sensitivity: DRAG_SENSITIVITY,
            grab_radius: GRAB_RADIUS,
            spring_back_decay: SPRING_BACK_DECAY,
            spring_back_epsilon: SPRING_BACK_EPSILON,
            min_launch_angle: MIN_LAUNCH_ANGLE,
            launch_power: LAUNCH_POWER,
            launch_upward_bias: LAUNCH_UPWARD_BIAS,
            // Projectile
            projectile_radius: PROJECTILE_RADIUS,
            projectile_density: PROJECTILE_DENSITY,
            projectile_restitution: PROJECTILE_RESTITUTION,
            projectile_friction: PROJECTILE_FRICTION,
            projectile_linear_damping: PROJECTILE_LINEAR_DAMPING,
            // Throw timing
            ragdoll_spawn_delay_secs: RAGDOLL_SPAWN_DELAY_SECS,
            failure_grace_secs: FAILURE_GRACE_SECS,
            auto_reset_secs: AUTO_RESET_SECS,
            offscreen_margin: OFFSCREEN_MARGIN,
            // Ragdoll
            joint_stiffness_scale: JOINT_STIFFNESS_SCALE,
            joint_motor_damping: JOINT_MOTOR_DAMPING,
            // Trajectory preview
            preview_steps: PREVIEW_STEPS,
            preview_dt: PREVIEW_DT,
            preview_dot_stride: PREVIEW_DOT_STRIDE,
            preview_bounds_margin: PREVIEW_BOUNDS_MARGIN,
            // HUD
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document; keys absent from `contents` keep their defaults.
    pub fn from_toml_str(path: &str, contents: &str) -> GameResult<Self> {
        toml::from_str::<GameConfig>(contents).map_err(|e| GameError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Reject values that would make the scene degenerate.
    ///
    /// The checks are deliberately coarse: they catch typos (a negative
    /// gravity, a decay factor of `7` instead of `0.7`) rather than tuning.
    pub fn validate(&self) -> GameResult<()> {
        require_positive("viewport_width", self.viewport_width)?;
        require_positive("viewport_height", self.viewport_height)?;
        require_positive("gravity", self.gravity)?;
        require_positive("ground_height", self.ground_height)?;
        require_fraction("ground_top_frac", self.ground_top_frac)?;
        require_positive("side_wall_thickness", self.side_wall_thickness)?;
        if self.obstacles.is_empty() {
            return Err(GameError::UnsafeConstant {
                name: "obstacles",
                value: 0.0,
                safe_range: "at least one entry",
            });
        }
        for obstacle in &self.obstacles {
            require_fraction("obstacles.x_frac", obstacle.x_frac)?;
            require_fraction("obstacles.width_frac", obstacle.width_frac)?;
            require_fraction("obstacles.height_frac", obstacle.height_frac)?;
        }
        require_fraction("goal_width_frac", self.goal_width_frac)?;
        require_fraction("goal_height_frac", self.goal_height_frac)?;
        require_fraction("goal_x_frac", self.goal_x_frac)?;
        require_fraction("launcher_pivot_x_frac", self.launcher_pivot_x_frac)?;
        require_positive("launcher_height", self.launcher_height)?;
        require_positive("launcher_max_back", self.launcher_max_back)?;
        require_positive("launcher_max_front", self.launcher_max_front)?;
        require_positive("drag_sensitivity", self.drag_sensitivity)?;
        require_unit_open("spring_back_decay", self.spring_back_decay)?;
        require_positive("spring_back_epsilon", self.spring_back_epsilon)?;
        require_positive("launch_power", self.launch_power)?;
        require_positive("projectile_radius", self.projectile_radius)?;
        require_positive("projectile_density", self.projectile_density)?;
        require_fraction("projectile_restitution", self.projectile_restitution)?;
        require_positive("preview_dt", self.preview_dt)?;
        if self.preview_dot_stride == 0 {
            return Err(GameError::UnsafeConstant {
                name: "preview_dot_stride",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// A missing file is not an error.  Parse failures and values rejected by
/// [`GameConfig::validate`] are logged and the compiled defaults stay in place.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let contents = match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => contents,
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
            return;
        }
    };

    match GameConfig::from_toml_str(CONFIG_PATH, &contents).and_then(|loaded| {
        loaded.validate()?;
        Ok(loaded)
    }) {
        Ok(loaded) => {
            *config = loaded;
            info!("Loaded game config from {CONFIG_PATH}");
        }
        Err(e) => warn!("{e}; using defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("test.toml", "ragdoll_enabled = false\ngravity = 500.0")
            .expect("valid toml");
        assert!(!cfg.ragdoll_enabled);
        assert_eq!(cfg.gravity, 500.0);
        assert_eq!(cfg.launch_power, LAUNCH_POWER);
        assert!(cfg.goal_sensor_enabled);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("bad.toml", "gravity = \"lots\"").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { .. }));
    }

    #[test]
    fn obstacle_list_parses_from_array_of_tables() {
        let contents = "[[obstacles]]\nx_frac = 0.75\nwidth_frac = 0.08\nheight_frac = 0.13\n\n\
                    [[obstacles]]\nx_frac = 0.85\nwidth_frac = 0.07\nheight_frac = 0.5\n";
        let cfg = GameConfig::from_toml_str("test.toml", contents).expect("valid toml");
        assert_eq!(cfg.obstacles.len(), 2);
        assert_eq!(cfg.obstacles[1].height_frac, 0.5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_obstacle_list_is_rejected() {
        let cfg = GameConfig {
            obstacles: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GameError::UnsafeConstant { name: "obstacles", .. })
        ));
    }

    #[test]
    fn decay_outside_unit_interval_is_rejected() {
        let cfg = GameConfig {
            spring_back_decay: 7.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GameError::UnsafeConstant {
                name: "spring_back_decay",
                ..
            })
        ));
    }
}
