//! Launcher components, the bend state machine, and the launch geometry.
//!
//! Bend sign convention: positive leans the launcher forward (towards the
//! obstacle on the right), negative pulls it back.  The physical rotation of
//! the body is the negated bend because Bevy rotates counter-clockwise.

use crate::config::GameConfig;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

// ── Components ─────────────────────────────────────────────────────────────────

/// Marker for the pivoted launcher body.
#[derive(Component)]
pub struct Launcher;

/// Marker for the single projectile of the current throw.
///
/// While the throw has not launched, the projectile also carries the
/// `ImpulseJoint` that attaches it to the launcher tip.
#[derive(Component)]
pub struct Projectile;

// ── State machine ─────────────────────────────────────────────────────────────

/// Launcher phase: `Idle → Aiming → Releasing → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LauncherPhase {
    #[default]
    Idle,
    /// Pointer is held; the bend follows the pointer.
    Aiming,
    /// Pointer released; the bend decays geometrically back to rest.
    Releasing,
}

/// Current bend of the launcher and its limits.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LauncherState {
    /// Current bend (rad).
    pub angle: f32,
    /// Bend the launcher springs back to.
    pub rest_angle: f32,
    /// Largest backward bend, as a positive magnitude.
    pub max_back: f32,
    /// Largest forward lean.
    pub max_front: f32,
    pub phase: LauncherPhase,
}

impl Default for LauncherState {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl LauncherState {
    /// A launcher at rest with the configured limits.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            angle: 0.0,
            rest_angle: 0.0,
            max_back: config.launcher_max_back,
            max_front: config.launcher_max_front,
            phase: LauncherPhase::Idle,
        }
    }

    /// Clamp a bend to `[rest - max_back, rest + max_front]`.
    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.rest_angle - self.max_back, self.rest_angle + self.max_front)
    }

    /// Bend relative to rest.
    pub fn deflection(&self) -> f32 {
        self.angle - self.rest_angle
    }

    /// Enter `Aiming`.  Only valid from `Idle`; returns whether the drag began.
    pub fn begin_drag(&mut self) -> bool {
        if self.phase != LauncherPhase::Idle {
            return false;
        }
        self.phase = LauncherPhase::Aiming;
        true
    }

    /// Map the pointer's horizontal offset from the pivot to a clamped bend.
    pub fn drag_to(&mut self, pivot_x: f32, pointer_x: f32, sensitivity: f32) -> f32 {
        if self.phase == LauncherPhase::Aiming {
            self.angle = self.clamp(self.rest_angle + (pointer_x - pivot_x) * sensitivity);
        }
        self.angle
    }

    /// Leave `Aiming` and start springing back.  Returns the bend at release.
    pub fn release(&mut self) -> Option<f32> {
        if self.phase != LauncherPhase::Aiming {
            return None;
        }
        self.phase = LauncherPhase::Releasing;
        Some(self.angle)
    }

    /// One spring-back step.  Returns `true` on the step that reaches rest.
    ///
    /// The deflection shrinks by `decay` each step and snaps exactly to rest
    /// once it falls under `epsilon`.
    pub fn spring_back_step(&mut self, decay: f32, epsilon: f32) -> bool {
        if self.phase != LauncherPhase::Releasing {
            return false;
        }
        let next = self.deflection() * decay;
        if next.abs() < epsilon {
            self.angle = self.rest_angle;
            self.phase = LauncherPhase::Idle;
            true
        } else {
            self.angle = self.rest_angle + next;
            false
        }
    }

    /// Snap back to rest and `Idle` regardless of the current phase.
    pub fn reset(&mut self) {
        self.angle = self.rest_angle;
        self.phase = LauncherPhase::Idle;
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Body rotation (counter-clockwise radians) for a given bend.
#[inline]
pub fn body_rotation(bend: f32) -> f32 {
    -bend
}

/// Launcher body transform: the bottom edge stays on `pivot`.
pub fn launcher_pose(pivot: Vec2, height: f32, bend: f32) -> Transform {
    let rotation = Rot2::radians(body_rotation(bend));
    let center = pivot + rotation * Vec2::new(0.0, height * 0.5);
    Transform::from_translation(center.extend(0.0))
        .with_rotation(Quat::from_rotation_z(body_rotation(bend)))
}

/// Projectile attachment point in the launcher's local frame.
pub fn tip_local_anchor(config: &GameConfig) -> Vec2 {
    Vec2::new(0.0, config.launcher_height * 0.5 + config.projectile_radius)
}

/// World position of the projectile while it rides the launcher tip.
pub fn tip_position(pivot: Vec2, config: &GameConfig, bend: f32) -> Vec2 {
    let rotation = Rot2::radians(body_rotation(bend));
    pivot + rotation * Vec2::new(0.0, config.launcher_height + config.projectile_radius)
}

/// Launch velocity for a release at `bend`.
///
/// Horizontal speed is opposite in sign to the bend and linear in its
/// magnitude; the vertical component always points up.  No spin is imparted.
pub fn launch_velocity(bend: f32, config: &GameConfig) -> Velocity {
    let power = config.launch_power * bend;
    Velocity::linear(Vec2::new(-power, power.abs() * config.launch_upward_bias))
}

/// Does a pointer press at `pointer` grab the launcher or its projectile?
pub fn grab_hit(
    pointer: Vec2,
    projectile: Vec2,
    launcher: &Transform,
    config: &GameConfig,
) -> bool {
    if pointer.distance(projectile) <= config.grab_radius {
        return true;
    }
    let local = launcher
        .rotation
        .inverse()
        .mul_vec3((pointer - launcher.translation.truncate()).extend(0.0))
        .truncate();
    local.x.abs() <= config.launcher_width * 0.5 && local.y.abs() <= config.launcher_height * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LauncherState {
        LauncherState::from_config(&GameConfig::default())
    }

    #[test]
    fn drag_is_ignored_unless_aiming() {
        let mut s = state();
        s.drag_to(150.0, 50.0, 0.01);
        assert_eq!(s.angle, 0.0);
    }

    #[test]
    fn drag_clamps_to_asymmetric_range() {
        let mut s = state();
        assert!(s.begin_drag());
        let back = s.drag_to(150.0, -10_000.0, 0.01);
        assert!((back + s.max_back).abs() < 1e-6);
        let front = s.drag_to(150.0, 10_000.0, 0.01);
        assert!((front - s.max_front).abs() < 1e-6);
        assert!(s.max_back > s.max_front);
    }

    #[test]
    fn drag_maps_offset_linearly() {
        let mut s = state();
        s.begin_drag();
        let angle = s.drag_to(150.0, 120.0, 0.01);
        assert!((angle + 0.3).abs() < 1e-6, "got {angle}");
    }

    #[test]
    fn begin_drag_rejected_while_releasing() {
        let mut s = state();
        s.begin_drag();
        s.drag_to(150.0, 100.0, 0.01);
        s.release();
        assert!(!s.begin_drag());
    }

    #[test]
    fn release_returns_bend_and_enters_releasing() {
        let mut s = state();
        assert_eq!(s.release(), None);
        s.begin_drag();
        s.drag_to(150.0, 100.0, 0.01);
        assert_eq!(s.release(), Some(-0.5));
        assert_eq!(s.phase, LauncherPhase::Releasing);
    }

    #[test]
    fn spring_back_decays_then_snaps_to_rest() {
        let mut s = state();
        s.begin_drag();
        s.drag_to(150.0, 100.0, 0.01);
        s.release();

        assert!(!s.spring_back_step(0.7, 0.01));
        assert!((s.angle + 0.35).abs() < 1e-6);

        let mut steps = 1;
        while !s.spring_back_step(0.7, 0.01) {
            steps += 1;
            assert!(steps < 100, "spring-back never settled");
        }
        assert_eq!(s.angle, s.rest_angle);
        assert_eq!(s.phase, LauncherPhase::Idle);
    }

    #[test]
    fn reset_restores_exact_rest_angle() {
        let mut s = state();
        s.begin_drag();
        s.drag_to(150.0, 37.0, 0.01);
        s.reset();
        assert_eq!(s.angle, s.rest_angle);
        assert_eq!(s.phase, LauncherPhase::Idle);
    }

    #[test]
    fn launch_velocity_opposes_bend_and_scales_linearly() {
        let cfg = GameConfig::default();
        for bend in [-cfg.launcher_max_back, -0.4, -0.1, 0.05, cfg.launcher_max_front] {
            let v = launch_velocity(bend, &cfg);
            assert!(v.linvel.x.signum() == -bend.signum(), "bend {bend}: {:?}", v.linvel);
            assert!(v.linvel.y > 0.0, "vertical component must point up");
            assert!((v.linvel.x.abs() - cfg.launch_power * bend.abs()).abs() < 1e-3);
            assert_eq!(v.angvel, 0.0, "release imparts no spin");
        }
        let a = launch_velocity(-0.2, &cfg).linvel.length();
        let b = launch_velocity(-0.4, &cfg).linvel.length();
        assert!((b - 2.0 * a).abs() < 1e-3);
    }

    #[test]
    fn zero_bend_launches_nothing() {
        let v = launch_velocity(0.0, &GameConfig::default());
        assert_eq!(v.linvel, Vec2::ZERO);
    }

    #[test]
    fn pose_keeps_base_on_pivot() {
        let pivot = Vec2::new(150.0, 35.0);
        for bend in [-1.0, 0.0, 0.17] {
            let pose = launcher_pose(pivot, 150.0, bend);
            let base = pose.translation.truncate()
                + pose.rotation.mul_vec3(Vec3::new(0.0, -75.0, 0.0)).truncate();
            assert!((base - pivot).length() < 1e-3, "bend {bend}: base {base:?}");
        }
    }

    #[test]
    fn pulled_back_tip_moves_left() {
        let cfg = GameConfig::default();
        let pivot = Vec2::new(150.0, 35.0);
        let rest = tip_position(pivot, &cfg, 0.0);
        let back = tip_position(pivot, &cfg, -0.5);
        assert!((rest.x - pivot.x).abs() < 1e-4);
        assert!(back.x < rest.x);
    }

    #[test]
    fn tip_matches_pose_and_local_anchor() {
        let cfg = GameConfig::default();
        let pivot = Vec2::new(150.0, 35.0);
        let bend = -0.6;
        let pose = launcher_pose(pivot, cfg.launcher_height, bend);
        let via_anchor = pose.translation.truncate()
            + pose.rotation.mul_vec3(tip_local_anchor(&cfg).extend(0.0)).truncate();
        assert!((via_anchor - tip_position(pivot, &cfg, bend)).length() < 1e-3);
    }

    #[test]
    fn grab_hits_projectile_and_launcher_body_only() {
        let cfg = GameConfig::default();
        let pivot = Vec2::new(150.0, 35.0);
        let pose = launcher_pose(pivot, cfg.launcher_height, 0.0);
        let tip = tip_position(pivot, &cfg, 0.0);
        assert!(grab_hit(tip + Vec2::new(10.0, 0.0), tip, &pose, &cfg));
        assert!(grab_hit(pivot + Vec2::new(0.0, 20.0), tip, &pose, &cfg));
        assert!(!grab_hit(Vec2::new(900.0, 300.0), tip, &pose, &cfg));
    }
}
