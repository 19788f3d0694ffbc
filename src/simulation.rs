//! Catapult plugins and frame ordering for Bevy ECS.
//!
//! [`CatapultPlugin`] carries the whole throw cycle and needs no window,
//! renderer, or input devices, so tests run it under `MinimalPlugins` and
//! drive [`PointerInput`](crate::launcher::PointerInput) directly.
//! [`CatapultViewPlugin`] adds the device input, camera, gizmos, and HUD.
//!
//! Per frame, in [`CatapultSet`] order:
//!
//! | Set | Systems |
//! |-----|---------|
//! | `Input` | pointer clear → mouse → touch, reset key |
//! | `Resize` | resize request → resize apply (always runs) |
//! | `Launcher` | drag → pin → spring-back → pose → trajectory preview |
//! | `Schedule` | schedule tick → ragdoll transition → failure commit |
//! | `Outcome` | collisions → boundary crossing → off-screen cleanup |
//! | `Reset` | reset throw |
//! | `Render` | camera follow, gizmos, HUD |
//!
//! Launcher and outcome sets are gated on [`scene_settled`] so nothing steps
//! against a half-applied layout.  The schedule set always runs: a fired
//! `ScheduledFired` lives for two frames only, so its readers must not be
//! gated by a resize that can outlast it.

use crate::config::{load_game_config, GameConfig};
use crate::graphics::{camera_follow_layout_system, setup_camera};
use crate::launcher::{
    launcher_drag_system, launcher_pose_system, launcher_spring_back_system,
    mouse_to_pointer_system, pointer_clear_system, projectile_pin_system, reset_key_system,
    touch_to_pointer_system, LauncherState, PointerInput,
};
use crate::outcome::{
    boundary_crossing_system, collision_outcome_system, commit_failure_system,
    offscreen_cleanup_system, Outcome,
};
use crate::ragdoll::ragdoll_transition_system;
use crate::rendering::{gizmo_rendering_system, hud_status_display_system, setup_hud_status};
use crate::scene::{
    resize_apply_system, resize_request_system, scene_settled, spawn_scene, ResizeState,
    SceneLayout,
};
use crate::session::{
    reset_throw_system, schedule_tick_system, EventSchedule, ResetRequest, ScheduledFired,
    ThrowSession,
};
use crate::trajectory::{trajectory_preview_system, TrajectoryPreview};
use bevy::prelude::*;
use bevy::window::WindowResized;
use bevy_rapier2d::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatapultSet {
    Input,
    Resize,
    Launcher,
    Schedule,
    Outcome,
    Reset,
    Render,
}

pub struct CatapultPlugin;

impl Plugin for CatapultPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<SceneLayout>()
            .init_resource::<LauncherState>()
            .init_resource::<PointerInput>()
            .init_resource::<ThrowSession>()
            .init_resource::<EventSchedule>()
            .init_resource::<Outcome>()
            .init_resource::<TrajectoryPreview>()
            .init_resource::<ResizeState>()
            .add_message::<ScheduledFired>()
            .add_message::<ResetRequest>()
            // Normally registered by the window and Rapier plugins.
            .add_message::<WindowResized>()
            .add_message::<CollisionEvent>()
            .configure_sets(
                Update,
                (
                    CatapultSet::Input,
                    CatapultSet::Resize,
                    CatapultSet::Launcher,
                    CatapultSet::Schedule,
                    CatapultSet::Outcome,
                    CatapultSet::Reset,
                    CatapultSet::Render,
                )
                    .chain(),
            )
            .add_systems(
                Startup,
                (
                    // Load config first so every other startup system sees the final values.
                    load_game_config,
                    (spawn_scene, setup_gravity_system).after(load_game_config),
                ),
            )
            .add_systems(
                Update,
                (
                    (resize_request_system, resize_apply_system)
                        .chain()
                        .in_set(CatapultSet::Resize),
                    (
                        launcher_drag_system,
                        projectile_pin_system,
                        launcher_spring_back_system,
                        launcher_pose_system,
                        trajectory_preview_system,
                    )
                        .chain()
                        .in_set(CatapultSet::Launcher)
                        .run_if(scene_settled),
                    (
                        schedule_tick_system,
                        ragdoll_transition_system,
                        commit_failure_system,
                    )
                        .chain()
                        .in_set(CatapultSet::Schedule),
                    (
                        collision_outcome_system,
                        boundary_crossing_system,
                        offscreen_cleanup_system,
                    )
                        .chain()
                        .in_set(CatapultSet::Outcome)
                        .run_if(scene_settled),
                    reset_throw_system.in_set(CatapultSet::Reset),
                ),
            );
    }
}

/// Input devices, camera, gizmos, and HUD.
pub struct CatapultViewPlugin;

impl Plugin for CatapultViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                setup_camera.after(spawn_scene),
                setup_hud_status.after(load_game_config),
            ),
        )
        .add_systems(
            Update,
            (
                (
                    pointer_clear_system,
                    mouse_to_pointer_system,
                    touch_to_pointer_system,
                )
                    .chain(),
                reset_key_system,
            )
                .in_set(CatapultSet::Input),
        )
        .add_systems(
            Update,
            (
                camera_follow_layout_system,
                gizmo_rendering_system,
                hud_status_display_system,
            )
                .in_set(CatapultSet::Render),
        );
    }
}

/// Point Rapier's gravity straight down at the configured magnitude.
pub fn setup_gravity_system(config: Res<GameConfig>, mut rapier: Query<&mut RapierConfiguration>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity);
    }
}
