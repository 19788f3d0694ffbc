//! Launcher systems: drag-to-aim, release, spring-back, posing, and pinning.
//!
//! Ordering inside a frame (see `CatapultPlugin`):
//! `launcher_drag_system → projectile_pin_system → launcher_spring_back_system
//! → launcher_pose_system`.  Release reads the bend before spring-back has
//! touched it, and the launched flag is set before the pin system runs, so the
//! projectile is never dragged back onto the tip after launch.

use super::state::{
    grab_hit, launch_velocity, launcher_pose, tip_position, Launcher, LauncherPhase,
    LauncherState, Projectile,
};
use super::PointerInput;
use crate::config::GameConfig;
use crate::scene::SceneLayout;
use crate::session::{EventSchedule, ScheduledKind, ThrowSession};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Start, update, and end a drag from [`PointerInput`].
///
/// On release the projectile receives the launch velocity for the bend at
/// release, loses its attachment joint, and the ragdoll spawn and auto-reset
/// are scheduled under the current session.  A release with less than
/// `min_launch_angle` of deflection cancels the throw instead.
#[allow(clippy::too_many_arguments)]
pub fn launcher_drag_system(
    mut commands: Commands,
    pointer: Res<PointerInput>,
    mut state: ResMut<LauncherState>,
    mut session: ResMut<ThrowSession>,
    mut schedule: ResMut<EventSchedule>,
    config: Res<GameConfig>,
    layout: Res<SceneLayout>,
    q_launcher: Query<&Transform, (With<Launcher>, Without<Projectile>)>,
    mut q_projectile: Query<(Entity, &Transform, &mut Velocity), With<Projectile>>,
) {
    match state.phase {
        LauncherPhase::Idle => {
            if !pointer.just_pressed || session.launched {
                return;
            }
            let (Some(pos), Ok(launcher), Ok((_, projectile, _))) =
                (pointer.world_pos, q_launcher.single(), q_projectile.single())
            else {
                return;
            };
            if grab_hit(pos, projectile.translation.truncate(), launcher, &config) && state.begin_drag()
            {
                debug!("Drag started at {pos:?}");
            }
        }
        LauncherPhase::Aiming => {
            if pointer.pressed && !pointer.just_released {
                if let Some(pos) = pointer.world_pos {
                    state.drag_to(layout.pivot.x, pos.x, config.drag_sensitivity);
                }
                return;
            }

            let Some(bend) = state.release() else {
                return;
            };
            let deflection = bend - state.rest_angle;
            if deflection.abs() < config.min_launch_angle {
                debug!("Release at {deflection:.3} rad is below launch threshold; throw cancelled");
                return;
            }
            let Ok((entity, _, mut velocity)) = q_projectile.single_mut() else {
                warn!("Release with no projectile on the launcher");
                return;
            };

            *velocity = launch_velocity(deflection, &config);
            commands.entity(entity).try_remove::<ImpulseJoint>();
            session.launched = true;
            if config.ragdoll_enabled {
                schedule.schedule(
                    session.id,
                    config.ragdoll_spawn_delay_secs,
                    ScheduledKind::SpawnRagdoll,
                );
            }
            schedule.schedule(session.id, config.auto_reset_secs, ScheduledKind::AutoReset);
            info!(
                "Launched at {:.3} rad with velocity {:?} (session {})",
                deflection, velocity.linvel, session.id
            );
        }
        LauncherPhase::Releasing => {}
    }
}

/// Decay the bend back to rest after a release.
pub fn launcher_spring_back_system(mut state: ResMut<LauncherState>, config: Res<GameConfig>) {
    if state.spring_back_step(config.spring_back_decay, config.spring_back_epsilon) {
        debug!("Launcher back at rest");
    }
}

/// Place the kinematic launcher body from the current bend.
pub fn launcher_pose_system(
    state: Res<LauncherState>,
    layout: Res<SceneLayout>,
    config: Res<GameConfig>,
    mut q_launcher: Query<&mut Transform, With<Launcher>>,
) {
    for mut transform in q_launcher.iter_mut() {
        *transform = launcher_pose(layout.pivot, config.launcher_height, state.angle);
    }
}

/// Hold an unlaunched projectile on the launcher tip with zero velocity.
pub fn projectile_pin_system(
    state: Res<LauncherState>,
    session: Res<ThrowSession>,
    layout: Res<SceneLayout>,
    config: Res<GameConfig>,
    mut q_projectile: Query<(&mut Transform, &mut Velocity), With<Projectile>>,
) {
    if session.launched {
        return;
    }
    let tip = tip_position(layout.pivot, &config, state.angle);
    for (mut transform, mut velocity) in q_projectile.iter_mut() {
        transform.translation = tip.extend(transform.translation.z);
        *velocity = Velocity::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let config = GameConfig::default();
        let layout = SceneLayout::compute(Vec2::new(1200.0, 600.0), &config);
        app.insert_resource(LauncherState::from_config(&config));
        app.insert_resource(layout);
        app.insert_resource(config);
        app.insert_resource(PointerInput::default());
        app.insert_resource(ThrowSession::default());
        app.insert_resource(EventSchedule::default());
        app.add_systems(
            Update,
            (
                launcher_drag_system,
                projectile_pin_system,
                launcher_spring_back_system,
                launcher_pose_system,
            )
                .chain(),
        );
        app
    }

    fn spawn_rig(app: &mut App) -> Entity {
        let config = app.world().resource::<GameConfig>().clone();
        let layout = app.world().resource::<SceneLayout>().clone();
        app.world_mut()
            .spawn((Launcher, launcher_pose(layout.pivot, config.launcher_height, 0.0)));
        app.world_mut()
            .spawn((
                Projectile,
                Transform::from_translation(tip_position(layout.pivot, &config, 0.0).extend(1.0)),
                Velocity::zero(),
            ))
            .id()
    }

    fn press(app: &mut App, pos: Vec2, just_pressed: bool) {
        app.insert_resource(PointerInput {
            pressed: true,
            just_pressed,
            just_released: false,
            world_pos: Some(pos),
        });
        app.update();
    }

    fn release(app: &mut App) {
        app.insert_resource(PointerInput {
            pressed: false,
            just_pressed: false,
            just_released: true,
            world_pos: None,
        });
        app.update();
    }

    #[test]
    fn press_away_from_launcher_does_not_aim() {
        let mut app = build_test_app();
        spawn_rig(&mut app);
        press(&mut app, Vec2::new(900.0, 400.0), true);
        assert_eq!(app.world().resource::<LauncherState>().phase, LauncherPhase::Idle);
    }

    #[test]
    fn drag_bends_launcher_and_projectile_follows_tip() {
        let mut app = build_test_app();
        let projectile = spawn_rig(&mut app);
        let layout = app.world().resource::<SceneLayout>().clone();
        let config = app.world().resource::<GameConfig>().clone();
        let tip = tip_position(layout.pivot, &config, 0.0);

        press(&mut app, tip, true);
        press(&mut app, Vec2::new(layout.pivot.x - 50.0, tip.y), false);

        let state = *app.world().resource::<LauncherState>();
        assert_eq!(state.phase, LauncherPhase::Aiming);
        assert!((state.angle + 0.5).abs() < 1e-5, "angle {}", state.angle);

        let pos = app.world().get::<Transform>(projectile).unwrap().translation.truncate();
        let expected = tip_position(layout.pivot, &config, state.angle);
        assert!((pos - expected).length() < 1e-3, "projectile at {pos:?}, tip {expected:?}");
    }

    #[test]
    fn release_launches_and_schedules_follow_ups() {
        let mut app = build_test_app();
        let projectile = spawn_rig(&mut app);
        let layout = app.world().resource::<SceneLayout>().clone();
        let config = app.world().resource::<GameConfig>().clone();
        let tip = tip_position(layout.pivot, &config, 0.0);

        press(&mut app, tip, true);
        press(&mut app, Vec2::new(layout.pivot.x - 10_000.0, tip.y), false);
        release(&mut app);

        let session = *app.world().resource::<ThrowSession>();
        assert!(session.launched);
        let vel = app.world().get::<Velocity>(projectile).unwrap().linvel;
        let expected = launch_velocity(-config.launcher_max_back, &config).linvel;
        assert!((vel - expected).length() < 1e-3, "got {vel:?}");
        assert!(vel.x > 0.0 && vel.y > 0.0);

        let schedule = app.world().resource::<EventSchedule>();
        assert_eq!(schedule.pending(ScheduledKind::SpawnRagdoll), 1);
        assert_eq!(schedule.pending(ScheduledKind::AutoReset), 1);

        let state = *app.world().resource::<LauncherState>();
        assert_eq!(state.phase, LauncherPhase::Releasing);
        assert!(state.angle.abs() < config.launcher_max_back, "spring-back should have started");
    }

    #[test]
    fn tiny_release_cancels_throw() {
        let mut app = build_test_app();
        spawn_rig(&mut app);
        let layout = app.world().resource::<SceneLayout>().clone();
        let config = app.world().resource::<GameConfig>().clone();
        let tip = tip_position(layout.pivot, &config, 0.0);

        press(&mut app, tip, true);
        press(&mut app, Vec2::new(layout.pivot.x - 1.0, tip.y), false);
        release(&mut app);

        assert!(!app.world().resource::<ThrowSession>().launched);
        assert!(app.world().resource::<EventSchedule>().is_empty());
    }

    #[test]
    fn spring_back_eventually_returns_to_idle_at_rest() {
        let mut app = build_test_app();
        spawn_rig(&mut app);
        let layout = app.world().resource::<SceneLayout>().clone();
        let config = app.world().resource::<GameConfig>().clone();
        let tip = tip_position(layout.pivot, &config, 0.0);

        press(&mut app, tip, true);
        press(&mut app, Vec2::new(layout.pivot.x - 60.0, tip.y), false);
        release(&mut app);
        for _ in 0..30 {
            app.insert_resource(PointerInput::default());
            app.update();
        }

        let state = *app.world().resource::<LauncherState>();
        assert_eq!(state.phase, LauncherPhase::Idle);
        assert_eq!(state.angle, state.rest_angle);
    }

    #[test]
    fn launched_projectile_is_not_pinned() {
        let mut app = build_test_app();
        let projectile = spawn_rig(&mut app);
        app.world_mut().resource_mut::<ThrowSession>().launched = true;
        app.world_mut().get_mut::<Transform>(projectile).unwrap().translation = Vec3::new(500.0, 300.0, 1.0);

        app.update();

        let pos = app.world().get::<Transform>(projectile).unwrap().translation;
        assert_eq!(pos, Vec3::new(500.0, 300.0, 1.0));
    }
}
