//! Headless tests of the full throw cycle through [`CatapultPlugin`].
//!
//! These tests use [`MinimalPlugins`] with no window, renderer, or Rapier
//! pipeline.  Pointer input is driven by inserting [`PointerInput`] directly
//! and contacts by writing `CollisionEvent`s, so every step is deterministic.
//!
//! Covered scenarios:
//! 1. Startup builds the scene with one launcher and one attached projectile.
//! 2. Drag, release, ragdoll transition, goal contact → victory.
//! 3. Full pull-back crosses the obstacle edge → score +1 before any hit.
//! 4. Obstacle contact → failed after the grace delay.
//! 5. Reset restores the rest bend, a fresh attached projectile, and keeps score.
//! 6. A resize in flight when the ragdoll comes due still gets the ragdoll.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use catapult::config::GameConfig;
use catapult::launcher::{tip_position, LauncherPhase, LauncherState, PointerInput, Projectile};
use catapult::outcome::{Outcome, OutcomeStatus};
use catapult::ragdoll::{RagdollSegment, SEGMENTS};
use catapult::scene::{ResizeState, SceneBody, SceneLayout};
use catapult::session::{ResetRequest, ThrowSession};
use catapult::simulation::CatapultPlugin;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build the headless app and run startup.  Delays are zeroed afterwards so
/// scheduled events fire on the next frame; auto-reset is pushed far out.
fn build_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, CatapultPlugin));
    app.update();

    let mut config = app.world_mut().resource_mut::<GameConfig>();
    config.ragdoll_spawn_delay_secs = 0.0;
    config.failure_grace_secs = 0.0;
    config.auto_reset_secs = 1_000.0;
    app
}

fn pointer(app: &mut App, input: PointerInput) {
    app.insert_resource(input);
    app.update();
}

/// Grab the projectile, pull to `pointer_x`, and let go.
fn throw(app: &mut App, pointer_x: f32) {
    let layout = app.world().resource::<SceneLayout>().clone();
    let config = app.world().resource::<GameConfig>().clone();
    let tip = tip_position(layout.pivot, &config, 0.0);

    pointer(
        app,
        PointerInput {
            pressed: true,
            just_pressed: true,
            just_released: false,
            world_pos: Some(tip),
        },
    );
    pointer(
        app,
        PointerInput {
            pressed: true,
            just_pressed: false,
            just_released: false,
            world_pos: Some(Vec2::new(pointer_x, tip.y)),
        },
    );
    pointer(
        app,
        PointerInput {
            pressed: false,
            just_pressed: false,
            just_released: true,
            world_pos: None,
        },
    );
    app.insert_resource(PointerInput::default());
}

fn entities_with<T: Component>(app: &mut App) -> Vec<Entity> {
    app.world_mut()
        .query_filtered::<Entity, With<T>>()
        .iter(app.world())
        .collect()
}

fn scene_body(app: &mut App, kind: SceneBody) -> Entity {
    app.world_mut()
        .query::<(Entity, &SceneBody)>()
        .iter(app.world())
        .find_map(|(e, k)| (*k == kind).then_some(e))
        .expect("scene body present")
}

fn contact(app: &mut App, a: Entity, b: Entity) {
    app.world_mut()
        .write_message(CollisionEvent::Started(a, b, CollisionEventFlags::empty()));
    app.update();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_builds_scene_with_attached_projectile() {
    let mut app = build_app();
    assert_eq!(entities_with::<Projectile>(&mut app).len(), 1);
    let projectile = entities_with::<Projectile>(&mut app)[0];
    assert!(app.world().get::<ImpulseJoint>(projectile).is_some());

    let kinds: Vec<SceneBody> = app
        .world_mut()
        .query::<&SceneBody>()
        .iter(app.world())
        .copied()
        .collect();
    assert!(kinds.contains(&SceneBody::Ground));
    assert!(kinds.contains(&SceneBody::Obstacle(0)));
    assert!(kinds.contains(&SceneBody::LeftWall));
    assert!(kinds.contains(&SceneBody::RightWall));
    assert!(kinds.contains(&SceneBody::GoalSensor));
}

#[test]
fn throw_turns_into_ragdoll_and_wins_in_goal() {
    let mut app = build_app();
    let pivot_x = app.world().resource::<SceneLayout>().pivot.x;
    throw(&mut app, pivot_x - 10_000.0);

    assert!(app.world().resource::<ThrowSession>().launched);
    // A zero delay fires in the release frame.
    app.update();

    assert!(entities_with::<Projectile>(&mut app).is_empty());
    let segments = entities_with::<RagdollSegment>(&mut app);
    assert_eq!(segments.len(), SEGMENTS.len());

    let goal = scene_body(&mut app, SceneBody::GoalSensor);
    contact(&mut app, segments[0], goal);
    assert_eq!(app.world().resource::<Outcome>().status, OutcomeStatus::Victory);
}

#[test]
fn full_pull_back_crosses_obstacle_for_a_point() {
    let mut app = build_app();
    app.world_mut().resource_mut::<GameConfig>().ragdoll_enabled = false;
    let layout = app.world().resource::<SceneLayout>().clone();
    throw(&mut app, layout.pivot.x - 10_000.0);

    // No physics pipeline here; carry the projectile past the edge by hand.
    let projectile = entities_with::<Projectile>(&mut app)[0];
    app.world_mut()
        .get_mut::<Transform>(projectile)
        .expect("projectile transform")
        .translation = Vec3::new(layout.obstacle_near_edge() + 1.0, 450.0, 1.0);
    app.update();

    assert_eq!(app.world().resource::<Outcome>().score, 1);
    assert!(app.world().resource::<ThrowSession>().crossed_obstacle);
}

#[test]
fn obstacle_contact_fails_after_grace_delay() {
    let mut app = build_app();
    app.world_mut().resource_mut::<GameConfig>().ragdoll_enabled = false;
    let pivot_x = app.world().resource::<SceneLayout>().pivot.x;
    throw(&mut app, pivot_x - 10_000.0);

    let projectile = entities_with::<Projectile>(&mut app)[0];
    let obstacle = scene_body(&mut app, SceneBody::Obstacle(0));
    contact(&mut app, obstacle, projectile);
    app.update();

    let outcome = *app.world().resource::<Outcome>();
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.score, -1);
}

#[test]
fn reset_restores_launcher_and_keeps_score() {
    let mut app = build_app();
    let layout = app.world().resource::<SceneLayout>().clone();
    throw(&mut app, layout.pivot.x - 10_000.0);
    app.world_mut().resource_mut::<Outcome>().score = 4;
    let old_session = app.world().resource::<ThrowSession>().id;

    app.world_mut().write_message(ResetRequest);
    app.update();
    app.update();

    let state = *app.world().resource::<LauncherState>();
    assert_eq!(state.angle, state.rest_angle);
    assert_eq!(state.phase, LauncherPhase::Idle);

    let session = *app.world().resource::<ThrowSession>();
    assert_ne!(session.id, old_session);
    assert!(!session.launched);

    assert!(entities_with::<RagdollSegment>(&mut app).is_empty());
    let projectiles = entities_with::<Projectile>(&mut app);
    assert_eq!(projectiles.len(), 1);
    assert!(app.world().get::<ImpulseJoint>(projectiles[0]).is_some());

    let outcome = *app.world().resource::<Outcome>();
    assert_eq!(outcome.status, OutcomeStatus::InProgress);
    assert_eq!(outcome.score, 4);
}

#[test]
fn ragdoll_still_spawns_when_a_resize_is_in_flight() {
    let mut app = build_app();
    app.world_mut().resource_mut::<GameConfig>().ragdoll_spawn_delay_secs = 0.05;
    let pivot_x = app.world().resource::<SceneLayout>().pivot.x;
    throw(&mut app, pivot_x - 10_000.0);

    // A resize that outlasts the spawn delay and the message lifetime.
    app.insert_resource(ResizeState {
        pending: Some(Vec2::new(1200.0, 600.0)),
        settle_timer: 1_000.0,
    });
    std::thread::sleep(std::time::Duration::from_millis(80));
    for _ in 0..4 {
        app.update();
    }
    app.insert_resource(ResizeState::default());
    app.update();

    assert!(app.world().resource::<ThrowSession>().ragdoll_spawned);
    assert!(entities_with::<Projectile>(&mut app).is_empty());
    assert_eq!(entities_with::<RagdollSegment>(&mut app).len(), SEGMENTS.len());
}
