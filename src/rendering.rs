//! Gizmo drawing of the physics world and the status HUD.
//!
//! Every body is drawn from its collider dimensions each frame; nothing here
//! owns a mesh or a sprite.

use crate::config::GameConfig;
use crate::launcher::{tip_position, Launcher, LauncherState, Projectile};
use crate::outcome::{Outcome, OutcomeStatus};
use crate::ragdoll::{RagdollSegment, SegmentShape, SEGMENTS};
use crate::scene::{SceneBody, SceneLayout};
use crate::session::ThrowSession;
use crate::trajectory::TrajectoryPreview;
use bevy::prelude::*;

/// Marker for the score / status HUD root node.
#[derive(Component)]
pub struct HudStatusDisplay;

fn ground_color() -> Color {
    Color::srgb(0.35, 0.55, 0.3)
}
fn obstacle_color() -> Color {
    Color::srgb(0.75, 0.35, 0.25)
}
fn goal_color() -> Color {
    Color::srgba(0.3, 0.9, 0.4, 0.6)
}
fn launcher_color() -> Color {
    Color::srgb(0.6, 0.45, 0.3)
}
fn thrown_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}

// ── Update: world gizmos ──────────────────────────────────────────────────────

/// Draw scene bodies, the launcher, thrown bodies, and the predicted path.
#[allow(clippy::too_many_arguments)]
pub fn gizmo_rendering_system(
    mut gizmos: Gizmos,
    layout: Res<SceneLayout>,
    config: Res<GameConfig>,
    state: Res<LauncherState>,
    session: Res<ThrowSession>,
    preview: Res<TrajectoryPreview>,
    q_scene: Query<&SceneBody>,
    q_launcher: Query<&Transform, With<Launcher>>,
    q_projectile: Query<&Transform, With<Projectile>>,
    q_segments: Query<(&Transform, &RagdollSegment)>,
) {
    // ── Static bodies ─────────────────────────────────────────────────────────
    for kind in q_scene.iter() {
        let (center, size) = layout.placement(*kind);
        match kind {
            SceneBody::Ground => gizmos.rect_2d(center, size, ground_color()),
            SceneBody::Obstacle(_) => gizmos.rect_2d(center, size, obstacle_color()),
            SceneBody::GoalSensor => gizmos.rect_2d(center, size, goal_color()),
            SceneBody::LauncherAnchor => {
                gizmos.circle_2d(center, 4.0, launcher_color());
            }
            // Outside the viewport.
            SceneBody::LeftWall | SceneBody::RightWall => {}
        }
    }

    // ── Launcher ──────────────────────────────────────────────────────────────
    let launcher_size = Vec2::new(config.launcher_width, config.launcher_height);
    for transform in q_launcher.iter() {
        let angle = transform.rotation.to_euler(EulerRot::XYZ).2;
        gizmos.rect_2d(
            Isometry2d::new(transform.translation.truncate(), Rot2::radians(angle)),
            launcher_size,
            launcher_color(),
        );
    }

    // ── Projectile and its attachment ─────────────────────────────────────────
    let tip = tip_position(layout.pivot, &config, state.angle);
    for transform in q_projectile.iter() {
        let pos = transform.translation.truncate();
        gizmos.circle_2d(pos, config.projectile_radius, thrown_color());
        if !session.launched {
            gizmos.line_2d(tip, pos, Color::srgba(1.0, 1.0, 1.0, 0.4));
        }
    }

    // ── Ragdoll segments ──────────────────────────────────────────────────────
    for (transform, segment) in q_segments.iter() {
        let Some(spec) = SEGMENTS.iter().find(|s| s.part == segment.part) else {
            continue;
        };
        let pos = transform.translation.truncate();
        match spec.shape {
            SegmentShape::Circle { radius } => {
                gizmos.circle_2d(pos, radius, thrown_color());
            }
            SegmentShape::Rect { width, height } => {
                let angle = transform.rotation.to_euler(EulerRot::XYZ).2;
                gizmos.rect_2d(
                    Isometry2d::new(pos, Rot2::radians(angle)),
                    Vec2::new(width, height),
                    thrown_color(),
                );
            }
        }
    }

    // ── Predicted path ────────────────────────────────────────────────────────
    for point in preview.points.iter().step_by(config.preview_dot_stride.max(1)) {
        gizmos.circle_2d(*point, 2.0, Color::srgba(1.0, 1.0, 1.0, 0.7));
    }
}

// ── Startup: status HUD ───────────────────────────────────────────────────────

/// Spawn the permanent top-left status HUD.
pub fn setup_hud_status(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudStatusDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(status_line(&Outcome::default(), &ThrowSession::default(), &config)),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
            ));
        });
}

/// HUD text for the current outcome and session.
pub fn status_line(outcome: &Outcome, session: &ThrowSession, config: &GameConfig) -> String {
    let mut line = String::new();
    if config.scoring_enabled {
        line.push_str(&format!("Score: {}", outcome.score));
    }
    let status = match outcome.status {
        OutcomeStatus::Victory => Some("VICTORY!"),
        OutcomeStatus::Failed => Some("Failed"),
        OutcomeStatus::InProgress if session.launched => Some("Launched!"),
        OutcomeStatus::InProgress => None,
    };
    if let Some(status) = status {
        if !line.is_empty() {
            line.push_str("  |  ");
        }
        line.push_str(status);
    }
    if outcome.is_resolved() || session.launched {
        line.push_str("\nPress R to reset");
    } else if line.is_empty() {
        line.push_str("Drag the launcher back and release");
    }
    line
}

// ── Update: status HUD ────────────────────────────────────────────────────────

/// Refresh the HUD when the outcome or session changes.
pub fn hud_status_display_system(
    outcome: Res<Outcome>,
    session: Res<ThrowSession>,
    config: Res<GameConfig>,
    parent_query: Query<&Children, With<HudStatusDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    if !outcome.is_changed() && !session.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(status_line(&outcome, &session, &config));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_line_shows_score_only() {
        let line = status_line(&Outcome::default(), &ThrowSession::default(), &GameConfig::default());
        assert_eq!(line, "Score: 0");
    }

    #[test]
    fn launched_line_offers_reset() {
        let session = ThrowSession {
            launched: true,
            ..Default::default()
        };
        let line = status_line(&Outcome::default(), &session, &GameConfig::default());
        assert!(line.contains("Launched!"));
        assert!(line.contains("Press R"));
    }

    #[test]
    fn resolved_line_shows_banner() {
        let outcome = Outcome {
            status: OutcomeStatus::Victory,
            score: 2,
        };
        let line = status_line(&outcome, &ThrowSession::default(), &GameConfig::default());
        assert!(line.starts_with("Score: 2  |  VICTORY!"));
    }

    #[test]
    fn no_scoring_idle_line_has_hint() {
        let config = GameConfig {
            scoring_enabled: false,
            ..Default::default()
        };
        let line = status_line(&Outcome::default(), &ThrowSession::default(), &config);
        assert_eq!(line, "Drag the launcher back and release");
    }

    #[test]
    fn hud_text_follows_outcome() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.init_resource::<Outcome>();
        app.init_resource::<ThrowSession>();
        app.add_systems(Startup, setup_hud_status);
        app.add_systems(Update, hud_status_display_system);
        app.update();

        app.world_mut().resource_mut::<Outcome>().declare_failure();
        app.update();

        let texts: Vec<String> = app
            .world_mut()
            .query::<&Text>()
            .iter(app.world())
            .map(|t| t.0.clone())
            .collect();
        assert!(texts.iter().any(|t| t.contains("Failed")), "{texts:?}");
    }
}
