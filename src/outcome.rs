//! Outcome evaluation: goal and obstacle contacts, boundary-crossing score,
//! and off-screen cleanup.
//!
//! Status is monotonic within a throw.  A goal contact by a ragdoll segment
//! (or by the projectile itself when the ragdoll is disabled) declares victory
//! at once.  An obstacle contact only queues a `CommitFailure` after the grace
//! delay, and that commit re-checks the status, so a near miss that still
//! reaches the goal inside the window wins.

use crate::config::GameConfig;
use crate::launcher::Projectile;
use crate::ragdoll::{RagdollSegment, ROOT_PART};
use crate::scene::{SceneBody, SceneLayout};
use crate::session::{EventSchedule, ScheduledFired, ScheduledKind, ThrowSession};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutcomeStatus {
    #[default]
    InProgress,
    Victory,
    Failed,
}

/// Status of the current throw and the running score.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    /// Survives resets for the whole run.
    pub score: i32,
}

impl Outcome {
    /// Returns `true` if the status changed.
    pub fn declare_victory(&mut self) -> bool {
        self.resolve(OutcomeStatus::Victory)
    }

    /// Returns `true` if the status changed.
    pub fn declare_failure(&mut self) -> bool {
        self.resolve(OutcomeStatus::Failed)
    }

    fn resolve(&mut self, status: OutcomeStatus) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.status = status;
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.status != OutcomeStatus::InProgress
    }

    /// Reopen the status for the next throw; the score is kept.
    pub fn begin_new_throw(&mut self) {
        self.status = OutcomeStatus::InProgress;
    }
}

// ── Collisions ────────────────────────────────────────────────────────────────

/// What a thrown body in a contact pair is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Thrown {
    Projectile,
    Segment,
}

/// Classify collision starts against the goal and the obstacle.
#[allow(clippy::too_many_arguments)]
pub fn collision_outcome_system(
    mut collisions: MessageReader<CollisionEvent>,
    mut outcome: ResMut<Outcome>,
    mut session: ResMut<ThrowSession>,
    mut schedule: ResMut<EventSchedule>,
    config: Res<GameConfig>,
    q_scene: Query<&SceneBody>,
    q_projectile: Query<(), With<Projectile>>,
    q_segment: Query<(), With<RagdollSegment>>,
) {
    let thrown = |e: Entity| {
        if q_segment.contains(e) {
            Some(Thrown::Segment)
        } else if q_projectile.contains(e) {
            Some(Thrown::Projectile)
        } else {
            None
        }
    };

    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };
        let pair = match (q_scene.get(a), thrown(b)) {
            (Ok(scene), Some(body)) => Some((*scene, body)),
            _ => match (q_scene.get(b), thrown(a)) {
                (Ok(scene), Some(body)) => Some((*scene, body)),
                _ => None,
            },
        };
        let Some((scene, body)) = pair else {
            continue;
        };

        match scene {
            SceneBody::GoalSensor => {
                let counts = body == Thrown::Segment || !config.ragdoll_enabled;
                if counts && outcome.declare_victory() {
                    info!("Victory in session {} ({:?} reached the goal)", session.id, body);
                }
            }
            SceneBody::Obstacle(_) => {
                if config.scoring_enabled && !session.hit_obstacle {
                    session.hit_obstacle = true;
                    outcome.score -= 1;
                    debug!("Obstacle hit; score {}", outcome.score);
                }
                if !outcome.is_resolved() && !session.failure_pending {
                    session.failure_pending = true;
                    schedule.schedule(
                        session.id,
                        config.failure_grace_secs,
                        ScheduledKind::CommitFailure,
                    );
                    debug!("Failure pending for session {}", session.id);
                }
            }
            SceneBody::Ground
            | SceneBody::LeftWall
            | SceneBody::RightWall
            | SceneBody::LauncherAnchor => {}
        }
    }
}

/// Commit a pending failure unless the throw was already resolved.
pub fn commit_failure_system(
    mut fired: MessageReader<ScheduledFired>,
    mut outcome: ResMut<Outcome>,
    mut session: ResMut<ThrowSession>,
) {
    for event in fired.read() {
        if event.kind != ScheduledKind::CommitFailure || event.session != session.id {
            continue;
        }
        session.failure_pending = false;
        if outcome.declare_failure() {
            info!("Throw failed in session {}", session.id);
        } else {
            debug!("Failure commit skipped; outcome already {:?}", outcome.status);
        }
    }
}

// ── Per-step checks ───────────────────────────────────────────────────────────

/// Score +1 once per throw when the thrown body passes the nearest obstacle
/// edge before any obstacle contact.
///
/// Once the ragdoll is out only its torso counts; a flailing limb reaching
/// past the edge does not.
pub fn boundary_crossing_system(
    mut session: ResMut<ThrowSession>,
    mut outcome: ResMut<Outcome>,
    config: Res<GameConfig>,
    layout: Res<SceneLayout>,
    q_thrown: Query<(&Transform, Option<&RagdollSegment>), Or<(With<Projectile>, With<RagdollSegment>)>>,
) {
    if !config.scoring_enabled
        || !session.launched
        || session.crossed_obstacle
        || session.hit_obstacle
    {
        return;
    }
    let edge = layout.obstacle_near_edge();
    let crossed = q_thrown
        .iter()
        .filter(|(_, segment)| segment.is_none_or(|s| s.part == ROOT_PART))
        .any(|(t, _)| t.translation.x > edge);
    if crossed {
        session.crossed_obstacle = true;
        outcome.score += 1;
        info!("Crossed the obstacle; score {}", outcome.score);
    }
}

/// Remove every dynamic body that has fallen out of the viewport.
pub fn offscreen_cleanup_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    layout: Res<SceneLayout>,
    q_bodies: Query<(Entity, &Transform, &RigidBody)>,
) {
    for (entity, transform, body) in q_bodies.iter() {
        if *body != RigidBody::Dynamic {
            continue;
        }
        if layout.is_offscreen(transform.translation.truncate(), config.offscreen_margin) {
            commands.entity(entity).try_despawn();
            debug!("Despawned off-screen body {entity:?}");
        }
    }
}
