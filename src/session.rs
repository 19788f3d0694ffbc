//! Per-throw session state, delayed events, and the reset command.
//!
//! Every throw runs under a [`ThrowSession`] with a unique `id`.  Delayed work
//! (ragdoll spawn, failure commit, auto-reset) is queued in [`EventSchedule`]
//! tagged with the session it belongs to.  When an entry comes due,
//! [`schedule_tick_system`] compares its tag with the current session and
//! silently drops it if a reset has started a new one in the meantime; live
//! entries are re-emitted as [`ScheduledFired`] messages for the systems that
//! own the behaviour.
//!
//! Delays run on real time (`Time<Real>`), not physics time, so they keep
//! their wall-clock meaning while the pipeline is paused.

use crate::config::GameConfig;
use crate::launcher::{spawn_projectile, Launcher, LauncherState, Projectile};
use crate::outcome::Outcome;
use crate::ragdoll::RagdollSegment;
use crate::scene::SceneLayout;
use crate::trajectory::TrajectoryPreview;
use bevy::prelude::*;

// ── Session ───────────────────────────────────────────────────────────────────

/// One-shot flags for the current throw.  Replaced wholesale on reset.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThrowSession {
    /// Identity used to invalidate delayed events of earlier throws.
    pub id: u64,
    /// The projectile has left the launcher.
    pub launched: bool,
    /// The throw passed the obstacle's near edge before hitting it.
    pub crossed_obstacle: bool,
    /// The projectile or a segment touched the obstacle.
    pub hit_obstacle: bool,
    /// A failure commit is waiting out its grace delay.
    pub failure_pending: bool,
    /// The projectile has already been replaced by a ragdoll.
    pub ragdoll_spawned: bool,
}

impl ThrowSession {
    /// A fresh session following this one.
    pub fn next(&self) -> Self {
        Self {
            id: self.id.wrapping_add(1),
            ..Default::default()
        }
    }
}

// ── Scheduled events ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduledKind {
    /// Replace the projectile with a ragdoll.
    SpawnRagdoll,
    /// Mark the throw failed unless victory registered first.
    CommitFailure,
    /// Start the next throw.
    AutoReset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    /// Session the event was scheduled under.
    pub session: u64,
    /// Real seconds until the event is due.
    pub remaining_secs: f32,
    pub kind: ScheduledKind,
}

/// Pending delayed events.
#[derive(Resource, Debug, Default, Clone)]
pub struct EventSchedule {
    entries: Vec<ScheduledEvent>,
}

impl EventSchedule {
    pub fn schedule(&mut self, session: u64, delay_secs: f32, kind: ScheduledKind) {
        self.entries.push(ScheduledEvent {
            session,
            remaining_secs: delay_secs.max(0.0),
            kind,
        });
    }

    /// Drop every pending entry of `session`.
    pub fn cancel_session(&mut self, session: u64) {
        self.entries.retain(|e| e.session != session);
    }

    /// Advance all entries by `dt` and return the ones that came due, in the
    /// order they were scheduled.
    pub fn tick(&mut self, dt: f32) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        self.entries.retain_mut(|e| {
            e.remaining_secs -= dt;
            if e.remaining_secs <= 0.0 {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due
    }

    /// Number of pending entries of `kind`.
    pub fn pending(&self, kind: ScheduledKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A scheduled event that came due for the current session.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFired {
    pub kind: ScheduledKind,
    pub session: u64,
}

/// External request to reset the scene for a new throw.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetRequest;

/// Tick the schedule on real time and emit due events of the live session.
pub fn schedule_tick_system(
    time: Res<Time<Real>>,
    session: Res<ThrowSession>,
    mut schedule: ResMut<EventSchedule>,
    mut fired: MessageWriter<ScheduledFired>,
) {
    for event in schedule.tick(time.delta_secs()) {
        if event.session != session.id {
            debug!(
                "Dropping stale {:?} from session {} (current {})",
                event.kind, event.session, session.id
            );
            continue;
        }
        fired.write(ScheduledFired {
            kind: event.kind,
            session: event.session,
        });
    }
}

// ── Reset ─────────────────────────────────────────────────────────────────────

/// Reset the throw cycle on a [`ResetRequest`] or a due `AutoReset`.
///
/// Removes whatever is left of the previous throw wherever it ended up,
/// restores the launcher to exactly its rest bend, and attaches a fresh
/// projectile to the tip.  Score carries over; the outcome status starts over.
#[allow(clippy::too_many_arguments)]
pub fn reset_throw_system(
    mut commands: Commands,
    mut requests: MessageReader<ResetRequest>,
    mut fired: MessageReader<ScheduledFired>,
    mut session: ResMut<ThrowSession>,
    mut schedule: ResMut<EventSchedule>,
    mut outcome: ResMut<Outcome>,
    mut launcher_state: ResMut<LauncherState>,
    mut preview: ResMut<TrajectoryPreview>,
    config: Res<GameConfig>,
    layout: Res<SceneLayout>,
    q_thrown: Query<Entity, Or<(With<Projectile>, With<RagdollSegment>)>>,
    q_launcher: Query<Entity, With<Launcher>>,
) {
    let manual = requests.read().count() > 0;
    let auto = fired
        .read()
        .any(|e| e.kind == ScheduledKind::AutoReset && e.session == session.id);
    if !manual && !auto {
        return;
    }

    for entity in q_thrown.iter() {
        commands.entity(entity).try_despawn();
    }
    schedule.cancel_session(session.id);
    *session = session.next();
    outcome.begin_new_throw();
    launcher_state.reset();
    preview.points.clear();

    match q_launcher.single() {
        Ok(launcher) => {
            spawn_projectile(&mut commands, &config, &layout, launcher, launcher_state.angle);
        }
        Err(_) => warn!("Reset without a launcher; no projectile attached"),
    }
    info!(
        "Scene reset ({}) -> session {}",
        if manual { "manual" } else { "auto" },
        session.id
    );
}
