use bevy::prelude::*;

use crate::config::{POINTS_PER_TRAIN, SCORE_LINE_FRACTION, SIM_TICK_MS, SIM_TICK_SECONDS};
use crate::layout::Layout;
use crate::level_lifecycle::{LevelReload, ReloadReason};
use crate::level_policy::{game_level, speed_level};
use crate::rail_params::RailParams;
use crate::sim_rng::SimRng;
use crate::spawn_arbiter::{choose_spawn, TrainSnapshot};

use super::motion::{diversion, first_overlap, stop_hit};
use super::types::{
    RailSession, SpawnClock, SwitchBoard, ToggleSwitch, Train, TrainCollision, TrainScored,
};

// =============================================================================
// PreSim
// =============================================================================

pub fn apply_switch_toggles(
    layout: Res<Layout>,
    mut board: ResMut<SwitchBoard>,
    mut toggles: EventReader<ToggleSwitch>,
) {
    for toggle in toggles.read() {
        if layout.connection(toggle.id).is_none() {
            warn!("Ignoring toggle of unknown {}", toggle.id);
            continue;
        }
        let connected = board.toggle(toggle.id);
        debug!("{} is now {}", toggle.id, if connected { "connected" } else { "straight" });
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Move every train by one tick, or count down its stop.
pub fn advance_trains(session: Res<RailSession>, mut trains: Query<&mut Train>) {
    if session.crashed {
        return;
    }
    for mut train in &mut trains {
        train.switch_cooldown_ms = (train.switch_cooldown_ms - SIM_TICK_MS).max(0.0);
        if train.is_halted() {
            train.halt_remaining_ms = (train.halt_remaining_ms - SIM_TICK_MS).max(0.0);
            continue;
        }
        let step = train.speed * SIM_TICK_SECONDS;
        train.x += step;
    }
}

pub fn halt_trains_at_stops(
    session: Res<RailSession>,
    layout: Res<Layout>,
    params: Res<RailParams>,
    mut trains: Query<&mut Train>,
) {
    if session.crashed {
        return;
    }
    for mut train in &mut trains {
        if train.is_halted() {
            continue;
        }
        let Some(stop) = stop_hit(&layout, &train, params.runtime.stop_range) else {
            continue;
        };
        train.halt_remaining_ms = stop.duration_ms;
        train.visited_stops.push(stop.id);
        debug!("Train halted at {} on {} for {:.0} ms", stop.id, stop.track, stop.duration_ms);
    }
}

pub fn divert_trains(
    session: Res<RailSession>,
    layout: Res<Layout>,
    board: Res<SwitchBoard>,
    params: Res<RailParams>,
    mut trains: Query<&mut Train>,
) {
    if session.crashed {
        return;
    }
    for mut train in &mut trains {
        if train.switch_cooldown_ms > 0.0 {
            continue;
        }
        let Some(connection) = diversion(
            &layout,
            &board,
            train.track,
            train.x,
            params.runtime.switch_range,
        ) else {
            continue;
        };
        train.track = connection.target;
        train.switch_cooldown_ms = params.runtime.switch_cooldown_ms;
    }
}

/// Two trains overlapping on one track end the session.
pub fn detect_collisions(
    mut session: ResMut<RailSession>,
    params: Res<RailParams>,
    trains: Query<&Train>,
    mut collisions: EventWriter<TrainCollision>,
) {
    if session.crashed {
        return;
    }
    let positions: Vec<_> = trains.iter().map(|t| (t.track, t.x)).collect();
    let Some((a, _)) = first_overlap(&positions, params.runtime.train_length) else {
        return;
    };
    let (track, x) = positions[a];
    session.crashed = true;
    info!("Collision on {} at x={:.0}, final score {}", track, x, session.score);
    collisions.send(TrainCollision {
        track,
        x,
        score: session.score,
    });
}

pub fn spawn_trains(
    mut commands: Commands,
    layout: Res<Layout>,
    params: Res<RailParams>,
    mut session: ResMut<RailSession>,
    mut clock: ResMut<SpawnClock>,
    mut rng: ResMut<SimRng>,
    trains: Query<&Train>,
) {
    if session.crashed || clock.paused || layout.tracks().is_empty() {
        return;
    }
    if !clock.advance(SIM_TICK_MS, session.spawn_interval_ms) {
        return;
    }

    let snapshots: Vec<TrainSnapshot> = trains.iter().map(Train::snapshot).collect();
    let multiplier = session.speed_multiplier;
    let variants = params.runtime.scaled_variants(multiplier);
    match choose_spawn(&layout, &snapshots, &variants, &params.spawn, &mut rng.0) {
        Ok(Some((track, speed))) => {
            commands.spawn(Train::new(
                track,
                params.spawn.spawn_x,
                speed / multiplier,
                multiplier,
            ));
            session.trains_spawned += 1;
            debug!("Spawned train on {} at {:.0} px/s", track, speed);
        }
        Ok(None) => {}
        Err(e) => error!("Spawn attempt failed: {e}"),
    }
}

// =============================================================================
// PostSim
// =============================================================================

pub fn score_trains(
    mut session: ResMut<RailSession>,
    params: Res<RailParams>,
    mut trains: Query<&mut Train>,
    mut scored: EventWriter<TrainScored>,
) {
    if session.crashed {
        return;
    }
    let line = params.layout.play_width * SCORE_LINE_FRACTION;
    for mut train in &mut trains {
        if train.scored || train.x <= line {
            continue;
        }
        train.scored = true;
        session.score += POINTS_PER_TRAIN;
        scored.send(TrainScored {
            track: train.track,
            score: session.score,
        });
    }
}

/// Rescale speeds when the score crosses a speed level, and request a new
/// layout when it crosses a tier threshold.
pub fn update_progression(
    mut session: ResMut<RailSession>,
    params: Res<RailParams>,
    mut trains: Query<&mut Train>,
    mut reloads: EventWriter<LevelReload>,
) {
    if session.crashed {
        return;
    }
    let p = &params.progression;
    if speed_level(session.score, p) != session.speed_level {
        session.apply_score(p);
        let multiplier = session.speed_multiplier;
        for mut train in &mut trains {
            train.rescale(multiplier);
        }
        info!(
            "Speed level {} (x{:.2}), spawn every {:.0} ms",
            session.speed_level, multiplier, session.spawn_interval_ms
        );
    }
    let tier = game_level(session.score, p);
    if tier != session.tier && tier != session.requested_tier {
        session.requested_tier = tier;
        info!("Score {} reached tier {}", session.score, tier.label());
        reloads.send(LevelReload {
            reason: ReloadReason::TierUp,
        });
    }
}

pub fn despawn_departed_trains(
    mut commands: Commands,
    params: Res<RailParams>,
    trains: Query<(Entity, &Train)>,
) {
    let limit = params.layout.play_width + params.runtime.train_length;
    for (entity, train) in &trains {
        if train.x > limit {
            commands.entity(entity).despawn();
        }
    }
}
