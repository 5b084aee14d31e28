use rand::seq::SliceRandom;
use rand::Rng;

use crate::config_error::ConfigurationError;
use crate::layout::Layout;
use crate::rail_params::SpawnParams;
use crate::tracks::Track;

use super::types::{DenyReason, SpawnDecision, TrainSnapshot};

/// Once-per-tick throttle. Layouts with poor switch coverage only let a
/// fraction of ticks through to the per-track decision.
pub fn global_admission_gate(layout: &Layout, params: &SpawnParams, rng: &mut impl Rng) -> bool {
    let track_count = layout.tracks().len() as f32;
    let covered = layout
        .tracks()
        .iter()
        .filter(|&&t| layout.connection_count(t) > 0)
        .count() as f32;
    let total = layout.connections().len() as f32;

    let sparse = covered < params.coverage_threshold * track_count
        || total < params.coverage_threshold * track_count;
    if sparse {
        rng.gen_bool(params.throttle_pass_rate)
    } else {
        true
    }
}

/// The train a new spawn on `track` would be measured against: the one with
/// the largest x.
pub fn preceding_train(trains: &[TrainSnapshot], track: Track) -> Option<&TrainSnapshot> {
    trains
        .iter()
        .filter(|t| t.track == track)
        .max_by(|a, b| a.x.total_cmp(&b.x))
}

/// Gap the preceding train must have opened before anything may follow it.
pub fn required_gap(layout: &Layout, lead: &TrainSnapshot, params: &SpawnParams) -> f32 {
    let mut reaction = params.reaction_seconds;

    let nearest_ahead = layout
        .connections_from(lead.track)
        .filter(|c| c.x > lead.x)
        .map(|c| c.x)
        .min_by(f32::total_cmp);
    match nearest_ahead {
        Some(x) if x <= lead.x + params.reachable_buffer => {}
        _ => reaction *= params.distant_switch_multiplier,
    }
    if layout.stops_on(lead.track).any(|s| s.x > lead.x) {
        reaction *= params.stop_ahead_multiplier;
    }

    params.base_safe_distance + reaction * lead.speed
}

/// Whether a train spawned at `speed` behind `lead` can always be diverted in
/// time. Never true for a faster follower on a track without switches.
pub fn passes_timing_check(
    layout: &Layout,
    lead: &TrainSnapshot,
    speed: f32,
    params: &SpawnParams,
) -> bool {
    if speed <= lead.speed {
        return true;
    }
    let time_to_collision = (lead.x - params.spawn_x) / (speed - lead.speed);
    let deadline = time_to_collision - params.min_reaction_window_seconds;
    layout.connections_from(lead.track).any(|c| {
        let time_to_reach = (c.x - params.spawn_x) / speed;
        time_to_reach >= params.min_click_floor_seconds && time_to_reach < deadline
    })
}

/// Admit or deny a spawn on `track` given the live trains.
///
/// `variants` are the effective speeds currently in play (base variants times
/// the progression multiplier).
pub fn decide_spawn(
    layout: &Layout,
    track: Track,
    trains: &[TrainSnapshot],
    variants: &[f32],
    params: &SpawnParams,
    rng: &mut impl Rng,
) -> Result<SpawnDecision, ConfigurationError> {
    let Some(slowest) = variants.iter().copied().min_by(f32::total_cmp) else {
        return Err(ConfigurationError::EmptySpeedVariants);
    };
    let fastest = variants.iter().copied().fold(slowest, f32::max);

    if layout.connection_count(track) == 0 {
        return Ok(SpawnDecision::Deny(DenyReason::NoConnections));
    }
    if !layout.has_ultra_early_connection(track) {
        return Ok(SpawnDecision::Deny(DenyReason::NoUltraEarlyConnection));
    }

    let Some(lead) = preceding_train(trains, track) else {
        let speed = variants.choose(rng).copied().unwrap_or(slowest);
        return Ok(SpawnDecision::Admit { speed });
    };

    let gap = required_gap(layout, lead, params);
    let candidates: Vec<f32> = if lead.x > gap {
        let cap = (lead.speed * params.speed_headroom).min(fastest);
        variants.iter().copied().filter(|&v| v <= cap).collect()
    } else if lead.x > params.close_gap_fraction * gap
        && layout.connections_from(track).any(|c| c.x > lead.x)
    {
        vec![slowest]
    } else {
        return Ok(SpawnDecision::Deny(DenyReason::InsufficientGap));
    };

    let passing: Vec<f32> = candidates
        .into_iter()
        .filter(|&s| passes_timing_check(layout, lead, s, params))
        .collect();
    if let Some(&speed) = passing.choose(rng) {
        return Ok(SpawnDecision::Admit { speed });
    }
    if passes_timing_check(layout, lead, slowest, params) {
        return Ok(SpawnDecision::Admit { speed: slowest });
    }
    Ok(SpawnDecision::Deny(DenyReason::NoSafeTiming))
}

/// One spawn attempt for the tick: gate, then active tracks in random order,
/// first admission wins.
pub fn choose_spawn(
    layout: &Layout,
    trains: &[TrainSnapshot],
    variants: &[f32],
    params: &SpawnParams,
    rng: &mut impl Rng,
) -> Result<Option<(Track, f32)>, ConfigurationError> {
    if layout.tracks().is_empty() {
        return Err(ConfigurationError::EmptyTrackSet);
    }
    if variants.is_empty() {
        return Err(ConfigurationError::EmptySpeedVariants);
    }
    if !global_admission_gate(layout, params, rng) {
        return Ok(None);
    }

    let mut order = layout.tracks().to_vec();
    order.shuffle(rng);
    for track in order {
        if let SpawnDecision::Admit { speed } =
            decide_spawn(layout, track, trains, variants, params, rng)?
        {
            return Ok(Some((track, speed)));
        }
    }
    Ok(None)
}
