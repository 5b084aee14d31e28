use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config_error::ConfigurationError;
use crate::level_policy::LevelSpec;
use crate::rail_params::LayoutParams;
use crate::tracks::{adjacent_in, Track};

use super::placement::{place_with_fallback, Band, Board, PlacementRequest};
use super::types::{Layout, Stop, StopId};
use super::zones::{candidate_positions, partition, placeable_range, Zone};

/// Build the switches and stops for one level.
///
/// Runs a fixed sequence of passes over a shared [`Board`]. Every loop is
/// bounded by the track, zone and stop counts and by the attempt limits in
/// `params`, so generation always terminates. The result guarantees, for each
/// active track: an ultra-early switch, spacing between same-track switches
/// unless one was forced, no opposite switch pair within the round-trip
/// tolerance, a switch in every zone and a switch far enough ahead of every
/// stop.
///
/// Fails on track sets that cannot hold a switch at all and on parameters
/// that [`LayoutParams::validate`] rejects.
pub fn generate_layout(
    spec: &LevelSpec,
    params: &LayoutParams,
    rng: &mut impl Rng,
) -> Result<Layout, ConfigurationError> {
    let mut tracks = spec.tracks.clone();
    tracks.sort();
    tracks.dedup();
    match tracks.len() {
        0 => return Err(ConfigurationError::EmptyTrackSet),
        1 => return Err(ConfigurationError::SingleTrack),
        _ => {}
    }
    params.validate()?;

    let zones = partition(params.play_width, params.zone_count);
    let candidates: Vec<f32> = zones
        .iter()
        .flat_map(|zone| candidate_positions(zone, params))
        .collect();

    let mut board = Board::new();
    place_mandatory_forward(&mut board, &tracks, &candidates, params, rng);
    place_extra_forward(&mut board, &tracks, &candidates, params, rng);
    place_backward(&mut board, &tracks, &candidates, params, rng);
    place_skips(&mut board, &tracks, &candidates, params, rng);
    repair_empty_tracks(&mut board, &tracks, params, rng);
    repair_ultra_early(&mut board, &tracks, &candidates, params, rng);
    let stops = place_stops(&mut board, &tracks, spec.stop_duration_scale, params, rng);
    repair_empty_zones(&mut board, &tracks, &zones, params, rng);

    for &track in &tracks {
        debug!(
            "Layout: {} has {} connection(s)",
            track,
            board.count_from(track)
        );
    }

    Ok(Layout::new(
        tracks,
        board.into_connections(),
        stops,
        params.ultra_early_max_x,
    ))
}

/// One ultra-early switch from every track down to its neighbour.
fn place_mandatory_forward(
    board: &mut Board,
    tracks: &[Track],
    candidates: &[f32],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for pair in tracks.windows(2) {
        let request = PlacementRequest {
            source: pair[0],
            targets: &pair[1..],
            band: Band::ultra_early(params),
            preferred: candidates,
            attempts: params.forced_attempts,
            relax: true,
            allow_force: true,
        };
        place_with_fallback(board, params, &request, rng);
    }
}

fn place_extra_forward(
    board: &mut Board,
    tracks: &[Track],
    candidates: &[f32],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for pair in tracks.windows(2) {
        let extra = rng.gen_range(0..=params.max_extra_forward);
        for _ in 0..extra {
            let request = PlacementRequest {
                source: pair[0],
                targets: &pair[1..],
                band: Band::full(params),
                preferred: candidates,
                attempts: params.enrichment_attempts,
                relax: false,
                allow_force: false,
            };
            place_with_fallback(board, params, &request, rng);
        }
    }
}

/// Switches back up to the previous track. Mandatory in the ultra-early band
/// for a track that still has no ultra-early switch, optional elsewhere.
fn place_backward(
    board: &mut Board,
    tracks: &[Track],
    candidates: &[f32],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for pair in tracks.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        let request = if !board.has_ultra_early(lower, params.ultra_early_max_x) {
            PlacementRequest {
                source: lower,
                targets: &pair[..1],
                band: Band::ultra_early(params),
                preferred: candidates,
                attempts: params.forced_attempts,
                relax: true,
                allow_force: true,
            }
        } else if rng.gen_bool(params.backward_probability) {
            PlacementRequest {
                source: lower,
                targets: &pair[..1],
                band: Band::full(params),
                preferred: candidates,
                attempts: params.enrichment_attempts,
                relax: false,
                allow_force: false,
            }
        } else {
            continue;
        };
        if place_with_fallback(board, params, &request, rng).is_none() {
            debug!("Layout: no backward switch {} -> {}", lower, upper);
        }
    }
}

/// Occasional switches that jump over one track.
fn place_skips(
    board: &mut Board,
    tracks: &[Track],
    candidates: &[f32],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for triple in tracks.windows(3) {
        if !rng.gen_bool(params.skip_probability) {
            continue;
        }
        let request = PlacementRequest {
            source: triple[0],
            targets: &triple[2..],
            band: Band::full(params),
            preferred: candidates,
            attempts: params.enrichment_attempts,
            relax: false,
            allow_force: false,
        };
        place_with_fallback(board, params, &request, rng);
    }
}

fn repair_empty_tracks(
    board: &mut Board,
    tracks: &[Track],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for &track in tracks {
        if board.count_from(track) > 0 {
            continue;
        }
        let targets = adjacent_in(tracks, track);
        let mut request = PlacementRequest {
            source: track,
            targets: &targets,
            band: Band::full(params),
            preferred: &[],
            attempts: params.repair_attempts,
            relax: true,
            allow_force: false,
        };
        if place_with_fallback(board, params, &request, rng).is_none() {
            request.band = Band::ultra_early(params);
            request.attempts = 0;
            request.allow_force = true;
            place_with_fallback(board, params, &request, rng);
        }
    }
}

fn repair_ultra_early(
    board: &mut Board,
    tracks: &[Track],
    candidates: &[f32],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for &track in tracks {
        if board.has_ultra_early(track, params.ultra_early_max_x) {
            continue;
        }
        let targets = adjacent_in(tracks, track);
        let request = PlacementRequest {
            source: track,
            targets: &targets,
            band: Band::ultra_early(params),
            preferred: candidates,
            attempts: params.repair_attempts,
            relax: true,
            allow_force: true,
        };
        place_with_fallback(board, params, &request, rng);
    }
}

/// Place one stop per configured fraction of the width. A stop must have a
/// switch on its track at least `min_switch_to_stop` before it: otherwise it
/// moves to the first track that has one, and failing that an emergency
/// switch is added in front of it.
fn place_stops(
    board: &mut Board,
    tracks: &[Track],
    duration_scale: f32,
    params: &LayoutParams,
    rng: &mut impl Rng,
) -> Vec<Stop> {
    let mut stops = Vec::with_capacity(params.stop_fractions.len());
    let (min_ms, max_ms) = params.stop_duration_ms;

    for &fraction in &params.stop_fractions {
        let x = (params.play_width * fraction).round();
        let latest = x - params.min_switch_to_stop;
        let qualifies = |board: &Board, track: Track| {
            board
                .connections()
                .iter()
                .any(|c| c.source == track && c.x <= latest)
        };

        let Some(&picked) = tracks.choose(rng) else {
            break;
        };
        let mut track = picked;
        if !qualifies(board, track) {
            if let Some(&other) = tracks.iter().find(|&&t| qualifies(board, t)) {
                track = other;
            } else {
                let band = Band::new(
                    (latest - params.emergency_buffer).max(params.ultra_early_min_x),
                    latest,
                );
                let targets = adjacent_in(tracks, track);
                let request = PlacementRequest {
                    source: track,
                    targets: &targets,
                    band,
                    preferred: &[],
                    attempts: params.repair_attempts,
                    relax: true,
                    allow_force: true,
                };
                if place_with_fallback(board, params, &request, rng).is_none() {
                    warn!(
                        "Layout: dropping stop at {} on {}; no room for a switch before it",
                        x, track
                    );
                    continue;
                }
            }
        }

        let base_ms = if min_ms < max_ms {
            rng.gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        stops.push(Stop {
            id: StopId(stops.len() as u32),
            track,
            x,
            duration_ms: base_ms * duration_scale,
        });
    }
    stops
}

fn repair_empty_zones(
    board: &mut Board,
    tracks: &[Track],
    zones: &[Zone],
    params: &LayoutParams,
    rng: &mut impl Rng,
) {
    for zone in zones {
        if board.has_connection_in(zone.start, zone.end) {
            continue;
        }
        let Some((min, max)) = placeable_range(zone, params) else {
            warn!(
                "Layout: zone {} [{}, {}) lies outside the placeable width",
                zone.index, zone.start, zone.end
            );
            continue;
        };
        let Some(&source) = tracks.choose(rng) else {
            return;
        };
        let targets = adjacent_in(tracks, source);
        let preferred = candidate_positions(zone, params);
        let request = PlacementRequest {
            source,
            targets: &targets,
            band: Band::new(min, max),
            preferred: &preferred,
            attempts: params.repair_attempts,
            relax: true,
            allow_force: true,
        };
        place_with_fallback(board, params, &request, rng);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::invariants::check_stop_clearance;
    use super::super::types::PlacementOrigin;
    use super::*;

    const TRACKS: [Track; 3] = [Track::T2, Track::T3, Track::T4];

    #[test]
    fn test_stop_moves_to_track_with_switch_ahead() {
        let params = LayoutParams::default();
        let mut board = Board::new();
        board.push(Track::T3, Track::T4, 100.0, PlacementOrigin::Randomized);

        // StepRng picks the first track (T2), which has no switch of its own.
        let mut rng = StepRng::new(0, 0);
        let stops = place_stops(&mut board, &TRACKS, 1.0, &params, &mut rng);

        assert_eq!(stops.len(), 3);
        assert!(stops.iter().all(|s| s.track == Track::T3));
        assert_eq!(board.connections().len(), 1);
        let xs: Vec<f32> = stops.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![480.0, 720.0, 960.0]);
    }

    #[test]
    fn test_emergency_switch_lands_ahead_of_unreachable_stop() {
        let params = LayoutParams::default();
        let mut board = Board::new();
        board.push(Track::T2, Track::T3, 200.0, PlacementOrigin::Randomized);
        board.push(Track::T3, Track::T4, 220.0, PlacementOrigin::Randomized);
        board.push(Track::T4, Track::T3, 240.0, PlacementOrigin::Randomized);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let stops = place_stops(&mut board, &TRACKS, 1.0, &params, &mut rng);

        assert_eq!(stops.len(), 3);
        assert_eq!(board.connections().len(), 4);
        let added = &board.connections()[3];
        let first = &stops[0];
        assert_eq!(added.source, first.track);
        let earliest = (first.x - params.min_switch_to_stop - params.emergency_buffer)
            .max(params.ultra_early_min_x);
        assert!(
            added.x >= earliest && added.x <= first.x - params.min_switch_to_stop,
            "emergency switch at {} outside [{}, {}]",
            added.x,
            earliest,
            first.x - params.min_switch_to_stop
        );

        let layout = Layout::new(
            TRACKS.to_vec(),
            board.into_connections(),
            stops,
            params.ultra_early_max_x,
        );
        assert!(check_stop_clearance(&layout, &params).is_empty());
    }

    #[test]
    fn test_rejected_params_fail_before_generation() {
        let spec = LevelSpec {
            tier: crate::level_policy::Tier::Beginner,
            tracks: TRACKS.to_vec(),
            stop_duration_scale: 1.0,
        };
        let params = LayoutParams {
            sweep_step: 0.0,
            ..LayoutParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = generate_layout(&spec, &params, &mut rng).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidParams(_)));
    }
}
