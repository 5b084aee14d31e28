//! Connection placement with a deterministic fallback.
//!
//! Every pass of the generator places switches through [`place_with_fallback`]:
//! a bounded number of randomized attempts, then (when the caller allows it) a
//! sweep of the band that always yields a position. Placement state lives in a
//! [`Board`] that the generator threads through its passes.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::rail_params::LayoutParams;
use crate::tracks::Track;

use super::types::{Connection, ConnectionId, PlacementOrigin};

// =============================================================================
// Board
// =============================================================================

/// Connections placed so far during one generation run.
#[derive(Debug, Default)]
pub struct Board {
    connections: Vec<Connection>,
    next_id: u32,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn into_connections(self) -> Vec<Connection> {
        self.connections
    }

    pub fn count_from(&self, track: Track) -> usize {
        self.connections.iter().filter(|c| c.source == track).count()
    }

    pub fn has_ultra_early(&self, track: Track, ultra_early_max_x: f32) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == track && c.x < ultra_early_max_x)
    }

    pub fn has_connection_in(&self, start: f32, end: f32) -> bool {
        self.connections.iter().any(|c| c.x >= start && c.x < end)
    }

    /// True when `x` keeps the given distances to the switches already placed.
    pub fn spacing_ok(&self, source: Track, x: f32, spacing: Spacing) -> bool {
        self.connections.iter().all(|c| {
            let dx = (c.x - x).abs();
            if c.source == source {
                dx >= spacing.same_track && dx >= spacing.cross_track
            } else {
                dx >= spacing.cross_track
            }
        })
    }

    /// True when a `source -> target` switch at `x` would undo an existing
    /// `target -> source` switch within `tolerance`.
    pub fn round_trip_conflict(&self, source: Track, target: Track, x: f32, tolerance: f32) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == target && c.target == source && (c.x - x).abs() < tolerance)
    }

    pub fn push(
        &mut self,
        source: Track,
        target: Track,
        x: f32,
        origin: PlacementOrigin,
    ) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.connections.push(Connection {
            id,
            source,
            target,
            x,
            origin,
        });
        id
    }
}

// =============================================================================
// Request
// =============================================================================

/// Minimum distances a randomized placement must keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// To switches on the same source track.
    pub same_track: f32,
    /// To switches on any track.
    pub cross_track: f32,
}

impl Spacing {
    pub fn strict(params: &LayoutParams) -> Self {
        Self {
            same_track: params.min_switch_spacing * params.preferred_spacing_factor,
            cross_track: params.cross_track_clearance,
        }
    }

    /// Spacing for attempt `attempt` of `attempts`: strict on the first
    /// attempt, easing linearly to the hard minimum with no cross-track
    /// clearance on the last one. Never drops below `min_switch_spacing`.
    pub fn relaxed(params: &LayoutParams, attempt: u32, attempts: u32) -> Self {
        let strict = Self::strict(params);
        if attempts <= 1 {
            return strict;
        }
        let t = attempt.min(attempts - 1) as f32 / (attempts - 1) as f32;
        Self {
            same_track: strict.same_track + (params.min_switch_spacing - strict.same_track) * t,
            cross_track: strict.cross_track * (1.0 - t),
        }
    }
}

/// Inclusive x range a placement must land in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `[ultra_early_min_x, ultra_early_max_x)` in whole pixels.
    pub fn ultra_early(params: &LayoutParams) -> Self {
        Self::new(params.ultra_early_min_x, params.ultra_early_max_x - 1.0)
    }

    /// The whole placeable width.
    pub fn full(params: &LayoutParams) -> Self {
        Self::new(params.ultra_early_min_x, params.max_switch_x())
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.min && x <= self.max
    }

    fn random_x(&self, rng: &mut impl Rng) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max).round().clamp(self.min, self.max)
    }

    /// Positions from `min` to `max` every `step`, `max` included.
    fn grid(&self, step: f32) -> Vec<f32> {
        let mut out = Vec::new();
        let mut x = self.min;
        while x <= self.max {
            out.push(x);
            x += step;
        }
        if out.last().map_or(true, |last| *last < self.max) {
            out.push(self.max);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct PlacementRequest<'a> {
    pub source: Track,
    /// Acceptable targets; each attempt picks one at random.
    pub targets: &'a [Track],
    pub band: Band,
    /// Positions tried on every other attempt. Ones outside the band are
    /// ignored.
    pub preferred: &'a [f32],
    pub attempts: u32,
    /// Ease spacing towards the hard minimum over the attempts.
    pub relax: bool,
    /// Fall back to the deterministic sweep once the attempts are spent.
    pub allow_force: bool,
}

// =============================================================================
// place_with_fallback
// =============================================================================

/// Place one connection for `request`, or `None` when every attempt failed
/// and forcing is not allowed (or the request has no target or an empty band).
///
/// With `allow_force` the call always places: it sweeps the band for a spot
/// that keeps the hard spacing minimum and avoids round trips (`Swept`), then
/// for one that only avoids round trips (`Forced`), and finally takes the band
/// start (`Forced`, warned).
pub fn place_with_fallback(
    board: &mut Board,
    params: &LayoutParams,
    request: &PlacementRequest<'_>,
    rng: &mut impl Rng,
) -> Option<ConnectionId> {
    if request.targets.is_empty() || request.band.is_empty() {
        return None;
    }
    let band = request.band;
    let preferred: Vec<f32> = request
        .preferred
        .iter()
        .copied()
        .filter(|x| band.contains(*x))
        .collect();

    for attempt in 0..request.attempts {
        let spacing = if request.relax {
            Spacing::relaxed(params, attempt, request.attempts)
        } else {
            Spacing::strict(params)
        };
        // Alternate preferred positions with free draws from the band.
        let x = match preferred.choose(rng) {
            Some(&x) if attempt % 2 == 0 => x,
            _ => band.random_x(rng),
        };
        let Some(&target) = request.targets.choose(rng) else {
            return None;
        };
        if board.spacing_ok(request.source, x, spacing)
            && !board.round_trip_conflict(request.source, target, x, params.round_trip_tolerance)
        {
            return Some(board.push(request.source, target, x, PlacementOrigin::Randomized));
        }
    }

    if !request.allow_force {
        return None;
    }

    if let Some((target, x)) = sweep(board, params, request, true) {
        return Some(board.push(request.source, target, x, PlacementOrigin::Swept));
    }
    if let Some((target, x)) = sweep(board, params, request, false) {
        return Some(board.push(request.source, target, x, PlacementOrigin::Forced));
    }

    let target = request.targets[0];
    warn!(
        "Layout: no round-trip-free spot for {} -> {} in [{}, {}]; forcing at {}",
        request.source, target, band.min, band.max, band.min
    );
    Some(board.push(request.source, target, band.min, PlacementOrigin::Forced))
}

/// Leftmost position in the band for any target, scanning targets in request
/// order. With `keep_spacing` the hard same-track minimum must hold as well.
fn sweep(
    board: &Board,
    params: &LayoutParams,
    request: &PlacementRequest<'_>,
    keep_spacing: bool,
) -> Option<(Track, f32)> {
    let band = request.band;
    let hard = Spacing {
        same_track: params.min_switch_spacing,
        cross_track: 0.0,
    };
    let tolerance = params.round_trip_tolerance;

    for &target in request.targets {
        let mut xs = band.grid(params.sweep_step);
        // The edges of the round-trip exclusion zones are exact free spots.
        xs.extend(
            board
                .connections()
                .iter()
                .filter(|c| c.source == target && c.target == request.source)
                .map(|c| c.x + tolerance)
                .filter(|x| band.contains(*x)),
        );
        xs.sort_by(|a, b| a.total_cmp(b));

        let found = xs.into_iter().find(|&x| {
            !board.round_trip_conflict(request.source, target, x, tolerance)
                && (!keep_spacing || board.spacing_ok(request.source, x, hard))
        });
        if let Some(x) = found {
            return Some((target, x));
        }
    }
    None
}
