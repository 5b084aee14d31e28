//! Structural checks every generated layout must pass.
//!
//! [`audit_layout`] is used by the generator tests and by the slow-tick
//! [`audit_live_layout`] system, which records counts in [`LayoutViolations`].

use std::fmt;

use bevy::prelude::*;

use crate::rail_params::{LayoutParams, RailParams};
use crate::tracks::Track;
use crate::SlowTickTimer;

use super::placement::Band;
use super::types::{ConnectionId, Layout, PlacementOrigin, StopId};
use super::zones::partition;

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutViolation {
    /// The track has no switch before the ultra-early threshold.
    MissingUltraEarly { track: Track },
    /// No switch lies in the zone.
    EmptyZone { zone: usize },
    /// Two unforced switches on the same track are closer than the minimum spacing.
    CrowdedSwitches { first: ConnectionId, second: ConnectionId },
    /// Two opposite switches between the same tracks are close enough to undo each other.
    RoundTrip { first: ConnectionId, second: ConnectionId },
    /// No switch on the stop's track lies far enough before it.
    UnreachableStop { stop: StopId },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutViolation::MissingUltraEarly { track } => {
                write!(f, "{track} has no ultra-early switch")
            }
            LayoutViolation::EmptyZone { zone } => write!(f, "zone {zone} has no switch"),
            LayoutViolation::CrowdedSwitches { first, second } => {
                write!(f, "{first} and {second} are closer than the minimum spacing")
            }
            LayoutViolation::RoundTrip { first, second } => {
                write!(f, "{first} and {second} form a round trip")
            }
            LayoutViolation::UnreachableStop { stop } => {
                write!(f, "{stop} has no switch far enough before it")
            }
        }
    }
}

pub fn check_ultra_early(layout: &Layout) -> Vec<LayoutViolation> {
    layout
        .tracks()
        .iter()
        .filter(|&&track| !layout.has_ultra_early_connection(track))
        .map(|&track| LayoutViolation::MissingUltraEarly { track })
        .collect()
}

/// Zones whose placeable part is empty cannot hold a switch and are skipped.
pub fn check_zone_coverage(layout: &Layout, params: &LayoutParams) -> Vec<LayoutViolation> {
    let placeable = Band::full(params);
    partition(params.play_width, params.zone_count)
        .into_iter()
        .filter(|zone| zone.end > placeable.min && zone.start <= placeable.max)
        .filter(|zone| !layout.connections().iter().any(|c| zone.contains(c.x)))
        .map(|zone| LayoutViolation::EmptyZone { zone: zone.index })
        .collect()
}

pub fn check_spacing(layout: &Layout, params: &LayoutParams) -> Vec<LayoutViolation> {
    let connections = layout.connections();
    let mut out = Vec::new();
    for (i, a) in connections.iter().enumerate() {
        for b in &connections[i + 1..] {
            if a.source == b.source
                && (a.x - b.x).abs() < params.min_switch_spacing
                && a.origin != PlacementOrigin::Forced
                && b.origin != PlacementOrigin::Forced
            {
                out.push(LayoutViolation::CrowdedSwitches {
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }
    out
}

pub fn check_round_trips(layout: &Layout, params: &LayoutParams) -> Vec<LayoutViolation> {
    let connections = layout.connections();
    let mut out = Vec::new();
    for (i, a) in connections.iter().enumerate() {
        for b in &connections[i + 1..] {
            if a.is_round_trip_with(b, params.round_trip_tolerance) {
                out.push(LayoutViolation::RoundTrip {
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }
    out
}

pub fn check_stop_clearance(layout: &Layout, params: &LayoutParams) -> Vec<LayoutViolation> {
    layout
        .stops()
        .iter()
        .filter(|stop| {
            !layout
                .connections_from(stop.track)
                .any(|c| c.x <= stop.x - params.min_switch_to_stop)
        })
        .map(|stop| LayoutViolation::UnreachableStop { stop: stop.id })
        .collect()
}

/// All violations of `layout`, grouped by check.
pub fn audit_layout(layout: &Layout, params: &LayoutParams) -> Vec<LayoutViolation> {
    let mut out = check_ultra_early(layout);
    out.extend(check_zone_coverage(layout, params));
    out.extend(check_spacing(layout, params));
    out.extend(check_round_trips(layout, params));
    out.extend(check_stop_clearance(layout, params));
    out
}

// ---------------------------------------------------------------------------
// Runtime audit
// ---------------------------------------------------------------------------

/// Violations found in the live layout during the last audit pass. Used by
/// integration tests.
#[derive(Resource, Default, Debug)]
pub struct LayoutViolations {
    pub ultra_early: u32,
    pub zones: u32,
    pub spacing: u32,
    pub round_trips: u32,
    pub stops: u32,
}

impl LayoutViolations {
    pub fn total(&self) -> u32 {
        self.ultra_early + self.zones + self.spacing + self.round_trips + self.stops
    }
}

pub fn audit_live_layout(
    slow_tick: Res<SlowTickTimer>,
    layout: Res<Layout>,
    params: Res<RailParams>,
    mut violations: ResMut<LayoutViolations>,
) {
    if !slow_tick.should_run() || layout.tracks().is_empty() {
        return;
    }
    *violations = LayoutViolations::default();

    for violation in audit_layout(&layout, &params.layout) {
        warn!("Invariant violation: {violation}");
        match violation {
            LayoutViolation::MissingUltraEarly { .. } => violations.ultra_early += 1,
            LayoutViolation::EmptyZone { .. } => violations.zones += 1,
            LayoutViolation::CrowdedSwitches { .. } => violations.spacing += 1,
            LayoutViolation::RoundTrip { .. } => violations.round_trips += 1,
            LayoutViolation::UnreachableStop { .. } => violations.stops += 1,
        }
    }
}
