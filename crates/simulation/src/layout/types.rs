use std::fmt;

use bevy::prelude::*;

use crate::tracks::Track;

// =============================================================================
// Identifiers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub u32);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stop{}", self.0)
    }
}

// =============================================================================
// Connection / Stop
// =============================================================================

/// How a connection came to be placed. Only `Forced` placements may break the
/// same-track spacing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementOrigin {
    /// Chosen by a randomized attempt that honoured every placement rule.
    Randomized,
    /// Found by the deterministic fallback sweep; honours spacing and round-trip rules.
    Swept,
    /// Last-resort placement that ignores spacing.
    Forced,
}

/// A directed switch: trains on `source` can be diverted onto `target` at `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: Track,
    pub target: Track,
    pub x: f32,
    pub origin: PlacementOrigin,
}

impl Connection {
    /// True when `other` goes the opposite way between the same two tracks
    /// within `tolerance` of this connection.
    pub fn is_round_trip_with(&self, other: &Connection, tolerance: f32) -> bool {
        self.source == other.target
            && self.target == other.source
            && (self.x - other.x).abs() < tolerance
    }
}

/// A halt point: trains on `track` near `x` pause for `duration_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub track: Track,
    pub x: f32,
    pub duration_ms: f32,
}

// =============================================================================
// Layout
// =============================================================================

/// The switches and stops of one level.
///
/// Built once per level (re)load and never mutated afterwards: fields are
/// private and only exposed through read-only accessors. A reload replaces the
/// whole resource.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Layout {
    tracks: Vec<Track>,
    connections: Vec<Connection>,
    stops: Vec<Stop>,
    ultra_early_max_x: f32,
}

impl Layout {
    /// Assemble a layout. `ultra_early_max_x` is the threshold the layout was
    /// built against; the spawn arbiter reads it back from here.
    pub fn new(
        tracks: Vec<Track>,
        connections: Vec<Connection>,
        stops: Vec<Stop>,
        ultra_early_max_x: f32,
    ) -> Self {
        Self {
            tracks,
            connections,
            stops,
            ultra_early_max_x,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn ultra_early_max_x(&self) -> f32 {
        self.ultra_early_max_x
    }

    pub fn is_active(&self, track: Track) -> bool {
        self.tracks.contains(&track)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections that can divert trains currently on `track`.
    pub fn connections_from(&self, track: Track) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.source == track)
    }

    pub fn stops_on(&self, track: Track) -> impl Iterator<Item = &Stop> {
        self.stops.iter().filter(move |s| s.track == track)
    }

    pub fn has_ultra_early_connection(&self, track: Track) -> bool {
        self.connections_from(track)
            .any(|c| c.x < self.ultra_early_max_x)
    }

    pub fn connection_count(&self, track: Track) -> usize {
        self.connections_from(track).count()
    }
}
