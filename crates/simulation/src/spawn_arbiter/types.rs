use std::fmt;

use crate::tracks::Track;

/// What the arbiter needs to know about a live train.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainSnapshot {
    pub track: Track,
    pub x: f32,
    /// Nominal speed in px/s, also while halted at a stop.
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The track has no switches at all.
    NoConnections,
    /// The track has no switch early enough to escape a fast follower.
    NoUltraEarlyConnection,
    /// The preceding train is too close to the spawn point.
    InsufficientGap,
    /// No candidate speed leaves time to reach a switch before colliding.
    NoSafeTiming,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::NoConnections => "no connections",
            DenyReason::NoUltraEarlyConnection => "no ultra-early connection",
            DenyReason::InsufficientGap => "insufficient gap",
            DenyReason::NoSafeTiming => "no safe timing",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnDecision {
    Admit { speed: f32 },
    Deny(DenyReason),
}

impl SpawnDecision {
    pub fn is_admit(&self) -> bool {
        matches!(self, SpawnDecision::Admit { .. })
    }
}
