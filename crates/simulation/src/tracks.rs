//! Parallel lanes trains travel along.
//!
//! Each [`Track`] has a fixed vertical lane offset. Which tracks are *active*
//! depends on the current tier (see [`crate::level_policy`]); inactive tracks
//! carry no connections, stops or trains.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
}

impl Track {
    pub const ALL: &'static [Track] = &[
        Track::T1,
        Track::T2,
        Track::T3,
        Track::T4,
        Track::T5,
        Track::T6,
    ];

    /// Vertical lane offset in pixels. T6 sits closer to T5 than the other gaps.
    pub fn lane_y(self) -> f32 {
        match self {
            Track::T1 => 100.0,
            Track::T2 => 200.0,
            Track::T3 => 300.0,
            Track::T4 => 400.0,
            Track::T5 => 500.0,
            Track::T6 => 580.0,
        }
    }

    /// Zero-based position in top-to-bottom order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Track::T1 => "track1",
            Track::T2 => "track2",
            Track::T3 => "track3",
            Track::T4 => "track4",
            Track::T5 => "track5",
            Track::T6 => "track6",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks directly above and below `track` within `active`, in active order.
pub fn adjacent_in(active: &[Track], track: Track) -> Vec<Track> {
    let Some(pos) = active.iter().position(|&t| t == track) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(2);
    if pos > 0 {
        out.push(active[pos - 1]);
    }
    if pos + 1 < active.len() {
        out.push(active[pos + 1]);
    }
    out
}
