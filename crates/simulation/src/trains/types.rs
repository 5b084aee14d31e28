use std::collections::HashSet;

use bevy::prelude::*;

use crate::layout::{ConnectionId, StopId};
use crate::level_policy::{level_spawn_interval, speed_level, speed_multiplier, Tier};
use crate::rail_params::ProgressionParams;
use crate::spawn_arbiter::TrainSnapshot;
use crate::tracks::Track;

// =============================================================================
// Train component
// =============================================================================

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Train {
    pub track: Track,
    pub x: f32,
    /// Speed before the progression multiplier, in px/s.
    pub base_speed: f32,
    /// Current effective speed, in px/s.
    pub speed: f32,
    /// Time left at the current stop; the train does not move while positive.
    pub halt_remaining_ms: f32,
    /// Time until the train can be diverted again.
    pub switch_cooldown_ms: f32,
    pub visited_stops: Vec<StopId>,
    pub scored: bool,
}

impl Train {
    pub fn new(track: Track, x: f32, base_speed: f32, multiplier: f32) -> Self {
        Self {
            track,
            x,
            base_speed,
            speed: base_speed * multiplier,
            halt_remaining_ms: 0.0,
            switch_cooldown_ms: 0.0,
            visited_stops: Vec::new(),
            scored: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halt_remaining_ms > 0.0
    }

    pub fn rescale(&mut self, multiplier: f32) {
        self.speed = self.base_speed * multiplier;
    }

    pub fn snapshot(&self) -> TrainSnapshot {
        TrainSnapshot {
            track: self.track,
            x: self.x,
            speed: self.speed,
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Which switches the player has connected. Straight by default; cleared on
/// every level load.
#[derive(Resource, Debug, Default, Clone)]
pub struct SwitchBoard {
    connected: HashSet<ConnectionId>,
}

impl SwitchBoard {
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connected.contains(&id)
    }

    /// Flip `id` and return its new state.
    pub fn toggle(&mut self, id: ConnectionId) -> bool {
        if self.connected.remove(&id) {
            false
        } else {
            self.connected.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.connected.clear();
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }
}

/// Score and pacing of the running session.
#[derive(Resource, Debug, Clone)]
pub struct RailSession {
    pub score: u32,
    /// Tier of the currently loaded layout.
    pub tier: Tier,
    /// Last tier a reload was requested for. A failed load leaves it ahead of
    /// `tier` so the request is not repeated every tick.
    pub requested_tier: Tier,
    pub speed_level: u32,
    pub speed_multiplier: f32,
    pub spawn_interval_ms: f32,
    /// Set by a collision; everything stops until a restart.
    pub crashed: bool,
    pub trains_spawned: u32,
}

impl Default for RailSession {
    fn default() -> Self {
        let mut session = Self {
            score: 0,
            tier: Tier::Beginner,
            requested_tier: Tier::Beginner,
            speed_level: 0,
            speed_multiplier: 1.0,
            spawn_interval_ms: 0.0,
            crashed: false,
            trains_spawned: 0,
        };
        session.apply_score(&ProgressionParams::default());
        session
    }
}

impl RailSession {
    /// Recompute speed level, multiplier and spawn interval from the score.
    /// The tier is left alone; it changes only when a layout is loaded.
    pub fn apply_score(&mut self, params: &ProgressionParams) {
        self.speed_level = speed_level(self.score, params);
        self.speed_multiplier = speed_multiplier(self.score, params);
        self.spawn_interval_ms =
            level_spawn_interval(self.score, params.base_spawn_interval_ms, params);
    }

    pub fn reset(&mut self, params: &ProgressionParams) {
        self.score = 0;
        self.crashed = false;
        self.trains_spawned = 0;
        self.apply_score(params);
    }
}

/// Paces spawn attempts. The first attempt after a level load happens on the
/// next tick, later ones every spawn interval.
#[derive(Resource, Debug, Default, Clone)]
pub struct SpawnClock {
    pub elapsed_ms: f32,
    primed: bool,
    /// No attempts while set. Trains already on the line keep running.
    pub paused: bool,
}

impl SpawnClock {
    /// Advance by `dt_ms` and report whether an attempt is due.
    pub fn advance(&mut self, dt_ms: f32, interval_ms: f32) -> bool {
        if !self.primed {
            self.primed = true;
            self.elapsed_ms = 0.0;
            return true;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= interval_ms {
            self.elapsed_ms -= interval_ms;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.primed = false;
    }
}

// =============================================================================
// Events
// =============================================================================

/// Player input: flip a switch between straight and connected.
#[derive(Event, Debug, Clone)]
pub struct ToggleSwitch {
    pub id: ConnectionId,
}

#[derive(Event, Debug, Clone)]
pub struct TrainCollision {
    pub track: Track,
    pub x: f32,
    pub score: u32,
}

#[derive(Event, Debug, Clone)]
pub struct TrainScored {
    pub track: Track,
    pub score: u32,
}
