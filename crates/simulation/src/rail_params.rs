//! Data-driven rail parameters.
//!
//! Collects the tunables of layout generation, spawn admission, score
//! progression and train runtime into a single [`RailParams`] resource.
//! Systems read `Res<RailParams>` and hand the relevant sub-struct to the pure
//! generator / arbiter functions. Overrides can be supplied as JSON; every
//! section is `#[serde(default)]` so a partial document only changes the keys
//! it names.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    PLAY_WIDTH, SPAWN_X, SPEED_VARIANTS, STOP_RANGE, SWITCH_COOLDOWN_MS, SWITCH_RANGE,
    TRAIN_LENGTH,
};
use crate::config_error::ConfigurationError;

// ---------------------------------------------------------------------------
// Layout generation parameters
// ---------------------------------------------------------------------------

/// Tunables for the procedural layout generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub play_width: f32,
    /// Number of equal zones the play width is split into for spatial spread.
    pub zone_count: usize,
    /// Preferred switch positions computed per zone.
    pub candidates_per_zone: usize,
    /// No switch is placed closer than this to the right edge.
    pub edge_margin: f32,
    /// Lower bound of the ultra-early band. Even the fastest train needs at
    /// least the click floor to reach a switch here.
    pub ultra_early_min_x: f32,
    /// Switches strictly below this x count as ultra-early.
    pub ultra_early_max_x: f32,
    /// Hard minimum distance between two switches on the same source track.
    pub min_switch_spacing: f32,
    /// Preferred same-track spacing as a multiple of `min_switch_spacing`.
    pub preferred_spacing_factor: f32,
    /// Preferred clearance from switches on any track.
    pub cross_track_clearance: f32,
    /// Opposite switches closer than this form a useless round trip.
    pub round_trip_tolerance: f32,
    /// Randomized attempts for mandatory ultra-early placement before forcing.
    pub forced_attempts: u32,
    /// Randomized attempts for repair sweeps before forcing.
    pub repair_attempts: u32,
    /// Attempts for optional enrichment placements.
    pub enrichment_attempts: u32,
    pub max_extra_forward: u32,
    pub backward_probability: f64,
    pub skip_probability: f64,
    /// Stop positions as fractions of the play width.
    pub stop_fractions: Vec<f32>,
    pub min_switch_to_stop: f32,
    /// Extra room before an emergency switch synthesized for a stop.
    pub emergency_buffer: f32,
    /// Base stop duration range in milliseconds (min, max).
    pub stop_duration_ms: (f32, f32),
    /// Step of the deterministic fallback sweep.
    pub sweep_step: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            zone_count: 5,
            candidates_per_zone: 3,
            edge_margin: 120.0,
            ultra_early_min_x: 60.0,
            ultra_early_max_x: 250.0,
            min_switch_spacing: 50.0,
            preferred_spacing_factor: 1.5,
            cross_track_clearance: 50.0,
            round_trip_tolerance: 40.0,
            forced_attempts: 8,
            repair_attempts: 10,
            enrichment_attempts: 6,
            max_extra_forward: 2,
            backward_probability: 0.4,
            skip_probability: 0.2,
            stop_fractions: vec![0.4, 0.6, 0.8],
            min_switch_to_stop: 300.0,
            emergency_buffer: 150.0,
            stop_duration_ms: (1000.0, 2500.0),
            sweep_step: 5.0,
        }
    }
}

impl LayoutParams {
    /// Rightmost x at which a switch may be placed.
    pub fn max_switch_x(&self) -> f32 {
        self.play_width - self.edge_margin
    }

    /// Constraints the generator needs to terminate without panicking.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |msg: &str| Err(ConfigurationError::InvalidParams(msg.to_string()));

        if self.zone_count == 0 {
            return invalid("layout.zone_count must be at least 1");
        }
        if self.candidates_per_zone == 0 {
            return invalid("layout.candidates_per_zone must be at least 1");
        }
        if self.ultra_early_min_x >= self.ultra_early_max_x {
            return invalid("layout.ultra_early_min_x must be below ultra_early_max_x");
        }
        if self.ultra_early_max_x > self.max_switch_x() {
            return invalid("layout ultra-early band exceeds the placeable width");
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.min_switch_spacing) || !positive(self.sweep_step) {
            return invalid("layout spacing and sweep step must be positive");
        }
        if self.preferred_spacing_factor < 1.0 {
            return invalid("layout.preferred_spacing_factor must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.backward_probability)
            || !(0.0..=1.0).contains(&self.skip_probability)
        {
            return invalid("layout probabilities must lie in [0, 1]");
        }
        if self.stop_fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return invalid("layout.stop_fractions must lie in [0, 1]");
        }
        if self.stop_duration_ms.0 > self.stop_duration_ms.1 {
            return invalid("layout.stop_duration_ms must be (min, max)");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Spawn admission parameters
// ---------------------------------------------------------------------------

/// Tunables for the spawn arbiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnParams {
    pub spawn_x: f32,
    pub base_safe_distance: f32,
    /// Seconds of lead-train travel added to the required gap.
    pub reaction_seconds: f32,
    /// Reaction factor multiplier when no switch is within reach ahead of the lead.
    pub distant_switch_multiplier: f32,
    /// Reaction factor multiplier when a stop lies ahead of the lead.
    pub stop_ahead_multiplier: f32,
    /// A switch ahead of the lead within this distance counts as reachable.
    pub reachable_buffer: f32,
    /// Candidates may be at most this multiple of the lead speed.
    pub speed_headroom: f32,
    /// Fraction of the required gap accepted when a switch lies ahead of the lead.
    pub close_gap_fraction: f32,
    /// A switch reached sooner than this cannot be clicked in time.
    pub min_click_floor_seconds: f32,
    /// Time the player needs between reaching a switch and the collision.
    pub min_reaction_window_seconds: f32,
    /// Fraction of tracks (and of switches per track) below which the gate throttles.
    pub coverage_threshold: f32,
    /// Share of ticks let through while throttled.
    pub throttle_pass_rate: f64,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            spawn_x: SPAWN_X,
            base_safe_distance: 200.0,
            reaction_seconds: 3.0,
            distant_switch_multiplier: 1.25,
            stop_ahead_multiplier: 1.5,
            reachable_buffer: 100.0,
            speed_headroom: 1.5,
            close_gap_fraction: 0.8,
            min_click_floor_seconds: 1.0,
            min_reaction_window_seconds: 2.0,
            coverage_threshold: 0.8,
            throttle_pass_rate: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Score progression parameters
// ---------------------------------------------------------------------------

/// Tunables for tiers, speed-up and spawn cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionParams {
    /// Score at which tier 1 (five tracks) starts.
    pub level1_points: u32,
    /// Score at which tier 2 (six tracks) starts.
    pub level2_points: u32,
    pub points_per_speed_increase: u32,
    /// Speed multiplier added per speed level.
    pub speed_step: f32,
    pub max_speed_multiplier: f32,
    /// Spawn interval factor applied per speed level.
    pub spawn_interval_decrease: f32,
    pub min_spawn_interval_ms: f32,
    pub level2_spawn_multiplier: f32,
    pub level2_stop_multiplier: f32,
    pub base_spawn_interval_ms: f32,
}

impl Default for ProgressionParams {
    fn default() -> Self {
        Self {
            level1_points: 222,
            level2_points: 444,
            points_per_speed_increase: 50,
            speed_step: 0.15,
            max_speed_multiplier: 2.5,
            spawn_interval_decrease: 0.8,
            min_spawn_interval_ms: 800.0,
            level2_spawn_multiplier: 0.6,
            level2_stop_multiplier: 1.8,
            base_spawn_interval_ms: 1200.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Train runtime parameters
// ---------------------------------------------------------------------------

/// Tunables for train movement and hit-testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeParams {
    /// Base speeds (px/s) before the progression multiplier.
    pub speed_variants: Vec<f32>,
    pub train_length: f32,
    pub switch_range: f32,
    pub stop_range: f32,
    pub switch_cooldown_ms: f32,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self {
            speed_variants: SPEED_VARIANTS.to_vec(),
            train_length: TRAIN_LENGTH,
            switch_range: SWITCH_RANGE,
            stop_range: STOP_RANGE,
            switch_cooldown_ms: SWITCH_COOLDOWN_MS,
        }
    }
}

impl RuntimeParams {
    /// Speed variants scaled by the current progression multiplier.
    pub fn scaled_variants(&self, multiplier: f32) -> Vec<f32> {
        self.speed_variants.iter().map(|v| v * multiplier).collect()
    }
}

// ---------------------------------------------------------------------------
// Top-level RailParams resource
// ---------------------------------------------------------------------------

/// Central resource holding all rail tunables.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RailParams {
    pub layout: LayoutParams,
    pub spawn: SpawnParams,
    pub progression: ProgressionParams,
    pub runtime: RuntimeParams,
}

impl RailParams {
    /// Parse a (possibly partial) JSON override document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let params: RailParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Check cross-field constraints the generator and arbiter rely on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |msg: &str| Err(ConfigurationError::InvalidParams(msg.to_string()));
        self.layout.validate()?;

        let s = &self.spawn;
        if !(0.0..=1.0).contains(&s.throttle_pass_rate) {
            return invalid("spawn.throttle_pass_rate must lie in [0, 1]");
        }
        if s.min_click_floor_seconds < 0.0 || s.min_reaction_window_seconds < 0.0 {
            return invalid("spawn timing windows must be non-negative");
        }

        let p = &self.progression;
        if p.level1_points >= p.level2_points {
            return invalid("progression.level1_points must be below level2_points");
        }
        if p.points_per_speed_increase == 0 {
            return invalid("progression.points_per_speed_increase must be at least 1");
        }

        if self.runtime.speed_variants.is_empty() {
            return Err(ConfigurationError::EmptySpeedVariants);
        }
        if self.runtime.speed_variants.iter().any(|v| *v <= 0.0) {
            return invalid("runtime.speed_variants must be positive");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct RailParamsPlugin;

impl Plugin for RailParamsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RailParams>();
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
