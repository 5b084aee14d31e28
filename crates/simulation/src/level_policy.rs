//! Score → tier, active tracks and pacing.
//!
//! Everything here is a pure, total function of the score and the
//! [`ProgressionParams`]; there are no failure modes. The tick loop calls these
//! after every score change, and the level lifecycle turns the result into a
//! [`LevelSpec`] for the layout generator.

use crate::rail_params::ProgressionParams;
use crate::tracks::Track;

const BEGINNER_TRACKS: &[Track] = &[Track::T2, Track::T3, Track::T4];
const BASIC_TRACKS: &[Track] = &[Track::T1, Track::T2, Track::T3, Track::T4, Track::T5];
const ADVANCED_TRACKS: &[Track] = &[
    Track::T1,
    Track::T2,
    Track::T3,
    Track::T4,
    Track::T5,
    Track::T6,
];

/// Difficulty tier. The active track set only grows with the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tier {
    #[default]
    Beginner,
    Basic,
    Advanced,
}

impl Tier {
    pub fn index(self) -> u8 {
        match self {
            Tier::Beginner => 0,
            Tier::Basic => 1,
            Tier::Advanced => 2,
        }
    }

    pub fn tracks(self) -> &'static [Track] {
        match self {
            Tier::Beginner => BEGINNER_TRACKS,
            Tier::Basic => BASIC_TRACKS,
            Tier::Advanced => ADVANCED_TRACKS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Beginner => "Beginner",
            Tier::Basic => "Basic",
            Tier::Advanced => "Advanced",
        }
    }
}

/// Everything the layout generator needs to know about the level being loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    pub tier: Tier,
    pub tracks: Vec<Track>,
    /// Multiplier applied to every generated stop duration.
    pub stop_duration_scale: f32,
}

pub fn game_level(score: u32, params: &ProgressionParams) -> Tier {
    if score >= params.level2_points {
        Tier::Advanced
    } else if score >= params.level1_points {
        Tier::Basic
    } else {
        Tier::Beginner
    }
}

pub fn available_tracks(score: u32, params: &ProgressionParams) -> &'static [Track] {
    game_level(score, params).tracks()
}

pub fn speed_level(score: u32, params: &ProgressionParams) -> u32 {
    score / params.points_per_speed_increase.max(1)
}

/// Stepwise speed multiplier, `1 + step × level`, capped.
pub fn speed_multiplier(score: u32, params: &ProgressionParams) -> f32 {
    let level = speed_level(score, params) as f32;
    (1.0 + level * params.speed_step).min(params.max_speed_multiplier)
}

/// Spawn interval shrunk geometrically per speed level, floored.
pub fn spawn_interval(score: u32, base_interval_ms: f32, params: &ProgressionParams) -> f32 {
    // Level is unbounded; stop as soon as the floor is hit.
    let mut interval = base_interval_ms;
    for _ in 0..speed_level(score, params) {
        interval *= params.spawn_interval_decrease;
        if interval <= params.min_spawn_interval_ms {
            break;
        }
    }
    interval.max(params.min_spawn_interval_ms)
}

/// [`spawn_interval`] plus the tier-2 spawn multiplier, floored again.
pub fn level_spawn_interval(score: u32, base_interval_ms: f32, params: &ProgressionParams) -> f32 {
    let mut interval = spawn_interval(score, base_interval_ms, params);
    if game_level(score, params) >= Tier::Advanced {
        interval *= params.level2_spawn_multiplier;
    }
    interval.max(params.min_spawn_interval_ms)
}

pub fn stop_duration_scale(score: u32, params: &ProgressionParams) -> f32 {
    if game_level(score, params) >= Tier::Advanced {
        params.level2_stop_multiplier
    } else {
        1.0
    }
}

pub fn stop_duration(base_duration_ms: f32, score: u32, params: &ProgressionParams) -> f32 {
    base_duration_ms * stop_duration_scale(score, params)
}

pub fn level_spec(score: u32, params: &ProgressionParams) -> LevelSpec {
    let tier = game_level(score, params);
    LevelSpec {
        tier,
        tracks: tier.tracks().to_vec(),
        stop_duration_scale: stop_duration_scale(score, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ProgressionParams {
        ProgressionParams::default()
    }

    #[test]
    fn test_tier_thresholds() {
        let p = params();
        assert_eq!(game_level(0, &p), Tier::Beginner);
        assert_eq!(game_level(221, &p), Tier::Beginner);
        assert_eq!(game_level(222, &p), Tier::Basic);
        assert_eq!(game_level(443, &p), Tier::Basic);
        assert_eq!(game_level(444, &p), Tier::Advanced);
        assert_eq!(game_level(10_000, &p), Tier::Advanced);
    }

    #[test]
    fn test_track_counts_per_tier() {
        let p = params();
        assert_eq!(available_tracks(0, &p).len(), 3);
        assert_eq!(available_tracks(222, &p).len(), 5);
        assert_eq!(available_tracks(444, &p).len(), 6);
        assert_eq!(
            available_tracks(0, &p),
            &[Track::T2, Track::T3, Track::T4][..]
        );
    }

    #[test]
    fn test_track_sets_never_shrink() {
        let p = params();
        let mut previous: &[Track] = &[];
        for score in (0..1000).step_by(10) {
            let current = available_tracks(score, &p);
            assert!(
                previous.iter().all(|t| current.contains(t)),
                "score {score} dropped a track"
            );
            previous = current;
        }
    }

    #[test]
    fn test_speed_multiplier_steps_and_caps() {
        let p = params();
        assert!((speed_multiplier(0, &p) - 1.0).abs() < 1e-6);
        assert!((speed_multiplier(49, &p) - 1.0).abs() < 1e-6);
        assert!((speed_multiplier(50, &p) - 1.15).abs() < 1e-6);
        assert!((speed_multiplier(100, &p) - 1.3).abs() < 1e-6);
        assert!((speed_multiplier(5000, &p) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_interval_shrinks_and_floors() {
        let p = params();
        assert!((spawn_interval(0, 1200.0, &p) - 1200.0).abs() < 1e-3);
        assert!((spawn_interval(50, 1200.0, &p) - 960.0).abs() < 1e-3);
        assert!((spawn_interval(100, 1200.0, &p) - 800.0).abs() < 1e-3);
        assert!((spawn_interval(u32::MAX, 1200.0, &p) - 800.0).abs() < 1e-3);
    }

    #[test]
    fn test_level_spawn_interval_tier2_multiplier_floored() {
        let p = params();
        // Tier 2 pushes 800 * 0.6 below the floor, which wins.
        assert!((level_spawn_interval(444, 1200.0, &p) - 800.0).abs() < 1e-3);
        // A large base shows the multiplier itself.
        let base = 100_000.0;
        let plain = spawn_interval(444, base, &p);
        assert!((level_spawn_interval(444, base, &p) - plain * 0.6).abs() < 1e-1);
    }

    #[test]
    fn test_stop_duration_longer_in_tier2() {
        let p = params();
        assert!((stop_duration(1000.0, 0, &p) - 1000.0).abs() < 1e-3);
        assert!((stop_duration(1000.0, 300, &p) - 1000.0).abs() < 1e-3);
        assert!((stop_duration(1000.0, 444, &p) - 1800.0).abs() < 1e-3);
    }

    #[test]
    fn test_level_spec_matches_tier() {
        let p = params();
        let spec = level_spec(250, &p);
        assert_eq!(spec.tier, Tier::Basic);
        assert_eq!(spec.tracks.len(), 5);
        assert!((spec.stop_duration_scale - 1.0).abs() < 1e-6);
    }
}
