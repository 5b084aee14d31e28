pub const PLAY_WIDTH: f32 = 1200.0;
pub const PLAY_HEIGHT: f32 = 600.0;

/// Fixed simulation rate. Every `FixedUpdate` tick advances trains by exactly
/// `SIM_TICK_SECONDS`, independent of wall-clock frame time.
pub const SIM_TICK_HZ: f64 = 60.0;
pub const SIM_TICK_SECONDS: f32 = 1.0 / SIM_TICK_HZ as f32;
pub const SIM_TICK_MS: f32 = 1000.0 / SIM_TICK_HZ as f32;

/// X coordinate at which new trains enter, just off the left edge.
pub const SPAWN_X: f32 = -100.0;

pub const TRAIN_LENGTH: f32 = 60.0;

/// Half-width of the window in which a train on the source track is caught by a switch.
pub const SWITCH_RANGE: f32 = 40.0;

/// Half-width of the window in which a train halts at a stop.
pub const STOP_RANGE: f32 = 30.0;

/// Trains are not re-diverted until this much time has passed since their last switch.
pub const SWITCH_COOLDOWN_MS: f32 = 500.0;

/// Fraction of the play width a train must pass to score.
pub const SCORE_LINE_FRACTION: f32 = 0.9;
pub const POINTS_PER_TRAIN: u32 = 10;

/// Base speeds (px/s) a train can be spawned with, before the score multiplier.
pub const SPEED_VARIANTS: [f32; 4] = [80.0, 100.0, 120.0, 140.0];
