//! Seeded randomness for layout generation and spawn arbitration.
//!
//! The tick loop draws from one `ChaCha8Rng` stream held in [`SimRng`]. A level
//! load takes a single `u64` from that stream and seeds a private generator for
//! the layout, so the spawn sequence after a reload does not depend on how many
//! draws the generator's retries happened to use.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_SEED: u64 = 42;

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator for one level's layout. Advances the main stream by exactly
    /// one draw.
    pub fn level_stream(&mut self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0.gen())
    }
}

pub struct SimRngPlugin;

impl Plugin for SimRngPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimRng>();
    }
}
