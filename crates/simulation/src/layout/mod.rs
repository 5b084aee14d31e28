//! Procedural switch and stop layout.
//!
//! [`generate_layout`] turns a [`crate::level_policy::LevelSpec`] into an
//! immutable [`Layout`]. The level lifecycle inserts the result as a resource;
//! nothing mutates it until the next reload replaces it.

mod generator;
mod invariants;
mod placement;
mod types;
mod zones;

use bevy::prelude::*;

pub use generator::generate_layout;
pub use invariants::{
    audit_layout, audit_live_layout, check_round_trips, check_spacing, check_stop_clearance,
    check_ultra_early, check_zone_coverage, LayoutViolation, LayoutViolations,
};
pub use placement::{place_with_fallback, Band, Board, PlacementRequest, Spacing};
pub use types::{Connection, ConnectionId, Layout, PlacementOrigin, Stop, StopId};
pub use zones::{candidate_positions, partition, Zone};

pub struct LayoutPlugin;

impl Plugin for LayoutPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Layout>()
            .init_resource::<LayoutViolations>()
            .add_systems(
                FixedUpdate,
                audit_live_layout.in_set(crate::SimulationSet::PostSim),
            );
    }
}
