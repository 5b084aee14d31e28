//! Trains on the line: movement, switching, stops, collisions, scoring,
//! progression and spawning.

mod motion;
mod systems;
mod types;

use bevy::prelude::*;

pub use motion::{diversion, first_overlap, stop_hit};
pub use systems::{
    advance_trains, apply_switch_toggles, despawn_departed_trains, detect_collisions,
    divert_trains, halt_trains_at_stops, score_trains, spawn_trains, update_progression,
};
pub use types::{
    RailSession, SpawnClock, SwitchBoard, ToggleSwitch, Train, TrainCollision, TrainScored,
};

use crate::SimulationSet;

pub struct TrainsPlugin;

impl Plugin for TrainsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SwitchBoard>()
            .init_resource::<RailSession>()
            .init_resource::<SpawnClock>()
            .add_event::<ToggleSwitch>()
            .add_event::<TrainCollision>()
            .add_event::<TrainScored>()
            .add_systems(
                FixedUpdate,
                apply_switch_toggles
                    .after(crate::level_lifecycle::reload_level)
                    .in_set(SimulationSet::PreSim),
            )
            .add_systems(
                FixedUpdate,
                (
                    advance_trains,
                    halt_trains_at_stops,
                    divert_trains,
                    detect_collisions,
                    spawn_trains,
                )
                    .chain()
                    .in_set(SimulationSet::Simulation),
            )
            .add_systems(
                FixedUpdate,
                (score_trains, update_progression, despawn_departed_trains)
                    .chain()
                    .in_set(SimulationSet::PostSim),
            );
    }
}
