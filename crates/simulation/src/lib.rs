use bevy::prelude::*;

pub mod config;
pub mod config_error;
pub mod layout;
pub mod level_lifecycle;
pub mod level_policy;
pub mod rail_params;
pub mod sim_rng;
pub mod simulation_sets;
pub mod spawn_arbiter;
pub mod tracks;
pub mod trains;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Shared throttle timer for audits that don't need to run every tick.
#[derive(Resource, Default)]
pub struct SlowTickTimer {
    pub counter: u32,
}

impl SlowTickTimer {
    pub const INTERVAL: u32 = 100; // every 100 ticks (~1.7 seconds at 60Hz)

    pub fn tick(&mut self) {
        self.counter += 1;
    }

    pub fn should_run(&self) -> bool {
        self.counter.is_multiple_of(Self::INTERVAL)
    }
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(config::SIM_TICK_HZ))
            .init_resource::<TickCounter>()
            .init_resource::<SlowTickTimer>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                tick_slow_timer
                    .before(level_lifecycle::reload_level)
                    .in_set(SimulationSet::PreSim),
            );

        app.add_plugins((
            sim_rng::SimRngPlugin,
            rail_params::RailParamsPlugin,
            layout::LayoutPlugin,
            trains::TrainsPlugin,
            level_lifecycle::LevelLifecyclePlugin,
        ));
    }
}

pub fn tick_slow_timer(mut timer: ResMut<SlowTickTimer>, mut tick: ResMut<TickCounter>) {
    timer.tick();
    tick.0 = tick.0.wrapping_add(1);
}
