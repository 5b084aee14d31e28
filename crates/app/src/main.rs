mod agent_mode;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::config::SIM_TICK_HZ;
use simulation::rail_params::RailParams;
use simulation::sim_rng::SimRng;
use simulation::trains::{RailSession, TrainCollision};

fn main() {
    if std::env::args().any(|arg| arg == "--agent") {
        agent_mode::run_agent_mode();
        return;
    }

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / SIM_TICK_HZ,
        ))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins(simulation::SimulationPlugin);

    apply_env_overrides(&mut app);
    app.add_systems(Update, exit_on_collision);
    app.run();
}

/// Apply `RAILYARD_SEED` and `RAILYARD_PARAMS` (path to a JSON override
/// document). Runs before the first update so the startup level uses them.
pub(crate) fn apply_env_overrides(app: &mut App) {
    if let Ok(seed) = std::env::var("RAILYARD_SEED") {
        match seed.parse::<u64>() {
            Ok(seed) => {
                app.insert_resource(SimRng::from_seed_u64(seed));
            }
            Err(e) => eprintln!("Ignoring RAILYARD_SEED={seed}: {e}"),
        }
    }

    let Ok(path) = std::env::var("RAILYARD_PARAMS") else {
        return;
    };
    let params = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| RailParams::from_json_str(&json).map_err(|e| e.to_string()));
    match params {
        Ok(params) => {
            app.insert_resource(params);
        }
        Err(e) => eprintln!("Ignoring rail params from '{path}', using defaults: {e}"),
    }
}

fn exit_on_collision(
    mut collisions: EventReader<TrainCollision>,
    session: Res<RailSession>,
    mut exit: EventWriter<AppExit>,
) {
    if let Some(collision) = collisions.read().last() {
        info!(
            "Game over: collision on {} at x={:.0}, {} points, {} trains spawned",
            collision.track, collision.x, collision.score, session.trains_spawned
        );
        exit.send(AppExit::Success);
    }
}
